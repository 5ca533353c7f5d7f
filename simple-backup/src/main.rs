//! Simple Backup - Main entry point
//!
//! Reads the configuration, runs the backup once and exits.

use anyhow::Result;
use clap::Parser;
use simple_backup::config::{self, ConfigResolver, DEFAULT_CONFIG_FILE};
use simple_backup::{utils, BackupError, BackupRunner};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file, relative to the base directory
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Base directory for relative paths (default: executable directory)
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Do not write log files under <base>/Logs
    #[arg(long)]
    no_log_file: bool,

    /// Exit without waiting for Enter (release builds only)
    #[arg(long)]
    no_pause: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let base_dir = match args.base_dir.clone() {
        Some(dir) => dir,
        None => match config::base_directory() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Unable to determine base directory: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let log_path = base_dir.join("Logs");
    let log_dir = (!args.no_log_file).then_some(log_path.as_path());
    if let Err(e) = utils::logger::init(&args.log_level, log_dir) {
        eprintln!("Unable to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    tracing::info!("Starting simple-backup v{}", env!("CARGO_PKG_VERSION"));

    let code = match run(&args, base_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<BackupError>() {
                Some(BackupError::Config(message)) => {
                    tracing::error!("Configuration error: {}", message)
                }
                _ => tracing::error!("General error. {:?}", e),
            }
            ExitCode::FAILURE
        }
    };

    pause(args.no_pause);
    code
}

fn run(args: &Args, base_dir: PathBuf) -> Result<()> {
    let resolver = ConfigResolver::new(base_dir);
    tracing::info!("Base directory {}", resolver.base_dir().display());

    let settings = resolver.load(&args.config)?;
    BackupRunner::new(&settings).run()?;
    Ok(())
}

/// Keep the console window open when launched by double-click.
#[cfg(not(debug_assertions))]
fn pause(skip: bool) {
    use std::io::{BufRead, Write};

    if skip {
        return;
    }
    print!("Press Enter to continue . . .");
    let _ = std::io::stdout().flush();
    let _ = std::io::stdin().lock().read_line(&mut String::new());
}

#[cfg(debug_assertions)]
fn pause(_skip: bool) {}
