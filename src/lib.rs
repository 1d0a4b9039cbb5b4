use std::env;
use std::path::PathBuf;
use clap::Parser;
use log::LevelFilter;

use crate::config::io::ConfigIO;
use crate::gui::application::run_application;
use crate::error::AppRunError;

pub mod config;
pub mod device;
pub mod error;
pub mod gui;
pub mod remote;

#[derive(Parser, Debug)]
#[command(author, version)]
#[command(about = "Drive a Bluetooth serial RC vehicle from the desktop", long_about = None)]
pub struct Args {
    /// Use this config file instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run against an in-memory device instead of the Bluetooth adapter
    #[arg(long)]
    pub demo: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

pub fn init_logging(level: LevelFilter) {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Ok(log_file) = env::var("LOG_FILE") {
        dispatch = dispatch.chain(
            fern::log_file(log_file).expect("Failed to open LOG_FILE")
        );
    }

    dispatch.apply().expect("Failed to initialize logger");
}

pub fn run(args: Args) -> Result<(), AppRunError> {
    let mut config_io = ConfigIO::new_sync(args.config.as_deref())?;
    let mut config_locker = config_io.locker()?;
    let _lock_guard = config_locker.lock()?;

    run_application(config_io, args.demo)?;
    Ok(())
}
