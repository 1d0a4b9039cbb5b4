use clap::Parser;
use log::info;
use msgbox::IconType;
use rc_remote::{init_logging, run, Args};
use rc_remote::error::{error_msgbox, AppRunError, ConfigError};

fn main() -> Result<(), AppRunError> {
    let args = Args::parse();
    init_logging(args.log_level);
    info!(concat!("RC Remote ", env!("CARGO_PKG_VERSION")));

    match run(args) {
        Err(AppRunError::ConfigError { source: ConfigError::CanNotLock { .. } }) => {
            if let Err(err) = msgbox::create(
                concat!("RC Remote ", env!("CARGO_PKG_VERSION")),
                "This application has already been started",
                IconType::Error,
            ) {
                eprintln!("Failed to create msgbox: {:?}", err);
            }
            Ok(())
        },
        Err(err) => {
            error_msgbox("Unexpected error", &err);
            Err(err)
        }
        Ok(_) => Ok(())
    }
}
