use std::io;
use std::fmt::Display;
use std::str::Utf8Error;
use thiserror::Error;
use msgbox::IconType;
use btleplug;
use iced;
use serde_json;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine path to config file")]
    NoConfigPath,

    #[error("Failed to acquire file lock on config file: {source}")]
    CanNotLock { source: io::Error },

    #[error("Failed to encode/decode config as utf-8: {source}")]
    Utf8Error { #[from] source: Utf8Error },

    #[error("Failed to read/write config file: {source}")]
    IOError { #[from] source: io::Error },

    #[error("Failed to parse/build config file: {source}")]
    JsonError { #[from] source: serde_json::Error },
}

#[derive(Error, Debug)]
pub enum AppRunError {
    #[error("Failed to start application (iced): {source}")]
    Iced { #[from] source: iced::Error },

    #[error("Failed to start application (config): {source}")]
    ConfigError { #[from] source: ConfigError },
}

/// Failures reported by a serial link. The controller logs these and never acts on the
/// variant.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Error communicating with device (btleplug): {source}")]
    Btle { #[from] source: btleplug::Error },

    #[error("Operation is not supported by this bluetooth stack: {0}")]
    Unsupported(&'static str),

    #[error("No bluetooth adapter is available")]
    NoAdapter,

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Not connected to a device")]
    NotConnected,

    #[error("A required bluetooth characteristic is not available")]
    MissingCharacteristic,

    #[error("{0}")]
    Failed(String),
}

pub fn error_msgbox<T: Display>(message: &'static str, error: &T) {
    let message = format!("{}: {}", message, error);
    eprintln!("{}", &message);
    if let Err(err) = msgbox::create(concat!("RC Remote ", env!("CARGO_PKG_VERSION")), &message, IconType::Error) {
        eprintln!("Failed to create msgbox: {:?}", err);
    }
}
