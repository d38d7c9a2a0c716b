// error.rs
use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseColorError {
    #[error("invalid hex digit in {0:?}")]
    InvalidDigit(String),
    #[error("hex color {input:?} does not fit in 32 bits")]
    Overflow {
        input: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("convert hex to rgb: {0}")]
    InvalidColor(#[from] ParseColorError),
    #[error("failed to execute {program}: {reason}")]
    ExecutionFailed { program: String, reason: String },
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("unknown kind of device {name:?} (model {model:?})")]
    UnsupportedDeviceKind { name: String, model: String },
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
    #[error("command cancelled")]
    Cancelled,
    #[error("device discovery failed: {0}")]
    Discovery(String),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}
