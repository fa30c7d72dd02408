use crate::permission::Permission;

use std::{fmt::Display, io, result::Result};

pub type BlescanResult<T> = Result<T, BlescanError>;

#[derive(Debug)]
pub enum BlescanError {
    PermissionDenied(Vec<Permission>),
    ScanError(String),
    ConnectionError(String),
    BluetoothError(bluer::Error),
    IoError(io::Error),
    JsonError(serde_json::Error),
    InvalidIdentifier(String),
    UnknownDevice(String),
    Timeout,
    LoggerError,
}

impl From<io::Error> for BlescanError {
    fn from(value: io::Error) -> Self {
        BlescanError::IoError(value)
    }
}

impl From<serde_json::Error> for BlescanError {
    fn from(value: serde_json::Error) -> Self {
        BlescanError::JsonError(value)
    }
}

impl From<bluer::Error> for BlescanError {
    fn from(value: bluer::Error) -> Self {
        BlescanError::BluetoothError(value)
    }
}

impl From<bluer::InvalidAddress> for BlescanError {
    fn from(value: bluer::InvalidAddress) -> Self {
        BlescanError::InvalidIdentifier(value.0)
    }
}

impl From<tokio::time::error::Elapsed> for BlescanError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        BlescanError::Timeout
    }
}

impl Display for BlescanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlescanError::PermissionDenied(denied) => {
                let names: Vec<String> = denied.iter().map(|p| p.to_string()).collect();
                write!(f, "Permission denied: {}", names.join(", "))
            }
            BlescanError::ScanError(reason) => write!(f, "Scan error: {}", reason),
            BlescanError::ConnectionError(reason) => write!(f, "Connection error: {}", reason),
            BlescanError::BluetoothError(err) => write!(f, "Bluetooth error: {}", err),
            BlescanError::IoError(err) => write!(f, "IO error: {}", err),
            BlescanError::JsonError(err) => write!(f, "Serde json error: {}", err),
            BlescanError::InvalidIdentifier(id) => write!(f, "Invalid device identifier: {}", id),
            BlescanError::UnknownDevice(id) => write!(f, "Unknown device: {}", id),
            BlescanError::Timeout => write!(f, "Operation timed out"),
            BlescanError::LoggerError => write!(f, "Cannot init logger"),
        }
    }
}

impl std::error::Error for BlescanError {}
