//! Centralized error handling for the ERA5 ETL
//!
//! Every failure inside one year's pipeline ends up as an [`EtlError`]. The
//! reader and writer attach the offending path so the per-year failure line
//! says which file was at fault.

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for ETL operations
#[derive(Debug)]
pub enum EtlError {
    /// Source file missing, corrupt or not understood
    DecodeError { path: PathBuf, message: String },

    /// Expected coordinate, time axis or field absent
    SchemaError { message: String },

    /// Output file could not be created or written
    WriteError { path: PathBuf, message: String },

    /// Raw NetCDF library errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// DataFrame construction or serialization errors
    PolarsError(polars::prelude::PolarsError),

    /// Worker pool configuration error
    ThreadPoolError(String),

    /// Rejected configuration values
    InvalidConfig { message: String },
}

impl EtlError {
    pub fn decode(path: &Path, message: impl Into<String>) -> Self {
        EtlError::DecodeError {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        EtlError::SchemaError {
            message: message.into(),
        }
    }

    pub fn write(path: &Path, message: impl Into<String>) -> Self {
        EtlError::WriteError {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Short label used as a structured log field
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            EtlError::DecodeError { .. } => "decode",
            EtlError::SchemaError { .. } => "schema",
            EtlError::WriteError { .. } => "write",
            EtlError::NetCDFError(_) => "netcdf",
            EtlError::IoError(_) => "io",
            EtlError::ArrayError(_) => "array",
            EtlError::PolarsError(_) => "polars",
            EtlError::ThreadPoolError(_) => "thread_pool",
            EtlError::InvalidConfig { .. } => "config",
        }
    }
}

impl fmt::Display for EtlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtlError::DecodeError { path, message } => {
                write!(f, "Decode error in '{}': {}", path.display(), message)
            }
            EtlError::SchemaError { message } => write!(f, "Schema error: {}", message),
            EtlError::WriteError { path, message } => {
                write!(f, "Write error for '{}': {}", path.display(), message)
            }
            EtlError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            EtlError::IoError(e) => write!(f, "I/O error: {}", e),
            EtlError::ArrayError(e) => write!(f, "Array error: {}", e),
            EtlError::PolarsError(e) => write!(f, "DataFrame error: {}", e),
            EtlError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            EtlError::InvalidConfig { message } => write!(f, "Invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for EtlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EtlError::NetCDFError(e) => Some(e),
            EtlError::IoError(e) => Some(e),
            EtlError::ArrayError(e) => Some(e),
            EtlError::PolarsError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for EtlError {
    fn from(error: netcdf::Error) -> Self {
        EtlError::NetCDFError(error)
    }
}

impl From<std::io::Error> for EtlError {
    fn from(error: std::io::Error) -> Self {
        EtlError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for EtlError {
    fn from(error: ndarray::ShapeError) -> Self {
        EtlError::ArrayError(error)
    }
}

impl From<polars::prelude::PolarsError> for EtlError {
    fn from(error: polars::prelude::PolarsError) -> Self {
        EtlError::PolarsError(error)
    }
}

/// Result type alias for ETL operations
pub type Result<T> = std::result::Result<T, EtlError>;
