//! Error types for graphics operations

use thiserror::Error;

/// Graphics operation errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsError {
    /// An internal invariant failed
    #[error("generic graphics error")]
    Generic,

    /// An argument was rejected before any state changed
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// A bounded resource is exhausted
    #[error("out of memory: {0}")]
    OutOfMemory(&'static str),

    /// The context is held through its exclusive drawing handle
    #[error("object busy")]
    ObjectBusy,

    /// The operation exists but has no implementation for this target
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl GraphicsError {
    /// The status this error reports
    pub fn status(&self) -> Status {
        match self {
            GraphicsError::Generic => Status::GenericError,
            GraphicsError::InvalidParameter(_) => Status::InvalidParameter,
            GraphicsError::OutOfMemory(_) => Status::OutOfMemory,
            GraphicsError::ObjectBusy => Status::ObjectBusy,
            GraphicsError::NotImplemented(_) => Status::NotImplemented,
        }
    }
}

/// Numeric operation status, as reported across an FFI boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Status {
    Ok = 0,
    GenericError = 1,
    InvalidParameter = 2,
    OutOfMemory = 3,
    ObjectBusy = 4,
    NotImplemented = 6,
}

impl Status {
    /// Status of an operation result, `Ok` on success
    pub fn of<T>(result: &Result<T>) -> Status {
        match result {
            Ok(_) => Status::Ok,
            Err(err) => err.status(),
        }
    }

    /// Raw status code
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Result type for graphics operations
pub type Result<T> = std::result::Result<T, GraphicsError>;
