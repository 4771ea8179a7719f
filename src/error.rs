//! Error types shared across the crate.
//!
//! Errors are `anyhow` errors. Where a caller needs to know what kind of failure happened (for
//! example to decide whether a user should be notified), the failure is tagged with an
//! [`ErrorType`] using [`IntoResult::pub_result`]. The tag can be recovered from anywhere in the
//! chain with [`error_type`].

use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies a failure that can reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// The data home or its `config.json` is missing or invalid.
    Config,
    /// A persisted value could not be read or parsed. Usually recovered with a default.
    StorageRead,
    /// A value could not be persisted.
    StorageWrite,
    /// Building the backup CSV failed. No file is written.
    BackupEncode,
    /// The backup CSV is structurally unusable (missing required metadata).
    BackupDecode,
    /// The backup file could not be read.
    FileRead,
    /// The request itself is invalid, e.g. an unknown salesperson.
    Request,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorType::Config => "Configuration error",
            ErrorType::StorageRead => "Unable to read stored data",
            ErrorType::StorageWrite => "Unable to store data",
            ErrorType::BackupEncode => "Unable to create the backup",
            ErrorType::BackupDecode => "Invalid backup file",
            ErrorType::FileRead => "Unable to read the backup file",
            ErrorType::Request => "Invalid request",
        };
        f.write_str(s)
    }
}

/// Attaches an [`ErrorType`] to the error of a `Result`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

/// Returns the outermost [`ErrorType`] attached to `e`, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}
