//! Common result and error types for the Weld LTO driver.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in Weld or a
/// violated caller contract), not a user-facing error. User-facing
/// conditions are reported through the component-specific error enums.
pub type WeldResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Weld, not a user input problem.
///
/// These errors should never occur during normal operation. If one does
/// occur, it means there is a logic error in the driver that should be fixed.
#[derive(Debug, thiserror::Error)]
#[error("internal LTO driver error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
