//! Common result and error types for internal (non-user-facing) failures.

/// The standard result type for fallible internal operations.
///
/// `Ok` contains the result value. `Err` indicates an unrecoverable internal
/// error (a bug in HDL Checker), not a user input problem. User-facing
/// problems — a malformed config entry, an unresolved dependency, a stale
/// cache — are reported through [`Diagnostic`](hdlc_diagnostics::Diagnostic)
/// and the operation still returns `Ok`.
pub type HdlcResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in HDL Checker, not a user input problem.
///
/// These errors should never occur during normal operation. If one does
/// occur, it means there is a logic error that should be fixed.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("something broke");
        assert_eq!(format!("{err}"), "internal error: something broke");
    }

    #[test]
    fn ok_path() {
        let r: HdlcResult<i32> = Ok(42);
        assert!(r.is_ok());
        assert_eq!(r.ok(), Some(42));
    }

    #[test]
    fn err_path() {
        let r: HdlcResult<i32> = Err(InternalError::new("test error"));
        assert!(r.is_err());
        assert_eq!(r.err().unwrap().message, "test error");
    }
}
