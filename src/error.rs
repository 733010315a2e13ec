use thiserror::Error;

use crate::native::NativeError;

/// Broad category of a [`FirebirdDbError`].
///
/// Callers use this to decide whether re-running the same compiled statement on a fresh
/// connection can possibly succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The statement itself is invalid for Firebird.
    Compile,
    /// The native driver reported a failure.
    Native,
    /// The API was driven out of order (programmer error).
    ProtocolMisuse,
    /// The native side never produced a usable handle or answer.
    Connection,
    /// Reading or writing generated artifacts failed.
    Io,
}

#[derive(Debug, Error)]
pub enum FirebirdDbError {
    #[error("{0} is not supported in Firebird")]
    Unsupported(&'static str),

    #[error("Placeholder error: {0}")]
    PlaceholderError(String),

    #[error("Compile error: {0}")]
    CompileError(String),

    #[error(transparent)]
    Native(#[from] NativeError),

    #[error("You can't create a new transaction, one is already active")]
    TransactionAlreadyActive,

    #[error("No transaction is active")]
    NoActiveTransaction,

    #[error("Connection pool has been destroyed")]
    PoolDestroyed,

    #[error("Connection {0} has already been released")]
    ConnectionReleased(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Generator error: {0}")]
    GeneratorError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FirebirdDbError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Unsupported(_) | Self::PlaceholderError(_) | Self::CompileError(_) => {
                ErrorClass::Compile
            }
            Self::Native(_) => ErrorClass::Native,
            Self::TransactionAlreadyActive
            | Self::NoActiveTransaction
            | Self::PoolDestroyed
            | Self::ConnectionReleased(_)
            | Self::Unimplemented(_) => ErrorClass::ProtocolMisuse,
            Self::ConnectionError(_) => ErrorClass::Connection,
            Self::GeneratorError(_) | Self::Io(_) | Self::Json(_) => ErrorClass::Io,
        }
    }

    /// Whether retrying against a fresh connection could change the outcome.
    ///
    /// Compile and misuse errors are never retryable since the input itself is invalid.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::Native | ErrorClass::Connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_separate_compile_from_native() {
        let compile = FirebirdDbError::Unsupported("TOP");
        assert_eq!(compile.class(), ErrorClass::Compile);
        assert!(!compile.is_retryable());
        assert_eq!(compile.to_string(), "TOP is not supported in Firebird");

        let native = FirebirdDbError::from(NativeError::new("lock conflict on no wait transaction"));
        assert_eq!(native.class(), ErrorClass::Native);
        assert!(native.is_retryable());
        assert_eq!(native.to_string(), "lock conflict on no wait transaction");

        assert_eq!(
            FirebirdDbError::TransactionAlreadyActive.class(),
            ErrorClass::ProtocolMisuse
        );
        assert!(!FirebirdDbError::NoActiveTransaction.is_retryable());
    }
}
