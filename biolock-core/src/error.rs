use thiserror::Error;

/// Errors surfaced by the secret-store operations.
///
/// Absence of data is a normal result (`NotFound`), never conflated with
/// platform faults. Hardware statuses are carried verbatim so callers can
/// branch on the raw code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The biometric access-control policy for a new entry could not be
    /// constructed. The write is abandoned; nothing is retried.
    #[error("unable to initialize access control: {0}")]
    AccessControl(String),
    /// The payload could not be encoded for storage.
    #[error("secret cannot be encoded for storage")]
    InvalidData,
    /// The secure store returned a non-success status. The code is the raw
    /// platform status, untranslated.
    #[error("secure store returned status {status}")]
    Platform {
        /// Raw status code from the platform query.
        status: i32,
    },
    /// No secret is stored under this identifier, or the stored entry could
    /// not be read back as text.
    #[error("no secret stored under this identifier")]
    NotFound,
    /// The background worker running the platform call failed. Not a
    /// platform condition; indicates runtime shutdown or a panicked worker.
    #[error("secure store worker failed: {0}")]
    Internal(String),
}

/// Result type alias for secret-store operations.
pub type StoreResult<T> = Result<T, StoreError>;
