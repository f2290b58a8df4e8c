//! Hardware-backed secure store trait.

use crate::error::StoreResult;

/// Status code the secure store surfaces when no entry matches a query.
///
/// Carried verbatim from the platform so callers can branch on it the same
/// way they branch on authentication-failure codes.
pub const STATUS_ITEM_NOT_FOUND: i32 = -25300;

/// Access requirements attached to a newly inserted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Entry is readable only after a fresh check against the biometric set
    /// enrolled at write time, on this device only, and only while a device
    /// passcode is set. Re-enrolling biometrics invalidates the entry.
    CurrentBiometricSet,
}

/// Storage facility that encrypts entries such that reading them requires a
/// fresh biometric check.
///
/// Entries are keyed by `(service, account)`. Implementations are expected
/// to block the calling thread for the duration of the platform call
/// (including any user-facing authentication prompt); the store façade runs
/// them on a background worker.
///
/// # Errors
///
/// Non-success platform statuses are reported as
/// [`StoreError::Platform`](crate::StoreError::Platform) with the raw code
/// preserved. Failure to build the access-control object for an insert is
/// [`StoreError::AccessControl`](crate::StoreError::AccessControl); a payload
/// the platform cannot encode is
/// [`StoreError::InvalidData`](crate::StoreError::InvalidData).
pub trait SecureStore: Send + Sync {
    /// Inserts an entry under `(service, account)` with the given access
    /// policy, replacing nothing: callers delete any previous entry first.
    fn insert(
        &self,
        service: &str,
        account: &str,
        secret: &[u8],
        policy: AccessPolicy,
    ) -> StoreResult<()>;

    /// Deletes the entry under `(service, account)`. Absence is not an
    /// error; deleting twice has the same effect as deleting once.
    fn remove(&self, service: &str, account: &str) -> StoreResult<()>;

    /// Fetches the single entry under `(service, account)`, showing `prompt`
    /// to the user on the authentication dialog.
    fn fetch_one(&self, service: &str, account: &str, prompt: &str) -> StoreResult<Vec<u8>>;
}
