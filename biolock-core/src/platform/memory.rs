//! In-memory implementations of the platform traits.
//!
//! These back unit tests and emulator hosts. The secure store keeps entries
//! in a plain map and offers failure knobs so callers can exercise the
//! access-control and platform-status error paths without real hardware.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::capability::{BiometricCapability, PolicyDomainState};
use crate::error::{StoreError, StoreResult};

use super::authority::{BiometricAuthority, PolicyEvaluation, PolicyFailure};
use super::blob_store::AtomicBlobStore;
use super::preferences::PreferenceStore;
use super::secure_store::{AccessPolicy, SecureStore, STATUS_ITEM_NOT_FOUND};

#[derive(Debug, Clone)]
enum Value {
    Bool(bool),
    Text(String),
    Blob(Vec<u8>),
}

/// In-memory preference store backed by a map.
#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryPreferences {
    /// Creates an empty preference store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every stored value.
    pub fn clear(&self) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn value(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn insert(&self, key: &str, value: Value) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value);
    }
}

impl PreferenceStore for MemoryPreferences {
    fn string(&self, key: &str) -> Option<String> {
        match self.value(key) {
            Some(Value::Text(text)) => Some(text),
            _ => None,
        }
    }

    fn set_string(&self, key: &str, value: &str) {
        self.insert(key, Value::Text(value.to_owned()));
    }

    fn bool(&self, key: &str) -> bool {
        matches!(self.value(key), Some(Value::Bool(true)))
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.insert(key, Value::Bool(value));
    }

    fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        match self.value(key) {
            Some(Value::Blob(bytes)) => Some(bytes),
            _ => None,
        }
    }

    fn set_bytes(&self, key: &str, value: &[u8]) {
        self.insert(key, Value::Blob(value.to_vec()));
    }

    fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// In-memory atomic blob store backed by a map.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Creates an empty blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every stored blob.
    pub fn clear(&self) {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl AtomicBlobStore for MemoryBlobStore {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned())
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> io::Result<()> {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        Ok(())
    }
}

/// In-memory secure store with failure knobs for tests.
///
/// No biometric gating happens here; the store only mimics the keyed
/// storage surface and its error reporting.
#[derive(Default)]
pub struct MemorySecureStore {
    entries: Mutex<HashMap<(String, String), Vec<u8>>>,
    fail_access_control: AtomicBool,
    forced_fetch_status: Mutex<Option<i32>>,
}

impl MemorySecureStore {
    /// Creates an empty secure store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every insert fails with an access-control error.
    pub fn set_fail_access_control(&self, fail: bool) {
        self.fail_access_control.store(fail, Ordering::Relaxed);
    }

    /// When set, every fetch fails with the given platform status.
    pub fn set_forced_fetch_status(&self, status: Option<i32>) {
        *self
            .forced_fetch_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Overwrites the stored payload without going through [`SecureStore`],
    /// for corruption tests.
    pub fn put_raw(&self, service: &str, account: &str, bytes: &[u8]) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((service.to_owned(), account.to_owned()), bytes.to_vec());
    }

    /// Whether an entry exists under `(service, account)`.
    #[must_use]
    pub fn contains(&self, service: &str, account: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(service.to_owned(), account.to_owned()))
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every stored entry and clears the failure knobs.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.set_fail_access_control(false);
        self.set_forced_fetch_status(None);
    }
}

impl SecureStore for MemorySecureStore {
    fn insert(
        &self,
        service: &str,
        account: &str,
        secret: &[u8],
        _policy: AccessPolicy,
    ) -> StoreResult<()> {
        if self.fail_access_control.load(Ordering::Relaxed) {
            return Err(StoreError::AccessControl(
                "store rejected access-control flags".to_owned(),
            ));
        }
        self.put_raw(service, account, secret);
        Ok(())
    }

    fn remove(&self, service: &str, account: &str) -> StoreResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(service.to_owned(), account.to_owned()));
        Ok(())
    }

    fn fetch_one(&self, service: &str, account: &str, _prompt: &str) -> StoreResult<Vec<u8>> {
        if let Some(status) = *self
            .forced_fetch_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(StoreError::Platform { status });
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(service.to_owned(), account.to_owned()))
            .cloned()
            .ok_or(StoreError::Platform {
                status: STATUS_ITEM_NOT_FOUND,
            })
    }
}

/// Scriptable biometric authority for tests and emulator hosts.
///
/// Defaults to "biometry not available" so a freshly built instance probes
/// as [`BiometricCapability::None`].
pub struct MemoryAuthority {
    evaluation: Mutex<PolicyEvaluation>,
    kind: Mutex<BiometricCapability>,
    domain_state: Mutex<Option<PolicyDomainState>>,
    model: Mutex<String>,
}

impl MemoryAuthority {
    /// Creates an authority reporting no biometric hardware.
    #[must_use]
    pub fn new() -> Self {
        Self {
            evaluation: Mutex::new(PolicyEvaluation::failed(
                PolicyFailure::BiometryNotAvailable,
            )),
            kind: Mutex::new(BiometricCapability::None),
            domain_state: Mutex::new(None),
            model: Mutex::new("memory-device".to_owned()),
        }
    }

    /// Scripts the policy-evaluation result.
    pub fn set_evaluation(&self, evaluation: PolicyEvaluation) {
        *self
            .evaluation
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = evaluation;
    }

    /// Scripts the modality the hardware reports.
    pub fn set_biometry_kind(&self, kind: BiometricCapability) {
        *self.kind.lock().unwrap_or_else(PoisonError::into_inner) = kind;
    }

    /// Scripts the enrolled-credential snapshot.
    pub fn set_domain_state(&self, state: Option<PolicyDomainState>) {
        *self
            .domain_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Scripts the hardware model identifier.
    pub fn set_model_identifier(&self, model: &str) {
        *self.model.lock().unwrap_or_else(PoisonError::into_inner) = model.to_owned();
    }
}

impl Default for MemoryAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl BiometricAuthority for MemoryAuthority {
    fn evaluate_policy(&self) -> PolicyEvaluation {
        *self
            .evaluation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn biometry_kind(&self) -> BiometricCapability {
        *self.kind.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn policy_domain_state(&self) -> Option<PolicyDomainState> {
        self.domain_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn model_identifier(&self) -> String {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Bundles one of each in-memory implementation for easy test setup.
pub struct MemoryPlatform {
    /// Scriptable biometric authority.
    pub authority: Arc<MemoryAuthority>,
    /// In-memory secure store.
    pub secure_store: Arc<MemorySecureStore>,
    /// In-memory preference store.
    pub preferences: Arc<MemoryPreferences>,
    /// In-memory blob store.
    pub blob_store: Arc<MemoryBlobStore>,
}

impl MemoryPlatform {
    /// Creates a platform bundle with default components.
    #[must_use]
    pub fn new() -> Self {
        Self {
            authority: Arc::new(MemoryAuthority::new()),
            secure_store: Arc::new(MemorySecureStore::new()),
            preferences: Arc::new(MemoryPreferences::new()),
            blob_store: Arc::new(MemoryBlobStore::new()),
        }
    }

    /// Clears all stored data, for test isolation.
    pub fn reset(&self) {
        self.secure_store.clear();
        self.preferences.clear();
        self.blob_store.clear();
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}
