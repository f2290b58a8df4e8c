//! Storage-key derivation.
//!
//! Every value this crate persists is keyed per-application and
//! per-identifier. Keys are derived deterministically from the application
//! identity alone, so they stay stable across launches, and the purpose
//! suffixes keep values for the same identifier from colliding.

use sha2::{Digest, Sha256};

/// What a namespaced key stores, mapped to a distinct suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    /// Account name for the hardware-backed entry holding the secret.
    KeychainAccount,
    /// Flag: the user was already asked about enabling biometrics.
    DidAskToUseBiometrics,
    /// Flag: the user opted into biometric authentication.
    BiometricsActivated,
    /// Flag: the secret should be written to the keychain on next login.
    AddSecretOnNextLogin,
}

impl KeyPurpose {
    const fn suffix(self) -> &'static str {
        match self {
            Self::KeychainAccount => "_KeychainAccount",
            Self::DidAskToUseBiometrics => "_DidAskToUseBiometrics",
            Self::BiometricsActivated => "_BiometricsActivated",
            Self::AddSecretOnNextLogin => "_AddSecretOnNextLogin",
        }
    }
}

/// Derives namespaced storage keys for one application identity.
///
/// Keys have the shape `hex(sha256(app_identity)) + suffix + "_" + id`:
/// readable enough to debug, stable for the lifetime of the app identity,
/// and collision-free across `(purpose, identifier)` pairs because suffixes
/// are distinct constants.
#[derive(Debug, Clone)]
pub struct KeyNamespacer {
    app_digest: String,
}

impl KeyNamespacer {
    /// Creates a namespacer for the given application identity. An empty
    /// identity is allowed; the digest is still well-defined.
    #[must_use]
    pub fn new(app_identity: &str) -> Self {
        Self {
            app_digest: hex::encode(Sha256::digest(app_identity.as_bytes())),
        }
    }

    /// Returns the storage key for `purpose` scoped to `unique_identifier`.
    #[must_use]
    pub fn key(&self, purpose: KeyPurpose, unique_identifier: &str) -> String {
        format!("{}{}_{unique_identifier}", self.app_digest, purpose.suffix())
    }

    /// Preference key under which a custom keychain service-name override is
    /// stored.
    #[must_use]
    pub fn custom_service_name_key(&self) -> String {
        format!("{}_CustomKeychainService", self.app_digest)
    }

    /// Service name used for hardware-backed entries when no override is set.
    #[must_use]
    pub fn default_service_name(&self) -> String {
        format!("{}_KeychainService", self.app_digest)
    }

    /// Preference key under which the cached policy-domain-state snapshot is
    /// stored.
    #[must_use]
    pub fn policy_domain_state_key(&self) -> String {
        format!("{}_PolicyDomainState", self.app_digest)
    }
}
