//! Per-identifier preference flags recording the caller's biometric intent.
//!
//! Three independent booleans per unique identifier, persisted in the plain
//! preference store under namespaced keys. The only coupling: a feature that
//! has been switched off cannot keep a pending keychain write, so disabling
//! the opt-in clears the pending-write flag first.

use crate::config::Biolock;
use crate::keys::KeyPurpose;

impl Biolock {
    /// Whether the user opted into biometric authentication for
    /// `unique_identifier`.
    #[must_use]
    pub fn should_use_biometric_authentication(&self, unique_identifier: &str) -> bool {
        self.preferences()
            .bool(&self.keys.key(KeyPurpose::BiometricsActivated, unique_identifier))
    }

    /// Records whether the user opted into biometric authentication for
    /// `unique_identifier`. Opting out clears any pending keychain write.
    pub fn set_should_use_biometric_authentication(
        &self,
        should_use: bool,
        unique_identifier: &str,
    ) {
        if !should_use && self.should_store_secret_on_next_login(unique_identifier) {
            self.set_should_store_secret_on_next_login(false, unique_identifier);
        }
        self.preferences().set_bool(
            &self.keys.key(KeyPurpose::BiometricsActivated, unique_identifier),
            should_use,
        );
    }

    /// Whether the user was already asked about enabling biometric
    /// authentication for `unique_identifier`.
    #[must_use]
    pub fn did_ask_to_use_biometric_authentication(&self, unique_identifier: &str) -> bool {
        self.preferences()
            .bool(&self.keys.key(KeyPurpose::DidAskToUseBiometrics, unique_identifier))
    }

    /// Records whether the user was asked about enabling biometric
    /// authentication for `unique_identifier`.
    pub fn set_did_ask_to_use_biometric_authentication(
        &self,
        was_asked: bool,
        unique_identifier: &str,
    ) {
        self.preferences().set_bool(
            &self.keys.key(KeyPurpose::DidAskToUseBiometrics, unique_identifier),
            was_asked,
        );
    }

    /// Whether the secret for `unique_identifier` should be written to the
    /// keychain on the next login.
    #[must_use]
    pub fn should_store_secret_on_next_login(&self, unique_identifier: &str) -> bool {
        self.preferences()
            .bool(&self.keys.key(KeyPurpose::AddSecretOnNextLogin, unique_identifier))
    }

    /// Records whether the secret for `unique_identifier` should be written
    /// to the keychain on the next login.
    pub fn set_should_store_secret_on_next_login(
        &self,
        should_store: bool,
        unique_identifier: &str,
    ) {
        self.preferences().set_bool(
            &self.keys.key(KeyPurpose::AddSecretOnNextLogin, unique_identifier),
            should_store,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::platform::memory::MemoryPlatform;
    use crate::platform::PreferenceStore;

    use super::*;

    fn instance(platform: &MemoryPlatform) -> Biolock {
        Biolock::builder()
            .app_identity("com.example.app")
            .preference_store(Arc::clone(&platform.preferences) as Arc<dyn PreferenceStore>)
            .build()
            .expect("build")
    }

    #[test]
    fn test_flags_default_to_false() {
        let platform = MemoryPlatform::new();
        let vault = instance(&platform);
        assert!(!vault.should_use_biometric_authentication("id"));
        assert!(!vault.did_ask_to_use_biometric_authentication("id"));
        assert!(!vault.should_store_secret_on_next_login("id"));
    }

    #[test]
    fn test_flags_are_independent_per_identifier() {
        let platform = MemoryPlatform::new();
        let vault = instance(&platform);

        vault.set_should_use_biometric_authentication(true, "alice");
        vault.set_did_ask_to_use_biometric_authentication(true, "alice");

        assert!(vault.should_use_biometric_authentication("alice"));
        assert!(!vault.should_use_biometric_authentication("bob"));
        assert!(vault.did_ask_to_use_biometric_authentication("alice"));
        assert!(!vault.did_ask_to_use_biometric_authentication("bob"));
    }

    #[test]
    fn test_opting_out_clears_pending_write() {
        let platform = MemoryPlatform::new();
        let vault = instance(&platform);

        vault.set_should_use_biometric_authentication(true, "id");
        vault.set_should_store_secret_on_next_login(true, "id");
        assert!(vault.should_store_secret_on_next_login("id"));

        vault.set_should_use_biometric_authentication(false, "id");
        assert!(!vault.should_use_biometric_authentication("id"));
        assert!(!vault.should_store_secret_on_next_login("id"));
    }

    #[test]
    fn test_opting_in_leaves_pending_write_alone() {
        let platform = MemoryPlatform::new();
        let vault = instance(&platform);

        vault.set_should_store_secret_on_next_login(true, "id");
        vault.set_should_use_biometric_authentication(true, "id");
        assert!(vault.should_store_secret_on_next_login("id"));
    }

    #[test]
    fn test_did_ask_does_not_cascade() {
        let platform = MemoryPlatform::new();
        let vault = instance(&platform);

        vault.set_should_store_secret_on_next_login(true, "id");
        vault.set_did_ask_to_use_biometric_authentication(false, "id");
        assert!(vault.should_store_secret_on_next_login("id"));
    }
}
