//! Secret storage over the two backends.
//!
//! The backend is selected per call: emulator hosts use the plain preference
//! store (synchronously), real devices use the hardware-backed secure store.
//! Hardware calls block on the platform (including the authentication
//! prompt), so they run on the tokio blocking pool and completion is
//! reported through the returned future; callers must not assume the write
//! finished when the call returns control.
//!
//! Concurrent writes for the same identifier are not serialized here;
//! callers own that ordering.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::config::Biolock;
use crate::error::{StoreError, StoreResult};
use crate::keys::KeyPurpose;
use crate::platform::AccessPolicy;

/// Runs a blocking platform call off the caller's execution context.
async fn run_blocking<T, F>(task: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(err) => Err(StoreError::Internal(err.to_string())),
    }
}

impl Biolock {
    /// Stores `secret` under `unique_identifier`.
    ///
    /// On a device, any previous entry under the same key is deleted first
    /// (absence is fine), the new entry is written gated on the biometric
    /// set enrolled right now, and the current policy-domain-state snapshot
    /// is persisted as the baseline for
    /// [`biometric_settings_changed`](Self::biometric_settings_changed).
    ///
    /// # Errors
    ///
    /// [`StoreError::AccessControl`] when the biometric access-control
    /// policy cannot be constructed, [`StoreError::InvalidData`] when the
    /// payload cannot be encoded, [`StoreError::Platform`] for any other
    /// non-success platform status.
    pub async fn set_secret(&self, secret: &SecretString, unique_identifier: &str) -> StoreResult<()> {
        let account = self.keys.key(KeyPurpose::KeychainAccount, unique_identifier);
        if self.is_running_in_emulator() {
            // Plain storage has no biometric gate; the secret goes into the
            // preference backend as-is.
            self.preferences().set_string(&account, secret.expose_secret());
            return Ok(());
        }

        let service = self.service_name();
        let store = Arc::clone(&self.secure_store);
        let authority = Arc::clone(&self.authority);
        let prefs = self.preferences();
        let state_key = self.keys.policy_domain_state_key();
        let payload = Zeroizing::new(secret.expose_secret().as_bytes().to_vec());

        run_blocking(move || {
            store.remove(&service, &account)?;
            store.insert(&service, &account, &payload, AccessPolicy::CurrentBiometricSet)?;
            // Baseline for later settings-change checks.
            match authority.policy_domain_state() {
                Some(state) => prefs.set_bytes(&state_key, state.as_bytes()),
                None => prefs.remove(&state_key),
            }
            Ok(())
        })
        .await
    }

    /// Retrieves the secret stored under `unique_identifier`, showing
    /// `operation_prompt` on the authentication dialog on the hardware path.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when nothing is stored (or the stored entry
    /// cannot be read back as text); [`StoreError::Platform`] with the raw
    /// status for any non-success platform result, so callers can branch on
    /// the code.
    pub async fn retrieve_secret(
        &self,
        unique_identifier: &str,
        operation_prompt: &str,
    ) -> StoreResult<SecretString> {
        let account = self.keys.key(KeyPurpose::KeychainAccount, unique_identifier);
        if self.is_running_in_emulator() {
            return self
                .preferences()
                .string(&account)
                .map(SecretString::from)
                .ok_or(StoreError::NotFound);
        }

        let service = self.service_name();
        let store = Arc::clone(&self.secure_store);
        let prompt = operation_prompt.to_owned();

        run_blocking(move || {
            let bytes = Zeroizing::new(store.fetch_one(&service, &account, &prompt)?);
            // A matched entry that does not decode is corrupt; degrade to
            // absent rather than fail.
            let text = std::str::from_utf8(&bytes).map_err(|_| StoreError::NotFound)?;
            Ok(SecretString::from(text.to_owned()))
        })
        .await
    }

    /// Deletes the secret stored under `unique_identifier`. Absence is not
    /// an error; deleting twice has the same effect as deleting once.
    ///
    /// # Errors
    ///
    /// [`StoreError::Platform`] for platform failures other than absence.
    pub async fn delete_secret(&self, unique_identifier: &str) -> StoreResult<()> {
        let account = self.keys.key(KeyPurpose::KeychainAccount, unique_identifier);
        if self.is_running_in_emulator() {
            self.preferences().remove(&account);
            return Ok(());
        }

        let service = self.service_name();
        let store = Arc::clone(&self.secure_store);
        run_blocking(move || store.remove(&service, &account)).await
    }

    /// Clears all three preference flags for `unique_identifier` and deletes
    /// its secret.
    ///
    /// The flags are cleared unconditionally; a delete failure is reported
    /// as the operation's result so there is no silent partial success.
    ///
    /// # Errors
    ///
    /// Whatever [`delete_secret`](Self::delete_secret) reports.
    pub async fn reset(&self, unique_identifier: &str) -> StoreResult<()> {
        let prefs = self.preferences();
        prefs.remove(&self.keys.key(KeyPurpose::DidAskToUseBiometrics, unique_identifier));
        prefs.remove(&self.keys.key(KeyPurpose::AddSecretOnNextLogin, unique_identifier));
        prefs.remove(&self.keys.key(KeyPurpose::BiometricsActivated, unique_identifier));
        self.delete_secret(unique_identifier).await
    }
}
