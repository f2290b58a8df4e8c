//! Capability probing: what biometric hardware a device has, what is
//! configured right now, and whether the enrolled set changed.

use crate::capability::BiometricCapability;
use crate::config::Biolock;
use crate::platform::PolicyFailure;

impl Biolock {
    /// The biometric modality this device supports, regardless of whether
    /// credentials are currently enrolled.
    ///
    /// "Not enrolled" on real hardware still counts as supported: removing
    /// every fingerprint does not remove the sensor. On an emulator the same
    /// report means nothing (emulators always report not-enrolled), so it
    /// counts as unsupported. When the direct queries are inconclusive, the
    /// cached device capability list is consulted as a fallback.
    #[must_use]
    pub fn supported_biometric_capability(&self) -> BiometricCapability {
        let model = self.authority.model_identifier();
        if self.face_usable_now()
            || self.device_list.is_listed(BiometricCapability::Face, &model)
        {
            return BiometricCapability::Face;
        }
        if self.fingerprint_supported_by_hardware()
            || self
                .device_list
                .is_listed(BiometricCapability::Fingerprint, &model)
        {
            return BiometricCapability::Fingerprint;
        }
        BiometricCapability::None
    }

    /// The biometric modality that is enrolled and usable right now, or
    /// [`BiometricCapability::None`] when no policy can be evaluated.
    #[must_use]
    pub fn configured_biometric_capability(&self) -> BiometricCapability {
        if !self.authority.evaluate_policy().can_evaluate {
            return BiometricCapability::None;
        }
        if self.face_usable_now() {
            BiometricCapability::Face
        } else {
            BiometricCapability::Fingerprint
        }
    }

    /// Whether the enrolled biometric set changed since the last check (or
    /// the last successful secret write, which stores the baseline).
    ///
    /// Compares the platform's current policy-domain-state snapshot against
    /// the persisted copy; when a change is reported, the persisted copy is
    /// updated in the same call. An absent snapshot is how the platform
    /// reports "nothing enrolled" (and, ambiguously, some no-op cases), so
    /// only transitions where at least one side is absent qualify:
    /// absent-to-present and present-to-absent count as changes, while two
    /// differing present snapshots do not.
    #[must_use]
    pub fn biometric_settings_changed(&self) -> bool {
        let prefs = self.preferences();
        let key = self.keys.policy_domain_state_key();
        let stored = prefs.bytes(&key);
        let current = self
            .authority
            .policy_domain_state()
            .map(crate::capability::PolicyDomainState::into_bytes);

        if (stored.is_some() && current.is_some()) || stored == current {
            return false;
        }
        match &current {
            Some(bytes) => prefs.set_bytes(&key, bytes),
            None => prefs.remove(&key),
        }
        log::debug!("enrolled biometric set changed");
        true
    }

    /// Whether the process runs in an emulator and therefore has no
    /// hardware-backed secure store.
    #[must_use]
    pub fn is_running_in_emulator(&self) -> bool {
        self.environment
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_emulator()
    }

    /// Face is usable right now: the policy evaluates and the hardware
    /// reports the face modality.
    fn face_usable_now(&self) -> bool {
        self.authority.evaluate_policy().can_evaluate
            && self.authority.biometry_kind() == BiometricCapability::Face
    }

    /// Whether the hardware nominally supports fingerprint authentication.
    fn fingerprint_supported_by_hardware(&self) -> bool {
        let evaluation = self.authority.evaluate_policy();
        if !evaluation.can_evaluate {
            match evaluation.failure {
                Some(PolicyFailure::BiometryNotAvailable) => return false,
                // Emulators always report not-enrolled and cannot tell us
                // what the host hardware would support.
                Some(PolicyFailure::BiometryNotEnrolled) if self.is_running_in_emulator() => {
                    return false
                }
                _ => {}
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use test_case::test_case;

    use crate::capability::{PolicyDomainState, RuntimeEnvironment};
    use crate::platform::memory::MemoryPlatform;
    use crate::platform::{
        AtomicBlobStore, BiometricAuthority, PolicyEvaluation, PreferenceStore, SecureStore,
    };
    use super::*;

    fn instance(platform: &MemoryPlatform, environment: RuntimeEnvironment) -> Biolock {
        Biolock::builder()
            .app_identity("com.example.app")
            .environment(environment)
            .biometric_authority(Arc::clone(&platform.authority) as Arc<dyn BiometricAuthority>)
            .secure_store(Arc::clone(&platform.secure_store) as Arc<dyn SecureStore>)
            .preference_store(Arc::clone(&platform.preferences) as Arc<dyn PreferenceStore>)
            .blob_store(Arc::clone(&platform.blob_store) as Arc<dyn AtomicBlobStore>)
            .build()
            .expect("build")
    }

    #[test]
    fn test_face_takes_precedence_over_fingerprint() {
        let platform = MemoryPlatform::new();
        platform.authority.set_evaluation(PolicyEvaluation::usable());
        platform
            .authority
            .set_biometry_kind(BiometricCapability::Face);
        let vault = instance(&platform, RuntimeEnvironment::Device);

        // The policy evaluates, so the fingerprint rule would also qualify;
        // Face must still win.
        assert_eq!(
            vault.supported_biometric_capability(),
            BiometricCapability::Face
        );
        assert_eq!(
            vault.configured_biometric_capability(),
            BiometricCapability::Face
        );
    }

    #[test]
    fn test_fingerprint_reported_when_face_query_fails() {
        let platform = MemoryPlatform::new();
        platform.authority.set_evaluation(PolicyEvaluation::usable());
        platform
            .authority
            .set_biometry_kind(BiometricCapability::Fingerprint);
        let vault = instance(&platform, RuntimeEnvironment::Device);

        assert_eq!(
            vault.supported_biometric_capability(),
            BiometricCapability::Fingerprint
        );
        assert_eq!(
            vault.configured_biometric_capability(),
            BiometricCapability::Fingerprint
        );
    }

    #[test]
    fn test_not_enrolled_on_device_still_counts_as_supported() {
        let platform = MemoryPlatform::new();
        platform
            .authority
            .set_evaluation(PolicyEvaluation::failed(PolicyFailure::BiometryNotEnrolled));
        let vault = instance(&platform, RuntimeEnvironment::Device);

        assert_eq!(
            vault.supported_biometric_capability(),
            BiometricCapability::Fingerprint
        );
        // Nothing is enrolled, so nothing is configured.
        assert_eq!(
            vault.configured_biometric_capability(),
            BiometricCapability::None
        );
    }

    #[test]
    fn test_not_enrolled_on_emulator_counts_as_unsupported() {
        let platform = MemoryPlatform::new();
        platform
            .authority
            .set_evaluation(PolicyEvaluation::failed(PolicyFailure::BiometryNotEnrolled));
        let vault = instance(&platform, RuntimeEnvironment::Emulator);

        assert_eq!(
            vault.supported_biometric_capability(),
            BiometricCapability::None
        );
    }

    #[test]
    fn test_biometry_not_available_means_none() {
        let platform = MemoryPlatform::new();
        platform
            .authority
            .set_evaluation(PolicyEvaluation::failed(PolicyFailure::BiometryNotAvailable));
        let vault = instance(&platform, RuntimeEnvironment::Device);

        assert_eq!(
            vault.supported_biometric_capability(),
            BiometricCapability::None
        );
        assert_eq!(
            vault.configured_biometric_capability(),
            BiometricCapability::None
        );
    }

    #[test]
    fn test_device_list_fallback_detects_face_capable_model() {
        let platform = MemoryPlatform::new();
        platform
            .authority
            .set_evaluation(PolicyEvaluation::failed(PolicyFailure::BiometryNotAvailable));
        platform.authority.set_model_identifier("Phone10,3");
        platform
            .blob_store
            .write_atomic(
                crate::feed::DEVICE_LIST_RESOURCE,
                br#"{"face_id_devices":[{"id":"Phone10,3","name":"Phone X"}],"touch_id_devices":[]}"#,
            )
            .expect("seed cache");
        let vault = instance(&platform, RuntimeEnvironment::Device);

        assert_eq!(
            vault.supported_biometric_capability(),
            BiometricCapability::Face
        );
    }

    #[test_case(None, None => false; "absent to absent")]
    #[test_case(None, Some(vec![1]) => true; "absent to present")]
    #[test_case(Some(vec![1]), Some(vec![1]) => false; "present to same present")]
    #[test_case(Some(vec![1]), Some(vec![2]) => false; "present to different present")]
    #[test_case(Some(vec![1]), None => true; "present to absent")]
    fn test_settings_changed_detection(old: Option<Vec<u8>>, new: Option<Vec<u8>>) -> bool {
        let platform = MemoryPlatform::new();
        let vault = instance(&platform, RuntimeEnvironment::Device);

        platform
            .authority
            .set_domain_state(old.map(PolicyDomainState::new));
        // First call seeds (or clears) the persisted snapshot.
        let _ = vault.biometric_settings_changed();

        platform
            .authority
            .set_domain_state(new.map(PolicyDomainState::new));
        vault.biometric_settings_changed()
    }

    #[test]
    fn test_settings_change_reported_once_then_stable() {
        let platform = MemoryPlatform::new();
        let vault = instance(&platform, RuntimeEnvironment::Device);

        platform
            .authority
            .set_domain_state(Some(PolicyDomainState::new(vec![7])));
        assert!(vault.biometric_settings_changed());
        // The snapshot was persisted along with the report.
        assert!(!vault.biometric_settings_changed());
    }
}
