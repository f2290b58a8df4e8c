//! Biometric capability and environment types shared across the crate.

use std::fmt;

use strum::Display;

/// Biometric modality a device supports or has configured.
///
/// When a device qualifies for both modalities, Face takes precedence; every
/// probe checks Face first and only then falls through to Fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BiometricCapability {
    /// No usable biometric modality.
    #[default]
    None,
    /// Fingerprint-based authentication.
    Fingerprint,
    /// Face-based authentication.
    Face,
}

/// Opaque snapshot of the enrolled biometric credential set.
///
/// Owned by the platform security subsystem; this crate only stores a cached
/// copy and compares snapshots byte-for-byte to detect enrollment changes.
/// Absence (no biometrics enrolled) is modelled as `Option::None` and is
/// distinct from "unchanged".
#[derive(Clone, PartialEq, Eq)]
pub struct PolicyDomainState(Vec<u8>);

impl PolicyDomainState {
    /// Wraps a raw snapshot obtained from the platform.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec cannot be const
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw snapshot bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the snapshot and returns the raw bytes.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec cannot be const
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for PolicyDomainState {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for PolicyDomainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolicyDomainState({})", hex::encode(&self.0))
    }
}

/// Where the process is running, which decides the storage backend.
///
/// Hardware-backed secure storage only exists on a real device; emulator and
/// simulator hosts fall back to the plain preference backend. The value is
/// re-read on every store operation so a runtime override (tests, emulator
/// hosts) takes effect immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Real device with a hardware-backed secure store.
    Device,
    /// Emulator or simulator; only the plain preference backend is available.
    Emulator,
}

impl RuntimeEnvironment {
    /// Detects the environment from the compile target: mobile targets are
    /// devices, everything else is treated as an emulator host.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(any(target_os = "ios", target_os = "android")) {
            Self::Device
        } else {
            Self::Emulator
        }
    }

    /// Whether this environment lacks hardware-backed storage.
    #[must_use]
    pub const fn is_emulator(self) -> bool {
        matches!(self, Self::Emulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_display() {
        assert_eq!(BiometricCapability::Face.to_string(), "face");
        assert_eq!(BiometricCapability::Fingerprint.to_string(), "fingerprint");
        assert_eq!(BiometricCapability::None.to_string(), "none");
    }

    #[test]
    fn test_domain_state_equality_is_byte_for_byte() {
        let a = PolicyDomainState::new(vec![1, 2, 3]);
        let b = PolicyDomainState::from(vec![1, 2, 3]);
        let c = PolicyDomainState::new(vec![1, 2, 4]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_domain_state_debug_is_hex() {
        let state = PolicyDomainState::new(vec![0xab, 0xcd]);
        assert_eq!(format!("{state:?}"), "PolicyDomainState(abcd)");
    }
}
