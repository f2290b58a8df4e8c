//! Biometric authority trait: the platform's answer to "can the user
//! authenticate biometrically, and how".

use crate::capability::{BiometricCapability, PolicyDomainState};

/// Why the platform refused to evaluate the biometric policy.
///
/// The two named conditions drive real decisions (see
/// [`crate::Biolock::supported_biometric_capability`]); anything else is
/// carried as the raw platform code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFailure {
    /// Biometric hardware is not available at all.
    BiometryNotAvailable,
    /// Hardware exists but no biometric credentials are enrolled.
    BiometryNotEnrolled,
    /// Any other platform error code.
    Other(i32),
}

/// Outcome of asking the platform whether a biometric policy can currently
/// be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEvaluation {
    /// `true` when the user could authenticate biometrically right now.
    pub can_evaluate: bool,
    /// Present when evaluation is not possible, naming the reason.
    pub failure: Option<PolicyFailure>,
}

impl PolicyEvaluation {
    /// Evaluation succeeded; biometrics are usable right now.
    #[must_use]
    pub const fn usable() -> Self {
        Self {
            can_evaluate: true,
            failure: None,
        }
    }

    /// Evaluation failed for the given reason.
    #[must_use]
    pub const fn failed(failure: PolicyFailure) -> Self {
        Self {
            can_evaluate: false,
            failure: Some(failure),
        }
    }
}

/// Platform subsystem answering biometric capability queries.
///
/// The core only reads from the authority; it never configures platform
/// policy. Implementations should create a fresh evaluation context per call
/// so results reflect the current enrollment state.
pub trait BiometricAuthority: Send + Sync {
    /// Asks whether a biometric policy can be evaluated right now.
    fn evaluate_policy(&self) -> PolicyEvaluation;

    /// The modality the hardware reports for the current evaluation context,
    /// or [`BiometricCapability::None`] when the query is inconclusive.
    fn biometry_kind(&self) -> BiometricCapability;

    /// Opaque snapshot of the enrolled credential set, absent when nothing
    /// is enrolled. Only ever compared for equality.
    fn policy_domain_state(&self) -> Option<PolicyDomainState>;

    /// Hardware model identifier, used to look the device up in the
    /// capability feed when direct queries are inconclusive.
    fn model_identifier(&self) -> String;
}
