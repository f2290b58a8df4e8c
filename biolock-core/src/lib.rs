//! Biometric-gated secret storage for mobile applications.
//!
//! This crate is the decision engine behind a biometric-gated secrets API:
//!
//! - **Capability probing** — what biometric hardware the device has
//!   ([`Biolock::supported_biometric_capability`]), what is enrolled and
//!   usable right now ([`Biolock::configured_biometric_capability`]), and
//!   whether the enrolled set changed since the last check
//!   ([`Biolock::biometric_settings_changed`]). A best-effort remote device
//!   list backs the probe up when direct platform queries are inconclusive.
//! - **Backend selection** — secrets go to a hardware-backed secure store on
//!   real devices and to a plain preference store on emulator hosts, decided
//!   per operation.
//! - **Key namespacing** — every stored value is keyed per application and
//!   per caller-supplied identifier ([`KeyNamespacer`]), so two purposes or
//!   two identifiers never collide.
//!
//! Probing does not gate storage: callers decide what a capability result
//! means for their flow and call the store operations directly.
//!
//! Platform specifics live behind the traits in [`platform`], with
//! in-memory implementations for tests and emulator hosts:
//!
//! ```
//! use biolock_core::{Biolock, SecretString};
//! use secrecy::ExposeSecret;
//!
//! # fn main() -> std::io::Result<()> {
//! let vault = Biolock::builder().app_identity("com.example.demo").build()?;
//!
//! tokio_test::block_on(async {
//!     vault
//!         .set_secret(&SecretString::from("hunter2".to_owned()), "session-token")
//!         .await
//!         .expect("store");
//!     let secret = vault
//!         .retrieve_secret("session-token", "Unlock your session")
//!         .await
//!         .expect("fetch");
//!     assert_eq!(secret.expose_secret(), "hunter2");
//! });
//! # Ok(())
//! # }
//! ```

mod capability;
mod config;
mod error;
mod feed;
mod flags;
mod http;
mod keys;
pub mod platform;
mod probe;
mod store;

pub use capability::{BiometricCapability, PolicyDomainState, RuntimeEnvironment};
pub use config::{Biolock, BiolockBuilder};
pub use error::{StoreError, StoreResult};
pub use feed::{DeviceEntry, DeviceListDocument, DEVICE_LIST_ENDPOINT};
pub use keys::{KeyNamespacer, KeyPurpose};

// Re-exported so callers construct and read secrets without naming the
// underlying crate.
pub use secrecy::SecretString;
