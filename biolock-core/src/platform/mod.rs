//! Platform abstraction traits for the storage core.
//!
//! All platform-specific behavior sits behind traits so the decision engine
//! stays host-agnostic:
//!
//! - [`BiometricAuthority`] — answers "can the user authenticate
//!   biometrically right now" and "with which modality".
//! - [`SecureStore`] — hardware-backed keyed storage whose entries require a
//!   fresh biometric check to read.
//! - [`PreferenceStore`] — plain key-value storage for flags, overrides, and
//!   emulator-mode secrets.
//! - [`AtomicBlobStore`] — whole-file atomic replacement for the cached
//!   device capability list.
//!
//! Each target platform provides one production implementation per trait
//! (keychain services and the local authentication context on iOS, keystore
//! and `BiometricManager` on Android). The in-memory implementations in
//! [`memory`] back tests and emulator hosts.

mod authority;
mod blob_store;
pub mod memory;
mod preferences;
mod secure_store;

pub use authority::{BiometricAuthority, PolicyEvaluation, PolicyFailure};
pub use blob_store::{AtomicBlobStore, FileBlobStore};
pub use memory::MemoryPlatform;
pub use preferences::{FilePreferences, PreferenceStore};
pub use secure_store::{AccessPolicy, SecureStore, STATUS_ITEM_NOT_FOUND};
