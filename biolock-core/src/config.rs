//! Construction and process-wide configuration of the storage core.
//!
//! All mutable configuration (preference store, environment override, sync
//! flag) lives on one [`Biolock`] instance. Configure it at startup, before
//! handing it to concurrent callers; later writes win over earlier ones but
//! are not coordinated with in-flight operations.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::capability::RuntimeEnvironment;
use crate::feed::{DeviceListCache, DEVICE_LIST_ENDPOINT};
use crate::http::HttpClient;
use crate::keys::KeyNamespacer;
use crate::platform::memory::{MemoryAuthority, MemoryBlobStore, MemoryPreferences, MemorySecureStore};
use crate::platform::{
    AtomicBlobStore, BiometricAuthority, FileBlobStore, FilePreferences, PreferenceStore,
    SecureStore,
};

/// File name of the preference document inside the data directory.
const PREFERENCES_FILENAME: &str = "preferences.json";

/// Application identity of the current process: the executable's file stem,
/// or the empty string when it cannot be determined.
fn detect_app_identity() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

/// Biometric-gated secret storage for one application.
///
/// The instance decides per operation whether secrets go to the
/// hardware-backed secure store or the plain preference backend, derives the
/// namespaced storage keys, probes biometric capability, and tracks the
/// caller's per-identifier intent flags.
pub struct Biolock {
    pub(crate) keys: KeyNamespacer,
    pub(crate) authority: Arc<dyn BiometricAuthority>,
    pub(crate) secure_store: Arc<dyn SecureStore>,
    pub(crate) prefs: RwLock<Arc<dyn PreferenceStore>>,
    pub(crate) environment: RwLock<RuntimeEnvironment>,
    pub(crate) device_list: DeviceListCache,
    pub(crate) http: HttpClient,
    sync_enabled: AtomicBool,
}

impl Biolock {
    /// Starts building an instance.
    #[must_use]
    pub fn builder() -> BiolockBuilder {
        BiolockBuilder::default()
    }

    /// Replaces the plain preference store used by flags, emulator-mode
    /// secrets, and cached snapshots. Intended for startup configuration;
    /// the last writer wins.
    pub fn set_preference_store(&self, store: Arc<dyn PreferenceStore>) {
        *self.prefs.write().unwrap_or_else(PoisonError::into_inner) = store;
    }

    /// Overrides the detected runtime environment. Takes effect on the next
    /// operation; backend selection is re-evaluated per call.
    pub fn set_runtime_environment(&self, environment: RuntimeEnvironment) {
        *self
            .environment
            .write()
            .unwrap_or_else(PoisonError::into_inner) = environment;
    }

    /// Whether device-list synchronization is enabled.
    #[must_use]
    pub fn device_list_sync_enabled(&self) -> bool {
        self.sync_enabled.load(Ordering::Relaxed)
    }

    /// Enables or disables device-list synchronization. Enabling triggers a
    /// best-effort refresh of the capability feed when the device's support
    /// is still inconclusive; the refresh never reports failures.
    pub async fn set_device_list_sync_enabled(&self, enabled: bool) {
        if enabled {
            self.refresh_device_list_if_inconclusive().await;
        }
        self.sync_enabled.store(enabled, Ordering::Relaxed);
    }

    /// The custom keychain service-name override, if one is stored.
    #[must_use]
    pub fn custom_service_name(&self) -> Option<String> {
        self.preferences().string(&self.keys.custom_service_name_key())
    }

    /// Stores or clears the keychain service-name override used for
    /// hardware-backed entries. Existing entries stay under the service name
    /// they were written with.
    pub fn set_custom_service_name(&self, service: Option<&str>) {
        let key = self.keys.custom_service_name_key();
        match service {
            Some(name) => self.preferences().set_string(&key, name),
            None => self.preferences().remove(&key),
        }
    }

    pub(crate) fn preferences(&self) -> Arc<dyn PreferenceStore> {
        Arc::clone(&self.prefs.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn service_name(&self) -> String {
        self.custom_service_name()
            .unwrap_or_else(|| self.keys.default_service_name())
    }

    async fn refresh_device_list_if_inconclusive(&self) {
        if self.is_running_in_emulator() {
            return;
        }
        if self.supported_biometric_capability() != crate::BiometricCapability::None {
            return;
        }
        self.device_list.refresh(&self.http).await;
    }
}

/// Builder for [`Biolock`].
///
/// Platform pieces not supplied fall back to the in-memory implementations,
/// which is the right default for tests and emulator hosts; real deployments
/// supply their platform's secure store and biometric authority. With a data
/// directory set, preferences and the feed cache persist to disk there.
#[derive(Default)]
pub struct BiolockBuilder {
    app_identity: Option<String>,
    environment: Option<RuntimeEnvironment>,
    data_dir: Option<PathBuf>,
    preference_store: Option<Arc<dyn PreferenceStore>>,
    blob_store: Option<Arc<dyn AtomicBlobStore>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    authority: Option<Arc<dyn BiometricAuthority>>,
    feed_endpoint: Option<String>,
}

impl BiolockBuilder {
    /// Sets the application identity the key namespace is derived from.
    /// Defaults to the current executable's file stem.
    #[must_use]
    pub fn app_identity(mut self, identity: impl Into<String>) -> Self {
        self.app_identity = Some(identity.into());
        self
    }

    /// Overrides the detected runtime environment.
    #[must_use]
    pub fn environment(mut self, environment: RuntimeEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Directory for the preference document and the cached device list.
    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Supplies a custom preference store.
    #[must_use]
    pub fn preference_store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.preference_store = Some(store);
        self
    }

    /// Supplies a custom blob store for the cached device list.
    #[must_use]
    pub fn blob_store(mut self, store: Arc<dyn AtomicBlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    /// Supplies the platform's hardware-backed secure store.
    #[must_use]
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Supplies the platform's biometric authority.
    #[must_use]
    pub fn biometric_authority(mut self, authority: Arc<dyn BiometricAuthority>) -> Self {
        self.authority = Some(authority);
        self
    }

    /// Overrides the capability-feed endpoint.
    #[must_use]
    pub fn device_list_endpoint(mut self, url: impl Into<String>) -> Self {
        self.feed_endpoint = Some(url.into());
        self
    }

    /// Builds the instance.
    ///
    /// # Errors
    ///
    /// Returns an error when a data directory is set but its preference
    /// document exists and cannot be read.
    pub fn build(self) -> io::Result<Biolock> {
        let app_identity = self.app_identity.unwrap_or_else(detect_app_identity);
        let keys = KeyNamespacer::new(&app_identity);
        let environment = self.environment.unwrap_or_else(RuntimeEnvironment::detect);

        let prefs: Arc<dyn PreferenceStore> = match (self.preference_store, &self.data_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FilePreferences::open(dir.join(PREFERENCES_FILENAME))?),
            (None, None) => Arc::new(MemoryPreferences::new()),
        };
        let blobs: Arc<dyn AtomicBlobStore> = match (self.blob_store, self.data_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FileBlobStore::new(dir)),
            (None, None) => Arc::new(MemoryBlobStore::new()),
        };
        let authority = self
            .authority
            .unwrap_or_else(|| Arc::new(MemoryAuthority::new()));
        let secure_store = self
            .secure_store
            .unwrap_or_else(|| Arc::new(MemorySecureStore::new()));
        let endpoint = self
            .feed_endpoint
            .unwrap_or_else(|| DEVICE_LIST_ENDPOINT.to_owned());

        Ok(Biolock {
            keys,
            authority,
            secure_store,
            prefs: RwLock::new(prefs),
            environment: RwLock::new(environment),
            device_list: DeviceListCache::new(endpoint, blobs),
            http: HttpClient::new(),
            sync_enabled: AtomicBool::new(false),
        })
    }
}
