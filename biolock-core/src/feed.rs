//! Device capability feed: a remote, best-effort list of device models known
//! to support each biometric modality.
//!
//! The feed is only a fallback oracle for capability probing when direct
//! platform queries are inconclusive. It is cached locally under a fixed
//! resource name and replaced wholesale on refresh; a failed refresh leaves
//! the previous cache untouched and is never surfaced to callers.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::capability::BiometricCapability;
use crate::http::HttpClient;
use crate::platform::AtomicBlobStore;

/// Default endpoint serving the device capability list.
pub const DEVICE_LIST_ENDPOINT: &str =
    "https://private-7d1e4-lockerdevices.apiary-mock.com/devices";

/// Fixed resource name the fetched list is cached under.
pub(crate) const DEVICE_LIST_RESOURCE: &str = "biometry_device_list.json";

/// One device entry in the capability feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Hardware model identifier, e.g. `iPhone10,3`.
    pub id: String,
    /// Marketing name of the model.
    pub name: String,
}

/// Wire document of the capability feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceListDocument {
    /// Models supporting face-based authentication.
    pub face_id_devices: Vec<DeviceEntry>,
    /// Models supporting fingerprint-based authentication.
    pub touch_id_devices: Vec<DeviceEntry>,
}

impl DeviceListDocument {
    /// Whether `model` is listed as supporting `modality`.
    #[must_use]
    pub fn contains(&self, modality: BiometricCapability, model: &str) -> bool {
        let devices = match modality {
            BiometricCapability::Face => &self.face_id_devices,
            BiometricCapability::Fingerprint => &self.touch_id_devices,
            BiometricCapability::None => return false,
        };
        devices.iter().any(|device| device.id == model)
    }
}

/// Local cache of the capability feed.
pub(crate) struct DeviceListCache {
    endpoint: String,
    blobs: Arc<dyn AtomicBlobStore>,
    cached: RwLock<Option<DeviceListDocument>>,
}

impl DeviceListCache {
    /// Creates the cache, loading any previously persisted copy. An
    /// unreadable copy counts as no cache.
    pub(crate) fn new(endpoint: String, blobs: Arc<dyn AtomicBlobStore>) -> Self {
        let cached = match blobs.read(DEVICE_LIST_RESOURCE) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).map_or_else(
                |err| {
                    log::warn!("cached device list unreadable: {err}");
                    None
                },
                Some,
            ),
            Ok(None) => None,
            Err(err) => {
                log::warn!("cached device list unreadable: {err}");
                None
            }
        };
        Self {
            endpoint,
            blobs,
            cached: RwLock::new(cached),
        }
    }

    /// Pure lookup against the cached copy; `false` when no cache exists.
    pub(crate) fn is_listed(&self, modality: BiometricCapability, model: &str) -> bool {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|document| document.contains(modality, model))
    }

    /// Fetches the feed and replaces the cache. Every failure is logged and
    /// swallowed; the previous cache stays in place.
    pub(crate) async fn refresh(&self, http: &HttpClient) {
        match http.get_json::<DeviceListDocument>(&self.endpoint).await {
            Ok(document) => self.replace(document),
            Err(err) => log::warn!("device list refresh failed: {err}"),
        }
    }

    fn replace(&self, document: DeviceListDocument) {
        match serde_json::to_vec(&document) {
            Ok(bytes) => {
                if let Err(err) = self.blobs.write_atomic(DEVICE_LIST_RESOURCE, &bytes) {
                    log::warn!("device list cache not persisted: {err}");
                }
            }
            Err(err) => log::warn!("device list not encodable: {err}"),
        }
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(document);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::MemoryBlobStore;

    const FACE_MODEL: &str = "Phone10,3";

    fn feed_body() -> String {
        format!(
            r#"{{"face_id_devices":[{{"id":"{FACE_MODEL}","name":"Phone X"}}],"touch_id_devices":[{{"id":"Phone8,1","name":"Phone 6s"}}]}}"#
        )
    }

    fn cache_with_blobs() -> (DeviceListCache, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        let cache = DeviceListCache::new(String::new(), Arc::clone(&blobs) as Arc<dyn AtomicBlobStore>);
        (cache, blobs)
    }

    #[test]
    fn test_no_cache_lists_nothing() {
        let (cache, _blobs) = cache_with_blobs();
        assert!(!cache.is_listed(BiometricCapability::Face, FACE_MODEL));
        assert!(!cache.is_listed(BiometricCapability::None, FACE_MODEL));
    }

    #[tokio::test]
    async fn test_refresh_populates_and_persists_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/devices")
            .with_status(200)
            .with_body(feed_body())
            .create_async()
            .await;

        let blobs = Arc::new(MemoryBlobStore::new());
        let cache = DeviceListCache::new(
            format!("{}/devices", server.url()),
            Arc::clone(&blobs) as Arc<dyn AtomicBlobStore>,
        );
        cache.refresh(&HttpClient::new()).await;
        mock.assert_async().await;

        assert!(cache.is_listed(BiometricCapability::Face, FACE_MODEL));
        assert!(cache.is_listed(BiometricCapability::Fingerprint, "Phone8,1"));
        assert!(!cache.is_listed(BiometricCapability::Face, "Phone8,1"));

        // A fresh cache over the same blob store sees the persisted copy.
        let reloaded = DeviceListCache::new(String::new(), blobs);
        assert!(reloaded.is_listed(BiometricCapability::Face, FACE_MODEL));
    }

    #[tokio::test]
    async fn test_failed_refresh_retains_previous_cache() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/devices")
            .with_status(200)
            .with_body(feed_body())
            .create_async()
            .await;

        let blobs = Arc::new(MemoryBlobStore::new());
        let cache = DeviceListCache::new(format!("{}/devices", server.url()), blobs);
        let http = HttpClient::new();
        cache.refresh(&http).await;
        ok.remove_async().await;

        server
            .mock("GET", "/devices")
            .with_status(404)
            .create_async()
            .await;
        cache.refresh(&http).await;
        assert!(cache.is_listed(BiometricCapability::Face, FACE_MODEL));
    }

    #[tokio::test]
    async fn test_malformed_body_retains_previous_cache() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/devices")
            .with_status(200)
            .with_body(feed_body())
            .create_async()
            .await;

        let blobs = Arc::new(MemoryBlobStore::new());
        let cache = DeviceListCache::new(format!("{}/devices", server.url()), blobs);
        let http = HttpClient::new();
        cache.refresh(&http).await;
        ok.remove_async().await;

        server
            .mock("GET", "/devices")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;
        cache.refresh(&http).await;
        assert!(cache.is_listed(BiometricCapability::Face, FACE_MODEL));
    }
}
