//! Atomic blob store trait for whole-file replacement.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Storage for small named blobs where every write replaces the whole value.
///
/// Writes must be atomic (write-to-temp-then-rename) so a reader only ever
/// observes the complete old content or the complete new content, never a
/// partial state.
pub trait AtomicBlobStore: Send + Sync {
    /// Reads the blob named `name`, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the read itself fails.
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Atomically replaces the blob named `name` with `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error when the write or rename fails.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Deletes the blob named `name`. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for actual I/O failures.
    fn delete(&self, name: &str) -> io::Result<()>;
}

/// Replaces `path` with `bytes` via a sibling temp file and rename.
pub(crate) fn atomic_replace(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

/// File-system blob store rooted at a directory.
#[derive(Debug)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Creates a blob store rooted at `root`. The directory is created on
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AtomicBlobStore for FileBlobStore {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.root.join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        atomic_replace(&self.root.join(name), bytes)
    }

    fn delete(&self, name: &str) -> io::Result<()> {
        match fs::remove_file(self.root.join(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
