use std::io::BufReader;
use std::path::{Path, PathBuf};

use cookie_store::CookieStore;
use tracing::{debug, warn};

use crate::error::{ConnectError, Result};

/// On-disk cookie jar of one session.
///
/// Session cookies are written too: the portal's login cookies carry no
/// expiry, and a browser profile would keep them across page loads.
#[derive(Debug, Clone)]
pub struct CookieJarFile {
    path: PathBuf,
}

impl CookieJarFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the jar, or start empty if there is no file yet.
    ///
    /// An unreadable jar is discarded; the probe call will then fail and
    /// trigger a fresh login that overwrites it.
    pub fn load(&self) -> Result<CookieStore> {
        if !self.path.exists() {
            return Ok(CookieStore::default());
        }

        let file = std::fs::File::open(&self.path)?;
        match cookie_store::serde::json::load_all(BufReader::new(file)) {
            Ok(store) => {
                debug!(path = %self.path.display(), "Loaded session cookies");
                Ok(store)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable cookie jar");
                Ok(CookieStore::default())
            }
        }
    }

    pub fn save(&self, store: &CookieStore) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut contents = Vec::new();
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(store, &mut contents)
            .map_err(|e| ConnectError::SessionStore(format!("Failed to serialize cookies: {}", e)))?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Remove the jar file; a missing file is not an error
    pub fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_cookie() -> CookieStore {
        let mut store = CookieStore::default();
        let url = reqwest::Url::parse("https://connect.garmin.com/modern/").unwrap();
        store
            .parse("SESSIONID=abc123; Path=/", &url)
            .expect("cookie should parse");
        store
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let jar = CookieJarFile::new(dir.path().join("jar"));
        let store = jar.load().unwrap();
        assert_eq!(store.iter_any().count(), 0);
    }

    #[test]
    fn test_session_cookies_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let jar = CookieJarFile::new(dir.path().join("nested").join("jar"));
        jar.save(&store_with_cookie()).unwrap();
        assert!(jar.exists());

        let loaded = jar.load().unwrap();
        let cookie = loaded
            .get("connect.garmin.com", "/", "SESSIONID")
            .expect("session cookie should be restored");
        assert_eq!(cookie.value(), "abc123");
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar");
        std::fs::write(&path, "not json at all").unwrap();
        let store = CookieJarFile::new(path).load().unwrap();
        assert_eq!(store.iter_any().count(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let jar = CookieJarFile::new(dir.path().join("jar"));
        jar.save(&store_with_cookie()).unwrap();
        jar.remove().unwrap();
        assert!(!jar.exists());
        jar.remove().unwrap();
    }
}
