use std::fmt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{ConnectError, Result};

/// Prefix of every session cookie file
const SESSION_FILE_PREFIX: &str = "GarminCookie_";

/// Opaque key derived from a username.
///
/// Only the hash is kept, so the username never ends up in a file name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    key: String,
}

impl Identity {
    pub fn from_username(username: &str) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(ConnectError::invalid_parameter("Identifier isn't valid"));
        }
        let digest = Sha256::digest(username.as_bytes());
        Ok(Self {
            key: hex::encode(digest),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Cookie file for this identity inside `dir`
    pub fn session_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}{}", SESSION_FILE_PREFIX, self.key))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", &self.key[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_stable_sha256() {
        let a = Identity::from_username("runner@example.com").unwrap();
        let b = Identity::from_username("runner@example.com").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key().len(), 64);
        assert!(a.key().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, Identity::from_username("other@example.com").unwrap());
    }

    #[test]
    fn test_blank_username_rejected() {
        assert!(matches!(
            Identity::from_username("   "),
            Err(ConnectError::InvalidParameter(_))
        ));
        assert!(Identity::from_username("").is_err());
    }

    #[test]
    fn test_session_path_hides_username() {
        let identity = Identity::from_username("runner@example.com").unwrap();
        let path = identity.session_path(Path::new("/tmp/sessions"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("GarminCookie_"));
        assert!(!name.contains("runner"));
        assert_eq!(path.parent(), Some(Path::new("/tmp/sessions")));
    }
}
