use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credential::Credential;
use super::error::AuthError;

/// Storage abstraction for the persisted session credential.
///
/// Exactly one credential (or none) exists per store. `save` replaces the
/// whole record and `clear` removes it; callers never see an access token
/// paired with a refresh token from a different generation.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>, AuthError>;
    fn save(&self, credential: &Credential) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

const CREDENTIALS_FILE: &str = "credentials.toml";

/// File-backed credential store using a TOML file.
///
/// # Example
/// ```no_run
/// use pendel::auth::{Credential, CredentialStore, FileCredentialStore};
///
/// let store = FileCredentialStore::new_default();
/// store.save(&Credential::new("access", "refresh", Some(1)))?;
/// # Ok::<(), pendel::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_pendel_dir(),
        }
    }

    fn credentials_path(&self) -> PathBuf {
        self.base_dir.join(CREDENTIALS_FILE)
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, AuthError> {
        let path = self.credentials_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        Ok(Some(file.credential))
    }

    fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        let path = self.credentials_path();
        Self::ensure_parent(&path)?;
        let file = CredentialFile {
            version: 1,
            credential: credential.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        // Write-to-temp plus rename: the token pair is replaced in one
        // step, so a crash mid-save can never leave a new access token
        // next to the old refresh token.
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let path = self.credentials_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    credential: Credential,
    saved_at: DateTime<Utc>,
}

fn default_pendel_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".pendel"))
        .unwrap_or_else(|| PathBuf::from(".pendel"))
}
