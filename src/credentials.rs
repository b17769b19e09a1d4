// Credential store: keeps the session cookie pair issued by the judge in a
// small JSON file under the user's configuration directory, so that later
// invocations can reuse the session without logging in again.

use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Directory under each configuration root that holds our files.
pub const APP_DIR: &str = "syojctl";
/// File name of the stored session.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Session cookie pair returned by the judge after a successful login.
///
/// Both values are opaque; they are copied into the `Token` and `TokenId`
/// cookies of every authenticated request.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub token_id: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_id: token_id.into(),
        }
    }

    /// A record is only usable for an authenticated request when both
    /// cookie values are present and can be sent as cookies unchanged.
    pub fn is_usable(&self) -> bool {
        is_cookie_value(&self.token) && is_cookie_value(&self.token_id)
    }
}

/// Non-empty and made only of RFC 6265 `cookie-octet`s (no whitespace,
/// quotes, commas, semicolons or backslashes).
fn is_cookie_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

// Keep session values out of logs and panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &redact(&self.token))
            .field("token_id", &redact(&self.token_id))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

/// Location of the credentials file plus the ordered list of places that
/// `load` and `delete` look in.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    search_path: Vec<PathBuf>,
}

impl CredentialStore {
    /// Build a store rooted at `config_home`, falling back to the
    /// `system_dirs` (in order) when reading.
    pub fn new(config_home: impl AsRef<Path>, system_dirs: &[PathBuf]) -> Self {
        let path = credentials_path(config_home.as_ref());
        let mut search_path = vec![path.clone()];
        search_path.extend(system_dirs.iter().map(|dir| credentials_path(dir)));
        Self { path, search_path }
    }

    /// Store backed by exactly one file, with no fallback locations.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            search_path: vec![path.clone()],
            path,
        }
    }

    /// Store at the platform configuration directory (`$XDG_CONFIG_HOME`
    /// on Linux), searching `$XDG_CONFIG_DIRS` afterwards.
    pub fn from_env() -> Result<Self> {
        let config_home = dirs::config_dir().ok_or(Error::NoConfigDir)?;
        Ok(Self::new(config_home, &system_config_dirs()))
    }

    /// Path that `save` writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Serialize `credentials` and write them with owner-only permissions,
    /// replacing whatever was there before.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let contents =
            serde_json::to_vec(credentials).map_err(|e| Error::io(&self.path, e.into()))?;
        write_private(&self.path, &contents).map_err(|e| Error::io(&self.path, e))?;

        log::debug!("wrote credentials to {}", self.path.display());
        Ok(())
    }

    /// Read the first credentials file found on the search path.
    pub fn load(&self) -> Result<Credentials> {
        let path = self.locate()?;
        let contents = fs::read(path).map_err(|e| Error::io(path, e))?;
        let credentials = serde_json::from_slice(&contents).map_err(|source| {
            Error::CorruptCredentials {
                path: path.to_path_buf(),
                source,
            }
        })?;

        log::debug!("loaded credentials from {}", path.display());
        Ok(credentials)
    }

    /// Remove the first credentials file found on the search path and
    /// return where it was.
    pub fn delete(&self) -> Result<PathBuf> {
        let path = self.locate()?;
        match fs::remove_file(path) {
            Ok(()) => {
                log::debug!("removed credentials file {}", path.display());
                Ok(path.to_path_buf())
            }
            // Lost a race with another remover.
            Err(e) if e.kind() == IoErrorKind::NotFound => Err(self.not_found()),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn locate(&self) -> Result<&Path> {
        self.search_path
            .iter()
            .find(|candidate| candidate.is_file())
            .map(PathBuf::as_path)
            .ok_or_else(|| self.not_found())
    }

    fn not_found(&self) -> Error {
        Error::CredentialsNotFound {
            searched: self.search_path.clone(),
        }
    }
}

fn credentials_path(root: &Path) -> PathBuf {
    root.join(APP_DIR).join(CREDENTIALS_FILE)
}

fn system_config_dirs() -> Vec<PathBuf> {
    match std::env::var_os("XDG_CONFIG_DIRS") {
        Some(value) if !value.is_empty() => std::env::split_paths(&value)
            .filter(|p| p.is_absolute())
            .collect(),
        _ if cfg!(all(unix, not(target_os = "macos"))) => vec![PathBuf::from("/etc/xdg")],
        _ => Vec::new(),
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies to newly created files.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)
}
