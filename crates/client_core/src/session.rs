//! Credential lifecycle and the session guard that gates every contract call.

use std::{
    fmt,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::error::ClientError;

/// Opaque bearer token issued by the authentication service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Persistence seam behind the process-wide credential.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>>;
    fn save(&self, credential: &Credential) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("credential slot poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("credential slot poisoned"))?;
        *slot = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("credential slot poisoned"))?;
        *slot = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
}

/// Keeps the credential in a small JSON file between runs.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(error).with_context(|| {
                    format!("failed to read session file '{}'", self.path.display())
                })
            }
        };
        let mut stored: StoredSession = serde_json::from_str(&raw).with_context(|| {
            format!("session file '{}' is not valid JSON", self.path.display())
        })?;
        if stored.access_token.trim().is_empty() {
            return Ok(None);
        }
        let credential = Credential::new(stored.access_token.clone());
        stored.access_token.zeroize();
        Ok(Some(credential))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create session directory '{}'", parent.display())
            })?;
        }
        let mut raw = serde_json::to_string(&StoredSession {
            access_token: credential.expose().to_string(),
        })?;
        let written = write_private(&self.path, raw.as_bytes())
            .with_context(|| format!("failed to write session file '{}'", self.path.display()));
        raw.zeroize();
        written
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error).with_context(|| {
                format!("failed to remove session file '{}'", self.path.display())
            }),
        }
    }
}

/// Writes the file readable by the owner only.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::File::create(path)?.write_all(contents)
}

/// Owns the process-wide credential. Writes happen only on login, logout and
/// server rejection; every gated request passes through [`SessionGuard::send`].
pub struct SessionGuard {
    store: Arc<dyn CredentialStore>,
    current: RwLock<Option<Credential>>,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn CredentialStore>) -> Result<Self> {
        let current = store.load()?;
        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryCredentialStore::default()),
            current: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Option<Credential> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub async fn set(&self, credential: Credential) -> Result<()> {
        self.store.save(&credential)?;
        *self.current.write().await = Some(credential);
        Ok(())
    }

    /// Clearing always succeeds in memory; a persistence failure is logged.
    pub async fn clear(&self) {
        self.current.write().await.take();
        if let Err(error) = self.store.clear() {
            warn!(%error, "session: failed to clear persisted credential");
        }
    }

    /// Attaches the bearer credential, or fails without touching the network.
    pub async fn with_credential(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<RequestBuilder, ClientError> {
        let guard = self.current.read().await;
        let credential = guard.as_ref().ok_or(ClientError::Unauthenticated)?;
        Ok(request.bearer_auth(credential.expose()))
    }

    /// 401 and 403 clear the credential and surface `SessionExpired`; every
    /// other status passes through unchanged.
    pub async fn handle_status(
        &self,
        status: StatusCode,
    ) -> std::result::Result<StatusCode, ClientError> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), "session: credential rejected by server");
            self.clear().await;
            return Err(ClientError::SessionExpired {
                status: status.as_u16(),
            });
        }
        Ok(status)
    }

    pub async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, ClientError> {
        let request = self.with_credential(request).await?;
        let response = request.send().await?;
        let status = self.handle_status(response.status()).await?;
        debug!(status = status.as_u16(), "session: gated call resolved");
        Ok(response)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
