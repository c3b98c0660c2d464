//! Credential storage
//!
//! The session client reads and writes tokens through the [`SessionStore`]
//! trait rather than ambient global state, so tests inject
//! [`MemoryStore`] and real deployments use [`FileStore`]. Values are
//! plain strings keyed by the fixed names in [`crate::constants`].
//!
//! [`FileStore`] writes use atomic temp-file + rename to prevent
//! corruption on crash, and the file is chmod 0600 since it holds tokens.
//! A tokio Mutex serializes concurrent writes from request-time refresh
//! and explicit login/logout.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::error::{Error, Result};

/// The stored access/refresh credential pair.
///
/// Created on successful login or registration, replaced wholesale on
/// successful refresh, deleted on logout or irrecoverable refresh failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access: String,
    pub refresh: String,
}

/// Durable key/value storage for session credentials.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn SessionStore>`). Readers always observe the latest stored
/// value; implementations must not hand out stale cached copies.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get<'a>(&'a self, key: &'a str) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Remove the value stored under `key`, if any.
    fn remove<'a>(&'a self, key: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Remove everything. The session becomes Anonymous.
    fn clear<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Read the full credential pair; `None` unless both tokens are present.
pub async fn read_credentials(store: &dyn SessionStore) -> Option<CredentialPair> {
    let access = store.get(ACCESS_TOKEN_KEY).await?;
    let refresh = store.get(REFRESH_TOKEN_KEY).await?;
    Some(CredentialPair { access, refresh })
}

/// Store both tokens of a credential pair.
pub async fn write_credentials(store: &dyn SessionStore, pair: &CredentialPair) -> Result<()> {
    store.set(ACCESS_TOKEN_KEY, &pair.access).await?;
    store.set(REFRESH_TOKEN_KEY, &pair.refresh).await?;
    Ok(())
}

/// In-memory store for tests and short-lived tooling.
#[derive(Default)]
pub struct MemoryStore {
    state: std::sync::Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let value = self.state.lock().expect("store lock poisoned").get(key).cloned();
        Box::pin(async move { value })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        self.state
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Box::pin(async { Ok(()) })
    }

    fn remove<'a>(&'a self, key: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        self.state.lock().expect("store lock poisoned").remove(key);
        Box::pin(async { Ok(()) })
    }

    fn clear<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        self.state.lock().expect("store lock poisoned").clear();
        Box::pin(async { Ok(()) })
    }
}

/// File-backed store: a JSON object of string keys to string values.
///
/// Every mutation persists to disk before returning, so a process restart
/// resumes the same session.
pub struct FileStore {
    path: PathBuf,
    state: tokio::sync::Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Load the store from the given file path.
    ///
    /// If the file doesn't exist, creates it as `{}` (Anonymous session).
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Storage(format!("reading session file: {e}")))?;
            let values: HashMap<String, String> = serde_json::from_str(&contents)
                .map_err(|e| Error::Storage(format!("parsing session file: {e}")))?;
            info!(path = %path.display(), keys = values.len(), "loaded session store");
            values
        } else {
            info!(path = %path.display(), "session file not found, starting anonymous");
            let values = HashMap::new();
            write_atomic(&path, &values).await?;
            values
        };

        Ok(Self {
            path,
            state: tokio::sync::Mutex::new(state),
        })
    }
}

impl SessionStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move { self.state.lock().await.get(key).cloned() })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.insert(key.to_string(), value.to_string());
            write_atomic(&self.path, &state).await
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if state.remove(key).is_some() {
                write_atomic(&self.path, &state).await?;
            }
            Ok(())
        })
    }

    fn clear<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.clear();
            write_atomic(&self.path, &state).await
        })
    }
}

/// Write the session map to a file atomically (temp file + rename).
///
/// Sets file permissions to 0600 (owner read/write only) since the file
/// contains tokens.
async fn write_atomic(path: &Path, data: &HashMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::Storage(format!("serializing session: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Storage("session path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".session.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Storage(format!("writing temp session file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Storage(format!("setting session file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Storage(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session");
    Ok(())
}
