//! User list persistence across two namespaces: a synced copy shared
//! between devices and a local backup. Reads prefer the synced copy when it
//! holds any users; writes go to both. A namespace whose contents cannot be
//! read is never written over.

use crate::errors::AppError;
use crate::migrate::{Envelope, normalize};
use crate::models::UserRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

#[async_trait]
pub trait Namespace: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when nothing has been stored yet.
    async fn read(&self) -> Result<Option<Value>, AppError>;

    /// Replaces the whole stored document.
    async fn write(&self, value: &Value) -> Result<(), AppError>;
}

pub struct JsonFileNamespace {
    name: String,
    path: PathBuf,
}

impl JsonFileNamespace {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl Namespace for JsonFileNamespace {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<Option<Value>, AppError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, value: &Value) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let payload = serde_json::to_vec_pretty(value)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

pub struct MemoryNamespace {
    name: String,
    value: StdMutex<Option<Value>>,
}

impl MemoryNamespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: StdMutex::new(None),
        }
    }

    pub fn with_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: StdMutex::new(Some(value)),
        }
    }

    pub fn snapshot(&self) -> Option<Value> {
        self.value.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Namespace for MemoryNamespace {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<Option<Value>, AppError> {
        Ok(self.snapshot())
    }

    async fn write(&self, value: &Value) -> Result<(), AppError> {
        let mut slot = self.value.lock().map_err(AppError::internal)?;
        *slot = Some(value.clone());
        Ok(())
    }
}

/// What one namespace turned out to hold.
enum Stored {
    Empty,
    Unreadable,
    Users { users: Vec<UserRecord>, migrated: bool },
}

pub struct UserStore {
    synced: Box<dyn Namespace>,
    local: Box<dyn Namespace>,
    gate: Mutex<()>,
}

impl UserStore {
    pub fn new(synced: Box<dyn Namespace>, local: Box<dyn Namespace>) -> Self {
        Self {
            synced,
            local,
            gate: Mutex::new(()),
        }
    }

    /// Waits for exclusive access. Everything loaded and saved through one
    /// session is isolated from other sessions.
    pub async fn session(&self) -> StoreSession<'_> {
        StoreSession {
            store: self,
            skip_synced: AtomicBool::new(false),
            _guard: self.gate.lock().await,
        }
    }

    async fn read_users(&self, namespace: &dyn Namespace) -> Stored {
        let raw = match namespace.read().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Stored::Empty,
            Err(err) => {
                error!(namespace = namespace.name(), "failed to read users: {}", err.message);
                return Stored::Unreadable;
            }
        };
        match normalize(raw) {
            Some(normalized) if normalized.users.is_empty() => Stored::Empty,
            Some(normalized) => Stored::Users {
                users: normalized.users,
                migrated: normalized.migrated,
            },
            None => {
                error!(namespace = namespace.name(), "stored users are not a user list");
                Stored::Unreadable
            }
        }
    }

    async fn write_users(&self, users: &[UserRecord], skip_synced: bool) -> Result<(), AppError> {
        let value = serde_json::to_value(Envelope::current(users))?;
        let synced = if skip_synced {
            warn!(namespace = self.synced.name(), "leaving unreadable namespace untouched");
            Ok(())
        } else {
            self.synced.write(&value).await
        };
        let local = self.local.write(&value).await;
        for (namespace, result) in [(&self.synced, &synced), (&self.local, &local)] {
            if let Err(err) = result {
                error!(namespace = namespace.name(), "failed to write users: {}", err.message);
            }
        }
        synced.and(local)
    }
}

pub struct StoreSession<'a> {
    store: &'a UserStore,
    /// Set by `load` when the synced copy could not be read but the local
    /// one could; saves then leave the synced copy as it is.
    skip_synced: AtomicBool,
    _guard: MutexGuard<'a, ()>,
}

impl StoreSession<'_> {
    /// Reads the synced copy if it has users, else the local one. A legacy
    /// shape is upgraded and written back before it is returned.
    ///
    /// Fails when no namespace has users and at least one could not be
    /// read, so a caller never saves an empty list over data it could not
    /// parse.
    pub async fn load(&self) -> Result<Vec<UserRecord>, AppError> {
        let synced = self.store.read_users(self.store.synced.as_ref()).await;
        let synced_unreadable = matches!(synced, Stored::Unreadable);
        let (users, migrated) = match synced {
            Stored::Users { users, migrated } => (users, migrated),
            Stored::Empty | Stored::Unreadable => {
                match self.store.read_users(self.store.local.as_ref()).await {
                    Stored::Users { users, migrated } => (users, migrated),
                    Stored::Empty if !synced_unreadable => return Ok(Vec::new()),
                    Stored::Empty | Stored::Unreadable => {
                        return Err(AppError::unavailable(
                            "stored users could not be read; refusing to replace them",
                        ));
                    }
                }
            }
        };
        self.skip_synced.store(synced_unreadable, Ordering::SeqCst);
        if migrated {
            info!(count = users.len(), "upgraded stored user list");
            self.save(&users).await?;
        }
        Ok(users)
    }

    pub async fn save(&self, users: &[UserRecord]) -> Result<(), AppError> {
        let skip_synced = self.skip_synced.load(Ordering::SeqCst);
        self.store.write_users(users, skip_synced).await
    }
}
