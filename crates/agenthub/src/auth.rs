use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[cfg(test)]
use mockall::automock;

use crate::errors::{ChatError, ChatResult};

/// Key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Persistent home for the bearer token.
#[cfg_attr(test, automock)]
pub trait TokenStore: Send + Sync {
    fn load(&self) -> ChatResult<Option<String>>;
    fn save(&self, token: &str) -> ChatResult<()>;
    fn remove(&self) -> ChatResult<()>;
}

/// Stores the token as `{"token": "..."}` inside a small JSON file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/agenthub/credentials.json`
    pub fn default_path() -> ChatResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChatError::Storage("could not determine config directory".into()))?;
        Ok(config_dir.join("agenthub").join("credentials.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> ChatResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| ChatError::Storage(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> ChatResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage_error(parent, e))?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents).map_err(|e| storage_error(&self.path, e))
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> ChatError {
    ChatError::Storage(format!("{}: {}", path.display(), err))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ChatResult<Option<String>> {
        Ok(self
            .read_entries()?
            .remove(TOKEN_KEY)
            .filter(|token| !token.is_empty()))
    }

    fn save(&self, token: &str) -> ChatResult<()> {
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self) -> ChatResult<()> {
        // A corrupt file holds no usable token; it is dropped entirely.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.remove(TOKEN_KEY);
        if entries.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(storage_error(&self.path, e)),
            }
        } else {
            self.write_entries(&entries)
        }
    }
}

/// Bearer credential shared by every client built from it.
///
/// Cloning is cheap and clones observe each other's `set`/`invalidate`.
#[derive(Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<String>>>,
    store: Option<Arc<dyn TokenStore>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("authenticated", &self.is_authenticated())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl Credentials {
    /// In-memory credentials that are never persisted.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token<S: Into<String>>(token: S) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
            store: None,
        }
    }

    /// Credentials backed by `store`, seeded with whatever token it holds.
    pub fn load(store: Arc<dyn TokenStore>) -> ChatResult<Self> {
        let token = store.load()?;
        Ok(Self {
            token: Arc::new(RwLock::new(token)),
            store: Some(store),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Token for a protected request.
    pub fn require(&self) -> ChatResult<String> {
        self.token().ok_or(ChatError::NotAuthenticated)
    }

    pub fn set<S: Into<String>>(&self, token: S) -> ChatResult<()> {
        let token = token.into();
        if let Some(store) = &self.store {
            store.save(&token)?;
        }
        self.replace(Some(token));
        Ok(())
    }

    /// Forgets the token in memory and in the backing store.
    pub fn invalidate(&self) -> ChatResult<()> {
        self.replace(None);
        match &self.store {
            Some(store) => store.remove(),
            None => Ok(()),
        }
    }

    /// Re-reads the token from the backing store, picking up logins made by
    /// another process. Returns whether a token is now present.
    pub fn refresh(&self) -> ChatResult<bool> {
        if let Some(store) = &self.store {
            let token = store.load()?;
            self.replace(token);
        }
        Ok(self.is_authenticated())
    }

    fn replace(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}
