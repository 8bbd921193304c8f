use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};

use crate::config;

fn secure_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?
            .write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }

    Ok(())
}

/// The persisted token: a single file holding the raw value.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn default_location() -> Result<Self> {
        Ok(Self::at(config::root_path()?.join("session")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let token = std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        let token = token.trim().to_string();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    pub fn save(&self, token: &str) -> Result<()> {
        secure_write(&self.path, token)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// The process-wide authentication state.
///
/// Initialised from the store, mutated only through `sign_in`/`sign_out`, and
/// observed through `subscribe`. The app rebuilds its task client from that
/// receiver. Every change also bumps the epoch, which tags in-flight results
/// so ones from an earlier session can be dropped.
#[derive(Debug)]
pub struct Session {
    store: SessionStore,
    token: watch::Sender<Option<String>>,
    epoch: u64,
}

impl Session {
    pub fn restore(store: SessionStore) -> Result<Self> {
        let token = store.load()?;
        let (tx, _) = watch::channel(token);
        Ok(Self {
            store,
            token: tx,
            epoch: 0,
        })
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Receives every token change made through `sign_in`/`sign_out`.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }

    pub fn sign_in(&mut self, token: String) -> Result<()> {
        self.store.save(&token)?;
        self.token.send_replace(Some(token));
        self.epoch += 1;
        tracing::info!("Signed in, session saved to {}", self.store.path().display());
        Ok(())
    }

    /// Purely local: the server is not told.
    pub fn sign_out(&mut self) -> Result<()> {
        self.token.send_replace(None);
        self.epoch += 1;
        tracing::info!("Session cleared");
        self.store.clear()
    }
}
