#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Favorite restaurant storage.
//!
//! Favorites are a set of establishment identifiers. Callers depend on the
//! [`FavoritesStore`] trait and pick an implementation at startup:
//! [`JsonFileFavorites`] persists across runs, [`InMemoryFavorites`] is for
//! tests and ephemeral sessions.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

/// Errors from favorites storage.
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON array of strings.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The blocking file task panicked or was cancelled.
    #[error("Favorites file task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A set of favorite establishment identifiers.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Returns every favorite identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError`] if the backing storage cannot be read.
    async fn get(&self) -> Result<BTreeSet<String>, FavoritesError>;

    /// Adds `id` if absent, removes it if present. Returns whether `id` is a
    /// favorite afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError`] if the backing storage cannot be read or
    /// written.
    async fn toggle(&self, id: &str) -> Result<bool, FavoritesError>;

    /// Returns `true` if `id` is a favorite.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError`] if the backing storage cannot be read.
    async fn contains(&self, id: &str) -> Result<bool, FavoritesError> {
        Ok(self.get().await?.contains(id))
    }
}

/// Flips membership of `id` in `ids`, returning the new membership.
fn toggle_in(ids: &mut BTreeSet<String>, id: &str) -> bool {
    if ids.remove(id) {
        false
    } else {
        ids.insert(id.to_string());
        true
    }
}

/// Favorites held in memory only.
#[derive(Debug, Default)]
pub struct InMemoryFavorites {
    ids: RwLock<BTreeSet<String>>,
}

impl InMemoryFavorites {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `ids`.
    #[must_use]
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: RwLock::new(ids.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl FavoritesStore for InMemoryFavorites {
    async fn get(&self) -> Result<BTreeSet<String>, FavoritesError> {
        Ok(self.ids.read().await.clone())
    }

    async fn toggle(&self, id: &str) -> Result<bool, FavoritesError> {
        Ok(toggle_in(&mut *self.ids.write().await, id))
    }

    async fn contains(&self, id: &str) -> Result<bool, FavoritesError> {
        Ok(self.ids.read().await.contains(id))
    }
}

/// Favorites persisted as a JSON array in a file.
///
/// A missing file reads as an empty set. File access runs on tokio's
/// blocking pool, and every access goes through one lock so concurrent
/// toggles from the same process never lose an update.
#[derive(Debug)]
pub struct JsonFileFavorites {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileFavorites {
    /// Creates a store backed by `path`. The file is not touched until the
    /// first read or toggle.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<BTreeSet<String>, FavoritesError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_ids(&path)).await?
    }

    async fn write(&self, ids: BTreeSet<String>) -> Result<(), FavoritesError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_ids(&path, &ids)).await?
    }
}

fn read_ids(path: &Path) -> Result<BTreeSet<String>, FavoritesError> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(BTreeSet::new()),
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeSet::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_ids(path: &Path, ids: &BTreeSet<String>) -> Result<(), FavoritesError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(ids)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[async_trait]
impl FavoritesStore for JsonFileFavorites {
    async fn get(&self) -> Result<BTreeSet<String>, FavoritesError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn toggle(&self, id: &str) -> Result<bool, FavoritesError> {
        let _guard = self.lock.lock().await;
        let mut ids = self.read().await?;
        let is_favorite = toggle_in(&mut ids, id);
        self.write(ids).await?;
        log::debug!(
            "Favorite {id} {} ({})",
            if is_favorite { "added" } else { "removed" },
            self.path.display()
        );
        Ok(is_favorite)
    }
}
