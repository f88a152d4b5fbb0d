//! Durable user preferences: the favorite book ids and the display-mode flag.
//!
//! State lives behind one mutex and is written through to a small JSON
//! document after every change, so a write is on disk when the call returns.
//! Storage failures are logged and never surfaced; reads of unset keys fall
//! back to the defaults (no favorites, show all books).

use std::{
    collections::HashSet,
    fs::File,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// On-disk layout. Field names are the persisted key names.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Preferences {
    #[serde(default)]
    favorite_ids: HashSet<String>,
    #[serde(default)]
    should_display_favorites: bool,
}

#[derive(Debug)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    state: Mutex<Preferences>,
}

impl PreferenceStore {
    /// A store that keeps preferences for the life of the process only.
    pub fn in_memory() -> Self {
        PreferenceStore {
            path: None,
            state: Mutex::new(Preferences::default()),
        }
    }

    /// Open the store persisted at `path`, creating it on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load(&path);
        tracing::debug!(
            path = %path.display(),
            favorites = state.favorite_ids.len(),
            display_favorites = state.should_display_favorites,
            "opened preference store"
        );
        PreferenceStore {
            path: Some(path),
            state: Mutex::new(state),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.lock().favorite_ids.contains(id)
    }

    /// Add or remove `id`. Repeating the same call leaves the state unchanged.
    pub fn set_favorite(&self, id: &str, favorite: bool) {
        let mut state = self.lock();
        let changed = if favorite {
            state.favorite_ids.insert(id.to_string())
        } else {
            state.favorite_ids.remove(id)
        };
        if changed {
            tracing::debug!(%id, favorite, "favorite updated");
            self.persist(&state);
        }
    }

    /// Flip the favorite status of `id` and return the new status.
    pub fn toggle_favorite(&self, id: &str) -> bool {
        let mut state = self.lock();
        let favorite = if state.favorite_ids.remove(id) {
            false
        } else {
            state.favorite_ids.insert(id.to_string());
            true
        };
        tracing::debug!(%id, favorite, "favorite toggled");
        self.persist(&state);
        favorite
    }

    pub fn favorite_ids(&self) -> HashSet<String> {
        self.lock().favorite_ids.clone()
    }

    pub fn display_favorites_only(&self) -> bool {
        self.lock().should_display_favorites
    }

    pub fn set_display_favorites_only(&self, value: bool) {
        let mut state = self.lock();
        if state.should_display_favorites != value {
            state.should_display_favorites = value;
            self.persist(&state);
        }
    }

    /// Flip the display-mode flag and return the new value.
    pub fn toggle_display_favorites_only(&self) -> bool {
        let mut state = self.lock();
        state.should_display_favorites = !state.should_display_favorites;
        self.persist(&state);
        state.should_display_favorites
    }

    fn lock(&self) -> MutexGuard<'_, Preferences> {
        // Preferences stay consistent even if a holder panicked mid-call.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &Preferences) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_atomically(path, state) {
            tracing::warn!(
                error = %format!("{:#}", e),
                path = %path.display(),
                "failed to persist preferences"
            );
        }
    }
}

fn load(path: &Path) -> Preferences {
    match std::fs::read_to_string(path) {
        Ok(body) => serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "unreadable preferences, using defaults"
            );
            Preferences::default()
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Preferences::default(),
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "failed to read preferences, using defaults"
            );
            Preferences::default()
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Write `state` next to `path`, flush it to disk, then rename it into place
/// so readers only ever see a complete document.
fn write_atomically(path: &Path, state: &Preferences) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let body = serde_json::to_vec_pretty(state)?;
    let tmp = temp_path(path);
    let mut file =
        File::create(&tmp).with_context(|| format!("Failed to create {}", tmp.display()))?;
    file.write_all(&body)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync {}", tmp.display()))?;
    drop(file);
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
