//! Persisted project store
//!
//! One document plus its lifecycle. The store never touches a backend on
//! its own; the manager passes the backend into `load`/`sync`/`clear`.

use anyhow::{Result, bail};
use tracing::{debug, info};

use super::document::ProjectState;
use crate::constants::storage::NAMESPACE;
use crate::settings::PreviewSettings;
use crate::storage::StructuredStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Uninitialized,
    Loading,
    Ready,
    /// Terminal
    Disposed,
}

#[derive(Debug)]
pub struct ProjectStore {
    key: String,
    state: ProjectState,
    initial: Option<ProjectState>,
    defaults: PreviewSettings,
    status: StoreStatus,
}

/// Namespaced store key for `id`, generating one when absent
pub fn resolve_key(id: Option<&str>) -> String {
    let id = match id {
        Some(id) => id.to_string(),
        None => uuid::Uuid::new_v4().to_string(),
    };

    if id.starts_with(NAMESPACE) {
        id
    } else {
        format!("{}{}", NAMESPACE, id)
    }
}

impl ProjectStore {
    /// Unloaded store; `initial` seeds the state when the backend has nothing.
    /// `defaults` fill fresh documents and settings keys a stored one lacks.
    pub fn new(key: impl Into<String>, initial: Option<ProjectState>, defaults: PreviewSettings) -> Self {
        let key = key.into();
        Self {
            state: ProjectState::with_settings(key.clone(), defaults.clone()),
            key,
            initial,
            defaults,
            status: StoreStatus::Uninitialized,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tab_id(&self) -> &str {
        &self.state.tab.id
    }

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    pub fn status(&self) -> StoreStatus {
        self.status
    }

    /// Backend value if present, else the seed, else a fresh document
    pub async fn load(&mut self, backend: &impl StructuredStore) -> Result<()> {
        if self.status != StoreStatus::Uninitialized {
            bail!("Project store {} already loaded ({:?})", self.key, self.status);
        }
        self.status = StoreStatus::Loading;

        let stored = match backend.get(&self.key).await? {
            Some(raw) => Some(ProjectState::from_json(&raw, &self.defaults)?),
            None => None,
        };

        let source = if stored.is_some() { "backend" } else if self.initial.is_some() { "seed" } else { "fresh" };
        if let Some(state) = stored.or_else(|| self.initial.take()) {
            self.state = state;
        }
        self.initial = None;

        if self.state.tab.id.is_empty() {
            self.state.tab.id = self.key.clone();
        }

        self.status = StoreStatus::Ready;
        debug!(key = %self.key, source, "Loaded project store");
        Ok(())
    }

    /// Apply `mutate` as one change
    pub fn patch(&mut self, mutate: impl FnOnce(&mut ProjectState)) -> Result<()> {
        self.ensure_ready("patch")?;
        mutate(&mut self.state);
        Ok(())
    }

    /// Write the current state to the backend
    pub async fn sync(&self, backend: &impl StructuredStore) -> Result<()> {
        self.ensure_ready("sync")?;
        backend.set(&self.key, self.state.to_json()?).await?;
        debug!(key = %self.key, "Synced project store");
        Ok(())
    }

    /// Remove the persisted document
    pub async fn clear(&self, backend: &impl StructuredStore) -> Result<()> {
        self.ensure_ready("clear")?;
        backend.delete(&self.key).await?;
        info!(key = %self.key, "Cleared project store");
        Ok(())
    }

    pub fn dispose(&mut self) {
        self.status = StoreStatus::Disposed;
    }

    fn ensure_ready(&self, operation: &str) -> Result<()> {
        if self.status != StoreStatus::Ready {
            bail!("Cannot {} project store {} while {:?}", operation, self.key, self.status);
        }
        Ok(())
    }
}
