//! Project collection manager
//!
//! Single source of truth for open projects (tabs). Owns the ordered list
//! of stores and the two debouncers that defer persistence:
//! - per-project sync: every patch restarts that project's window
//! - tab order: positions are written back as `tab.order` after reordering
//!
//! Debounced work runs from `tick()` (deadline passed) or `flush()` (now).

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::document::{ImportedDocument, ProjectState};
use super::migrate::migrate;
use super::store::{ProjectStore, resolve_key};
use crate::config::AppConfig;
use crate::constants::document::CURRENT_VERSION;
use crate::constants::messages;
use crate::debounce::{Clock, Debouncer, SystemClock};
use crate::dialog::FilePicker;
use crate::notify::{AlertLevel, LogNotifier, Notifier};
use crate::settings::PreviewSettings;
use crate::storage::{KeyValueStore, StructuredStore, pages_from_database, pages_from_key_value};

pub struct ProjectManager<K, S> {
    key_value: K,
    database: S,
    projects: Vec<ProjectStore>,
    current_tab: Option<String>,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    privileged: bool,
    max_projects: usize,
    max_templates: usize,
    /// Settings for new documents, built from the configured preferences
    settings_defaults: PreviewSettings,
    syncs: Debouncer<String>,
    tab_order: Debouncer<()>,
}

impl<K: KeyValueStore, S: StructuredStore> ProjectManager<K, S> {
    pub fn new(key_value: K, database: S, config: &AppConfig) -> Self {
        Self {
            key_value,
            database,
            projects: Vec::new(),
            current_tab: None,
            notifier: Box::new(LogNotifier),
            clock: Box::new(SystemClock),
            privileged: config.privileged,
            max_projects: config.max_projects,
            max_templates: config.max_templates,
            settings_defaults: PreviewSettings::with_preferences(&config.preferences),
            syncs: Debouncer::new(config.project_sync_window()),
            tab_order: Debouncer::new(config.tab_order_sync_window()),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn projects(&self) -> &[ProjectStore] {
        &self.projects
    }

    pub fn key_value(&self) -> &K {
        &self.key_value
    }

    pub fn database(&self) -> &S {
        &self.database
    }

    pub fn current_tab(&self) -> Option<&str> {
        self.current_tab.as_deref()
    }

    pub fn current_project(&self) -> Option<&ProjectStore> {
        self.find_project_by_tab_id(self.current_tab.as_deref()?)
    }

    pub fn find_project_by_tab_id(&self, tab_id: &str) -> Option<&ProjectStore> {
        self.projects.iter().find(|project| project.tab_id() == tab_id)
    }

    pub fn position(&self, tab_id: &str) -> Option<usize> {
        self.projects.iter().position(|project| project.tab_id() == tab_id)
    }

    pub fn set_tab_from_project(&mut self, tab_id: &str) -> Result<()> {
        if self.find_project_by_tab_id(tab_id).is_none() {
            bail!("No project with tab id {}", tab_id);
        }
        self.current_tab = Some(tab_id.to_string());
        Ok(())
    }

    pub fn can_add_new_project(&self) -> bool {
        self.privileged || self.projects.len() < self.max_projects
    }

    pub fn can_add_new_template(&self, template_count: usize) -> bool {
        self.privileged || template_count < self.max_templates
    }

    /// Whether a sync is scheduled for the project
    pub fn sync_pending(&self, tab_id: &str) -> bool {
        self.find_project_by_tab_id(tab_id)
            .is_some_and(|project| self.syncs.is_pending(&project.key().to_string()))
    }

    pub fn settings_defaults(&self) -> &PreviewSettings {
        &self.settings_defaults
    }

    pub fn tab_order_pending(&self) -> bool {
        !self.tab_order.is_empty()
    }

    /// Build and load a store for `id` (generated when absent)
    pub async fn make_project_store(&self, id: Option<&str>, initial: Option<ProjectState>) -> Result<ProjectStore> {
        let key = resolve_key(id);
        let mut store = ProjectStore::new(key, initial, self.settings_defaults.clone());
        store.load(&self.database).await?;
        Ok(store)
    }

    /// Append a new project and make it the active tab
    pub async fn add_new_project(&mut self, id: Option<&str>) -> Result<String> {
        let store = self.make_project_store(id, None).await?;
        if self.projects.iter().any(|project| project.key() == store.key()) {
            bail!("Project {} is already open", store.key());
        }

        let tab_id = store.tab_id().to_string();
        info!(key = %store.key(), count = self.projects.len() + 1, "Added project");
        self.projects.push(store);
        self.current_tab = Some(tab_id.clone());
        Ok(tab_id)
    }

    /// `add_new_project` behind the capacity ceiling
    pub async fn try_add_new_project(&mut self, id: Option<&str>) -> Result<Option<String>> {
        if !self.can_add_new_project() {
            self.notifier.alert(AlertLevel::Danger, messages::PROJECT_LIMIT_REACHED);
            warn!(count = self.projects.len(), max = self.max_projects, "Project limit reached");
            return Ok(None);
        }
        self.add_new_project(id).await.map(Some)
    }

    /// Patch a project and schedule its debounced sync
    pub fn patch_project(&mut self, tab_id: &str, mutate: impl FnOnce(&mut ProjectState)) -> Result<()> {
        let now = self.clock.now();
        let project = self
            .projects
            .iter_mut()
            .find(|project| project.tab_id() == tab_id)
            .with_context(|| format!("No project with tab id {}", tab_id))?;

        project.patch(mutate)?;
        self.syncs.schedule(project.key().to_string(), now);
        Ok(())
    }

    /// Copy page, settings and tab name from `data` in one patch, migrating
    /// documents from older releases on the way
    pub fn sync_project_state_with_data(&mut self, tab_id: &str, data: ImportedDocument) -> Result<()> {
        let ImportedDocument {
            tab,
            page,
            settings,
            version,
        } = data;

        self.patch_project(tab_id, |state| {
            if let Some(page) = page {
                state.page = page;
            }
            if let Some(settings) = settings {
                state.settings = settings;
            }
            if let Some(tab) = tab {
                state.tab.name = tab.name;
            }

            migrate(state, &version);
            state.version = Some(CURRENT_VERSION.to_string());
        })
    }

    /// Import the first picked JSON file as a new project.
    /// Missing required keys are reported but do not stop the import.
    pub async fn import_new_project(&mut self, picker: &impl FilePicker) -> Result<Option<String>> {
        let files = picker.pick_json().await?;
        let Some(path) = files.first() else {
            debug!("Import cancelled, no file selected");
            return Ok(None);
        };

        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read import file {:?}", path))?;
        let value: Value =
            serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON from {:?}", path))?;

        for key in ImportedDocument::missing_keys(&value) {
            self.notifier.alert(AlertLevel::Danger, &format!("{} [{}]", messages::IMPORT_MISSING_DATA, key));
            error!(key, path = %path.display(), "The configuration file is missing a data key");
        }

        let data = ImportedDocument::from_value(value, &self.settings_defaults)?;
        let tab_id = self.add_new_project(None).await?;
        self.sync_project_state_with_data(&tab_id, data)?;

        info!(path = %path.display(), tab = %tab_id, "Imported project");
        Ok(Some(tab_id))
    }

    pub async fn add_project_from_template(&mut self, template: &ImportedDocument) -> Result<String> {
        let data = template.clone();
        let tab_id = self.add_new_project(None).await?;
        self.sync_project_state_with_data(&tab_id, data)?;
        Ok(tab_id)
    }

    /// Copy of the project's current in-memory state as a new project
    pub async fn duplicate_project(&mut self, tab_id: &str) -> Result<String> {
        let state = self
            .find_project_by_tab_id(tab_id)
            .with_context(|| format!("No project with tab id {}", tab_id))?
            .state()
            .clone();

        let new_tab = self.add_new_project(None).await?;
        self.sync_project_state_with_data(&new_tab, ImportedDocument::from(state))?;
        info!(source = %tab_id, tab = %new_tab, "Duplicated project");
        Ok(new_tab)
    }

    /// Clear, dispose and remove the project at `index`. The collection is
    /// never left empty.
    pub async fn delete_project(&mut self, index: usize) -> Result<()> {
        let count = self.projects.len();
        let Some(project) = self.projects.get_mut(index) else {
            bail!("No project at index {} ({} open)", index, count);
        };

        project.clear(&self.database).await?;
        let key = project.key().to_string();
        if self.syncs.cancel(&key) {
            debug!(key = %key, "Cancelled pending sync for deleted project");
        }
        project.dispose();
        self.projects.remove(index);
        info!(key = %key, remaining = self.projects.len(), "Deleted project");

        self.activate_first_or_create().await
    }

    /// One-time startup load. Legacy key-value entries are moved into the
    /// structured store, then everything is loaded and ordered.
    pub async fn hydrate_from_storage(&mut self) -> Result<()> {
        if !self.projects.is_empty() {
            bail!("Projects already hydrated ({} open)", self.projects.len());
        }

        let mut stored: Vec<ProjectStore> = Vec::new();

        for (key, value) in pages_from_key_value(&self.key_value)? {
            let seed = ProjectState::from_value(value, &self.settings_defaults)
                .with_context(|| format!("Failed to parse legacy project {:?}", key))?;
            let store = self.make_project_store(Some(&key), Some(seed)).await?;
            store.sync(&self.database).await?;
            self.key_value.remove(&key)?;
            info!(key = %key, "Migrated project out of key-value storage");
            stored.push(store);
        }

        for (key, value) in pages_from_database(&self.database).await? {
            if stored.iter().any(|store| store.key() == key) {
                continue;
            }
            let seed = ProjectState::from_value(value, &self.settings_defaults)
                .with_context(|| format!("Failed to parse stored project {:?}", key))?;
            stored.push(self.make_project_store(Some(&key), Some(seed)).await?);
        }

        stored.sort_by_key(|store| store.state().tab.sort_key());
        self.projects = stored;
        info!(count = self.projects.len(), "Hydrated projects from storage");

        self.activate_first_or_create().await
    }

    async fn activate_first_or_create(&mut self) -> Result<()> {
        if self.projects.is_empty() {
            self.add_new_project(None).await?;
        } else {
            self.current_tab = Some(self.projects[0].tab_id().to_string());
        }
        Ok(())
    }

    /// Schedule writing current positions back as tab orders
    pub fn sync_tab_order(&mut self) {
        let now = self.clock.now();
        self.tab_order.schedule((), now);
    }

    /// Move a tab and schedule the order sync
    pub fn move_project(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.projects.len();
        if from >= len || to >= len {
            bail!("Cannot move project {} to {} ({} open)", from, to, len);
        }

        let project = self.projects.remove(from);
        self.projects.insert(to, project);
        self.sync_tab_order();
        Ok(())
    }

    fn apply_tab_order(&mut self) -> Result<()> {
        let tab_ids: Vec<String> = self.projects.iter().map(|project| project.tab_id().to_string()).collect();
        for (index, tab_id) in tab_ids.iter().enumerate() {
            let order = u32::try_from(index).context("Too many projects to order")?;
            self.patch_project(tab_id, |state| state.tab.order = Some(order))?;
        }
        debug!(count = tab_ids.len(), "Applied tab order");
        Ok(())
    }

    /// Pretty JSON of the full document, in the import format
    pub fn export_project(&self, tab_id: &str) -> Result<String> {
        self.find_project_by_tab_id(tab_id)
            .with_context(|| format!("No project with tab id {}", tab_id))?
            .state()
            .to_json_pretty()
    }

    /// Run debounced work whose deadline has passed; returns projects synced.
    /// Failed syncs are rescheduled and retried on a later tick.
    pub async fn tick(&mut self) -> Result<usize> {
        let now = self.clock.now();
        if !self.tab_order.take_due(now).is_empty() {
            self.apply_tab_order()?;
        }

        let due = self.syncs.take_due(now);
        let (synced, _failed) = self.sync_keys(due).await;
        Ok(synced)
    }

    /// Run all pending debounced work immediately. Errors when any project
    /// could not be written; those stay scheduled.
    pub async fn flush(&mut self) -> Result<usize> {
        if !self.tab_order.take_all().is_empty() {
            self.apply_tab_order()?;
        }

        let pending = self.syncs.take_all();
        let (synced, failed) = self.sync_keys(pending).await;
        if !failed.is_empty() {
            bail!("Failed to save {} project(s): {}", failed.len(), failed.join(", "));
        }
        Ok(synced)
    }

    /// Sync each key, rescheduling the ones that fail
    async fn sync_keys(&mut self, keys: Vec<String>) -> (usize, Vec<String>) {
        let mut synced = 0;
        let mut failed = Vec::new();
        for key in keys {
            let Some(project) = self.projects.iter().find(|project| project.key() == key) else {
                debug!(key = %key, "Skipping sync for closed project");
                continue;
            };

            match project.sync(&self.database).await {
                Ok(()) => synced += 1,
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to sync project");
                    failed.push(key);
                }
            }
        }

        let now = self.clock.now();
        for key in &failed {
            self.syncs.schedule(key.clone(), now);
        }
        (synced, failed)
    }
}
