//! Project document types
//!
//! `ProjectState` is what a store persists and what export writes.
//! `ImportedDocument` is the loose shape accepted from files, templates
//! and duplicated projects, where any top-level key may be absent.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::document::{CURRENT_VERSION, DEFAULT_ORIENTATION, DEFAULT_TAB_NAME, REQUIRED_KEYS};
use crate::settings::PreviewSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    /// Explicit tab position; absent until the first tab-order sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl Tab {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: DEFAULT_TAB_NAME.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            order: None,
        }
    }

    /// Hydration sort key: explicit order first, creation time otherwise
    pub fn sort_key(&self) -> i64 {
        self.order.map(i64::from).unwrap_or(self.created_at)
    }
}

/// One code editor on a page. Fields other than the history sets are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Editor {
    #[serde(default)]
    pub added: Vec<Value>,
    #[serde(default)]
    pub removed: Vec<Value>,
    #[serde(default)]
    pub focused: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Editor {
    pub fn clear_history(&mut self) {
        self.added.clear();
        self.removed.clear();
        self.focused.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub editors: Vec<Editor>,
    #[serde(default = "default_orientation")]
    pub orientation: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_orientation() -> String {
    DEFAULT_ORIENTATION.to_string()
}

impl Default for Page {
    fn default() -> Self {
        Self {
            editors: vec![Editor::default()],
            orientation: default_orientation(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    pub tab: Tab,
    #[serde(default)]
    pub page: Page,
    #[serde(default)]
    pub settings: PreviewSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ProjectState {
    /// Fresh document with stock settings
    #[cfg(test)]
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self::with_settings(id, PreviewSettings::default())
    }

    /// Fresh document for a new tab
    pub fn with_settings(id: impl Into<String>, settings: PreviewSettings) -> Self {
        Self {
            tab: Tab::new(id),
            page: Page::default(),
            settings,
            version: Some(CURRENT_VERSION.to_string()),
        }
    }

    /// Parse a stored document; settings keys it lacks come from `defaults`
    pub fn from_json(raw: &str, defaults: &PreviewSettings) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).context("Failed to parse project document")?;
        Self::from_value(value, defaults)
    }

    pub fn from_value(mut value: Value, defaults: &PreviewSettings) -> Result<Self> {
        if let Value::Object(object) = &mut value {
            let settings = match object.remove("settings") {
                Some(settings) => defaults.merged(&settings)?,
                None => defaults.clone(),
            };
            object.insert(
                "settings".to_string(),
                serde_json::to_value(settings).context("Failed to serialize project settings")?,
            );
        }
        serde_json::from_value(value).context("Failed to parse project document")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize project document")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize project document")
    }
}

/// Version marker of a source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentVersion {
    /// Written before documents carried a version
    Unversioned,
    Versioned(String),
}

impl DocumentVersion {
    pub fn is_unversioned(&self) -> bool {
        matches!(self, DocumentVersion::Unversioned)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDocument {
    pub tab: Option<Tab>,
    pub page: Option<Page>,
    pub settings: Option<PreviewSettings>,
    pub version: DocumentVersion,
}

impl ImportedDocument {
    /// A key that is present counts as present even when `null`.
    /// Partial `settings` are completed from `defaults`.
    pub fn from_value(value: Value, defaults: &PreviewSettings) -> Result<Self> {
        let Value::Object(mut object) = value else {
            bail!("Imported document must be a JSON object");
        };

        let version = match object.remove("version") {
            None => DocumentVersion::Unversioned,
            Some(Value::String(version)) => DocumentVersion::Versioned(version),
            Some(other) => DocumentVersion::Versioned(other.to_string()),
        };

        Ok(Self {
            tab: take_field(&mut object, "tab")?,
            page: take_field(&mut object, "page")?,
            settings: take_settings(&mut object, defaults)?,
            version,
        })
    }

    /// Required top-level keys absent from `value`
    pub fn missing_keys(value: &Value) -> Vec<&'static str> {
        REQUIRED_KEYS
            .into_iter()
            .filter(|key| value.get(key).is_none())
            .collect()
    }
}

impl From<ProjectState> for ImportedDocument {
    fn from(state: ProjectState) -> Self {
        Self {
            tab: Some(state.tab),
            page: Some(state.page),
            settings: Some(state.settings),
            version: state
                .version
                .map_or(DocumentVersion::Unversioned, DocumentVersion::Versioned),
        }
    }
}

fn take_settings(object: &mut Map<String, Value>, defaults: &PreviewSettings) -> Result<Option<PreviewSettings>> {
    match object.remove("settings") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => defaults
            .merged(&value)
            .map(Some)
            .context("Invalid [settings] in imported document"),
    }
}

fn take_field<T: serde::de::DeserializeOwned>(object: &mut Map<String, Value>, key: &str) -> Result<Option<T>> {
    match object.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .with_context(|| format!("Invalid [{}] in imported document", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn import(value: Value) -> Result<ImportedDocument> {
        ImportedDocument::from_value(value, &PreviewSettings::default())
    }

    #[test]
    fn test_new_state_is_versioned() {
        let state = ProjectState::new("pages/1");
        assert_eq!(state.tab.id, "pages/1");
        assert_eq!(state.tab.name, DEFAULT_TAB_NAME);
        assert_eq!(state.version.as_deref(), Some(CURRENT_VERSION));
        assert_eq!(state.page.orientation, "left");
        assert_eq!(state.page.editors.len(), 1);
    }

    #[test]
    fn test_sort_key_prefers_order() {
        let mut tab = Tab::new("pages/1");
        tab.created_at = 1_700_000_000_000;
        assert_eq!(tab.sort_key(), 1_700_000_000_000);
        tab.order = Some(3);
        assert_eq!(tab.sort_key(), 3);
    }

    #[test]
    fn test_editor_extra_fields_preserved() {
        let raw = json!({ "id": "e1", "language": "rust", "text": "fn main() {}" });
        let editor: Editor = serde_json::from_value(raw.clone()).unwrap();
        assert!(editor.added.is_empty());
        assert_eq!(editor.extra["language"], "rust");

        let back = serde_json::to_value(&editor).unwrap();
        assert_eq!(back["text"], "fn main() {}");
        assert_eq!(back["added"], json!([]));
    }

    #[test]
    fn test_state_json_roundtrip_keeps_unknown_page_fields() {
        let mut state = ProjectState::new("pages/1");
        state.page.extra.insert("blocks".to_string(), json!([1, 2]));

        let parsed = ProjectState::from_json(&state.to_json().unwrap(), &PreviewSettings::default()).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_import_unversioned() {
        let doc = import(json!({
            "tab": { "name": "Old" },
            "page": { "editors": [], "orientation": "portrait" },
            "settings": { "width": 500 }
        }))
        .unwrap();

        assert_eq!(doc.version, DocumentVersion::Unversioned);
        assert_eq!(doc.tab.unwrap().name, "Old");
        assert_eq!(doc.page.unwrap().orientation, "portrait");
        assert_eq!(doc.settings.unwrap().width, 500);
    }

    #[test]
    fn test_import_version_marker_presence() {
        let doc = import(json!({ "version": null })).unwrap();
        assert!(!doc.version.is_unversioned());

        let doc = import(json!({ "version": "1.9.0" })).unwrap();
        assert_eq!(doc.version, DocumentVersion::Versioned("1.9.0".to_string()));
    }

    #[test]
    fn test_import_rejects_non_object() {
        assert!(import(json!([1])).is_err());
        assert!(import(json!("{ broken")).is_err());
    }

    #[test]
    fn test_import_wrong_type_is_error() {
        let err = import(json!({ "page": "nope" })).unwrap_err();
        assert!(err.to_string().contains("[page]"));
    }

    #[test]
    fn test_import_partial_settings_use_given_defaults() {
        let defaults = PreviewSettings {
            theme_name: "nord".to_string(),
            font_size: 22,
            ..PreviewSettings::default()
        };
        let doc = ImportedDocument::from_value(json!({ "settings": { "width": 500 } }), &defaults).unwrap();

        let settings = doc.settings.unwrap();
        assert_eq!(settings.width, 500);
        assert_eq!(settings.theme_name, "nord");
        assert_eq!(settings.font_size, 22);
    }

    #[test]
    fn test_stored_document_missing_settings_keys_use_defaults() {
        let defaults = PreviewSettings {
            font_family: "Iosevka".to_string(),
            ..PreviewSettings::default()
        };
        let raw = r#"{ "tab": { "id": "pages/1" }, "settings": { "padding": 8 } }"#;

        let state = ProjectState::from_json(raw, &defaults).unwrap();
        assert_eq!(state.settings.padding, 8);
        assert_eq!(state.settings.font_family, "Iosevka");

        let state = ProjectState::from_json(r#"{ "tab": { "id": "pages/1" } }"#, &defaults).unwrap();
        assert_eq!(state.settings, defaults);
    }

    #[test]
    fn test_missing_keys() {
        let value = json!({ "page": {}, "settings": {} });
        assert_eq!(ImportedDocument::missing_keys(&value), vec!["tab"]);
        assert_eq!(ImportedDocument::missing_keys(&json!({})), vec!["tab", "page", "settings"]);
    }

    #[test]
    fn test_from_state() {
        let state = ProjectState::new("pages/1");
        let doc = ImportedDocument::from(state.clone());
        assert_eq!(doc.version, DocumentVersion::Versioned(CURRENT_VERSION.to_string()));
        assert_eq!(doc.page, Some(state.page));
    }
}
