//! Migrations for documents saved by older releases
//!
//! Steps run in order; each one declares which source versions it applies
//! to. The result is stamped with the current version by the caller.

use tracing::{info, warn};

use super::document::{DocumentVersion, ProjectState};
use crate::constants::document::{DEFAULT_ORIENTATION, LEGACY_ORIENTATIONS};

pub struct Migration {
    pub name: &'static str,
    applies: fn(&DocumentVersion) -> bool,
    apply: fn(&mut ProjectState) -> bool,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "editor-history",
        applies: DocumentVersion::is_unversioned,
        apply: backfill_editor_history,
    },
    Migration {
        name: "legacy-orientation",
        applies: any_version,
        apply: collapse_legacy_orientation,
    },
];

fn any_version(_: &DocumentVersion) -> bool {
    true
}

/// Editors saved before versioning have no (or stale) history sets
fn backfill_editor_history(state: &mut ProjectState) -> bool {
    for editor in &mut state.page.editors {
        editor.clear_history();
    }
    !state.page.editors.is_empty()
}

/// `portrait` and `landscape` were retired; both become `left`
fn collapse_legacy_orientation(state: &mut ProjectState) -> bool {
    let orientation = &mut state.page.orientation;
    if !LEGACY_ORIENTATIONS.contains(&orientation.as_str()) {
        return false;
    }

    // Two legacy values land on one target; `landscape` arguably meant `top`.
    warn!(from = %orientation, to = DEFAULT_ORIENTATION, "Collapsing legacy page orientation");
    *orientation = DEFAULT_ORIENTATION.to_string();
    true
}

/// Run every applicable step; returns the names of steps that changed `state`
pub fn migrate(state: &mut ProjectState, source: &DocumentVersion) -> Vec<&'static str> {
    let mut applied = Vec::new();
    for migration in MIGRATIONS {
        if (migration.applies)(source) && (migration.apply)(state) {
            info!(migration = migration.name, tab = %state.tab.id, "Applied document migration");
            applied.push(migration.name);
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::document::Editor;
    use serde_json::json;

    fn state_with_history(orientation: &str) -> ProjectState {
        let mut state = ProjectState::new("pages/1");
        state.page.orientation = orientation.to_string();
        state.page.editors = vec![Editor {
            added: vec![json!(1)],
            removed: vec![json!(2)],
            focused: vec![json!(3)],
            ..Editor::default()
        }];
        state
    }

    #[test]
    fn test_unversioned_clears_editor_history() {
        let mut state = state_with_history("left");
        let applied = migrate(&mut state, &DocumentVersion::Unversioned);

        assert_eq!(applied, vec!["editor-history"]);
        let editor = &state.page.editors[0];
        assert!(editor.added.is_empty() && editor.removed.is_empty() && editor.focused.is_empty());
    }

    #[test]
    fn test_versioned_keeps_editor_history() {
        let mut state = state_with_history("left");
        let applied = migrate(&mut state, &DocumentVersion::Versioned("1.9.0".to_string()));

        assert!(applied.is_empty());
        assert_eq!(state.page.editors[0].added, vec![json!(1)]);
    }

    #[test]
    fn test_legacy_orientations_collapse_to_left() {
        for legacy in ["portrait", "landscape"] {
            let mut state = state_with_history(legacy);
            let applied = migrate(&mut state, &DocumentVersion::Versioned("1.9.0".to_string()));
            assert_eq!(applied, vec!["legacy-orientation"]);
            assert_eq!(state.page.orientation, "left");
        }
    }

    #[test]
    fn test_current_orientations_untouched() {
        for current in ["left", "right", "top", "bottom"] {
            let mut state = state_with_history(current);
            migrate(&mut state, &DocumentVersion::Unversioned);
            assert_eq!(state.page.orientation, current);
        }
    }

    #[test]
    fn test_unversioned_without_editors_reports_nothing() {
        let mut state = ProjectState::new("pages/1");
        state.page.editors.clear();
        assert!(migrate(&mut state, &DocumentVersion::Unversioned).is_empty());
    }
}
