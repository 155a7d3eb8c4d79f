//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Storage key conventions shared by every backend
pub mod storage {
    /// Prefix distinguishing project entries from unrelated keys
    pub const NAMESPACE: &str = "pages/";

    /// Extension used by the directory-backed structured store
    pub const ENTRY_EXTENSION: &str = "json";

    /// File holding the legacy key-value entries
    pub const LEGACY_FILENAME: &str = "local-storage.json";

    /// Directory holding the structured entries
    pub const DATABASE_DIR: &str = "database";
}

/// Debounce windows for deferred persistence
pub mod debounce {
    /// Trailing window before a patched project is written
    pub const PROJECT_SYNC_MS: u64 = 2000;

    /// Trailing window before tab positions are written back as orders
    pub const TAB_ORDER_SYNC_MS: u64 = 2500;
}

/// Collection ceilings when not running privileged
pub mod limits {
    pub const MAX_PROJECTS: usize = 200;
    pub const MAX_TEMPLATES: usize = 300;
}

/// Project document constants
pub mod document {
    /// Version stamped on documents written by this build.
    /// Documents without any version predate editor history fields.
    pub const CURRENT_VERSION: &str = "1.9.0";

    /// Keys an imported document must carry
    pub const REQUIRED_KEYS: [&str; 3] = ["tab", "page", "settings"];

    /// Name given to freshly created tabs
    pub const DEFAULT_TAB_NAME: &str = "Untitled";

    /// Orientation used by new pages and by migrated legacy pages
    pub const DEFAULT_ORIENTATION: &str = "left";

    /// Retired orientation values
    pub const LEGACY_ORIENTATIONS: [&str; 2] = ["portrait", "landscape"];
}

/// Preview settings defaults
pub mod preview {
    pub const DEFAULT_BACKGROUND: &str = "default";
    pub const DEFAULT_WIDTH: u32 = 400;
    pub const DEFAULT_HEIGHT: u32 = 200;
    pub const DEFAULT_PADDING: u32 = 16;
    pub const DEFAULT_BORDER_RADIUS: u32 = 12;
    pub const DEFAULT_BORDER_WIDTH: u32 = 2;
}

/// Config file location
pub mod config {
    pub const APP_DIR: &str = "shotpad";
    pub const FILENAME: &str = "config.json";
}

/// Config value ranges enforced after load
pub mod validation {
    pub const MIN_DEBOUNCE_MS: u64 = 100;
    pub const MAX_DEBOUNCE_MS: u64 = 60_000;
    pub const MIN_FONT_SIZE: u32 = 6;
    pub const MAX_FONT_SIZE: u32 = 96;
}

/// User-facing alert messages
pub mod messages {
    pub const IMPORT_MISSING_DATA: &str = "Error importing configuration. Required data is missing.";
    pub const PROJECT_LIMIT_REACHED: &str = "Download the desktop app to unlock more tabs.";
}
