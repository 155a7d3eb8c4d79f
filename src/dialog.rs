//! File selection for imports

use anyhow::Result;
use std::path::{Path, PathBuf};

#[allow(async_fn_in_trait)]
pub trait FilePicker {
    /// Let the user choose `.json` files; an empty list means nothing was chosen
    async fn pick_json(&self) -> Result<Vec<PathBuf>>;
}

/// Picker with a preselected list (command-line arguments, tests)
#[derive(Debug, Default, Clone)]
pub struct StaticFilePicker {
    files: Vec<PathBuf>,
}

impl StaticFilePicker {
    pub fn new(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }
}

impl FilePicker for StaticFilePicker {
    async fn pick_json(&self) -> Result<Vec<PathBuf>> {
        Ok(self.files.iter().filter(|path| is_json(path)).cloned().collect())
    }
}

pub fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
