//! Analysis configuration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Immutable per-run settings.
#[derive(Clone, Debug, Default)]
pub struct AnalysisConfig {
    /// Directories searched for imported modules, in order. Empty means the
    /// current directory.
    pub search_paths: Vec<PathBuf>,
    /// Files whose function bodies are not descended into. Matched by full
    /// path or by file name.
    pub skip_files: BTreeSet<PathBuf>,
}

impl AnalysisConfig {
    pub fn new() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    pub fn with_skip_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.skip_files.insert(file.into());
        self
    }

    pub fn should_skip(&self, file: &Path) -> bool {
        if self.skip_files.contains(file) {
            return true;
        }
        file.file_name()
            .map(|name| self.skip_files.contains(Path::new(name)))
            .unwrap_or(false)
    }
}
