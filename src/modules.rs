//! Module location and caching for import statements.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use rustpython_parser::ast;

use crate::config::AnalysisConfig;
use crate::env::Env;

/// A loaded module: parsed body, exit environment, source path.
#[derive(Debug)]
pub struct ModuleRec {
    pub body: Rc<Vec<ast::Stmt>>,
    pub env: Env,
    pub file: PathBuf,
}

impl ModuleRec {
    /// Placeholder for modules that could not be located or parsed. Imports
    /// of its names degrade to unknowns.
    pub fn missing() -> ModuleRec {
        ModuleRec {
            body: Rc::new(Vec::new()),
            env: Env::new(),
            file: PathBuf::from("<missing>"),
        }
    }
}

/// Memoized modules, keyed by their dotted import name. Each module is
/// interpreted at most once per session.
#[derive(Debug, Default)]
pub struct ModuleCache {
    loaded: HashMap<String, Rc<ModuleRec>>,
    loading: HashSet<String>,
}

impl ModuleCache {
    pub fn new() -> ModuleCache {
        ModuleCache::default()
    }

    pub fn get(&self, name: &str) -> Option<Rc<ModuleRec>> {
        self.loaded.get(name).cloned()
    }

    /// Mark a module as in-flight. Returns false when it already is, which
    /// signals an import cycle.
    pub fn begin(&mut self, name: &str) -> bool {
        self.loading.insert(name.to_string())
    }

    pub fn finish(&mut self, name: &str, rec: Rc<ModuleRec>) -> Rc<ModuleRec> {
        self.loading.remove(name);
        self.loaded.insert(name.to_string(), Rc::clone(&rec));
        rec
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

/// Find a module's source file on the search path and read it.
///
/// Dotted names map to nested directories. The first existing file wins; an
/// empty search path means the current directory.
pub fn locate(name: &str, config: &AnalysisConfig) -> Option<(PathBuf, String)> {
    let dirs: Vec<PathBuf> = if config.search_paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        config.search_paths.clone()
    };
    for dir in dirs {
        let mut candidate = dir;
        for part in name.split('.') {
            candidate.push(part);
        }
        candidate.set_extension("py");
        match fs::read_to_string(&candidate) {
            Ok(source) => return Some((candidate, source)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                log::warn!("cannot read module candidate {}: {e}", candidate.display());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn locate_walks_the_search_path_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(second.path().join("mymod.py")).unwrap();
        writeln!(f, "x = 1").unwrap();

        let config = AnalysisConfig::new()
            .with_search_path(first.path())
            .with_search_path(second.path());
        let (path, source) = locate("mymod", &config).unwrap();
        assert!(path.starts_with(second.path()));
        assert!(source.contains("x = 1"));
    }

    #[test]
    fn locate_resolves_dotted_names_to_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg").join("inner.py"), "y = 2\n").unwrap();

        let config = AnalysisConfig::new().with_search_path(dir.path());
        let (path, _) = locate("pkg.inner", &config).unwrap();
        assert!(path.ends_with("pkg/inner.py"));
    }

    #[test]
    fn locate_reports_nothing_for_missing_modules() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::new().with_search_path(dir.path());
        assert!(locate("no_such_module", &config).is_none());
    }

    #[test]
    fn cache_tracks_loading_and_loaded() {
        let mut cache = ModuleCache::new();
        assert!(cache.begin("m"));
        assert!(!cache.begin("m"));
        assert!(cache.get("m").is_none());
        cache.finish("m", Rc::new(ModuleRec::missing()));
        assert!(cache.get("m").is_some());
        assert!(cache.begin("m"));
    }
}
