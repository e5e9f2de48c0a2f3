//! Entry points: run the interpreter over a source string or file and hand
//! back a queryable [`Analysis`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::errors::{Error, Result};
use crate::history::{History, Telemetry};
use crate::interp::Interp;
use crate::session::{AnalysisSession, AnalysisStats};
use crate::syntax::{self, NodeId};
use crate::values::{Diagnostic, ValueSet};

/// Analyzer configured for one or more runs.
#[derive(Clone, Debug, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new() -> Analyzer {
        Analyzer::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Analyzer {
        Analyzer { config }
    }

    /// Analyze in-memory source. The pseudo-file `<string>` stands in for a
    /// path in node identities.
    pub fn analyze_source(&self, source: &str) -> Result<Analysis> {
        self.run(source.to_string(), PathBuf::from("<string>"))
    }

    /// Analyze a file on disk. The search path is taken from the
    /// configuration as-is; callers wanting sibling imports resolved should
    /// configure the file's directory.
    pub fn analyze_file(&self, path: &Path) -> Result<Analysis> {
        let source = fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        self.run(source, path.to_path_buf())
    }

    fn run(&self, source: String, file: PathBuf) -> Result<Analysis> {
        let body = syntax::parse_module(&source, &file)?;
        let mut session = AnalysisSession::new(self.config.clone());
        session.sources.insert(file.clone(), source);
        let result = {
            let mut interp = Interp::new(&mut session);
            interp.infer_module(&body, &file).0
        };
        log::debug!(
            "analyzed {}: {} calls, {} unknowns, {} modules",
            file.display(),
            session.stats.calls_analyzed,
            session.stats.unknown_values,
            session.stats.modules_loaded
        );
        Ok(Analysis {
            result,
            file,
            session,
        })
    }
}

/// Analyze a source string with a default configuration.
pub fn analyze_source(source: &str) -> Result<Analysis> {
    Analyzer::new().analyze_source(source)
}

/// Analyze a file with the file's own directory on the module search path.
pub fn analyze_file(path: &Path) -> Result<Analysis> {
    let mut config = AnalysisConfig::new();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        config = config.with_search_path(parent);
    }
    Analyzer::with_config(config).analyze_file(path)
}

/// A finished analysis: the module's result set plus everything the session
/// accumulated.
#[derive(Debug)]
pub struct Analysis {
    result: ValueSet,
    file: PathBuf,
    session: AnalysisSession,
}

impl Analysis {
    /// Values the module body produces; includes the continuation sentinel
    /// when the module falls through, which is the normal case.
    pub fn result(&self) -> &ValueSet {
        &self.result
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn history(&self) -> &History {
        &self.session.history
    }

    pub fn history_for(&self, node: &NodeId) -> Option<&ValueSet> {
        self.session.history.for_node(node)
    }

    pub fn history_for_name(&self, name: &str) -> Option<&ValueSet> {
        self.session.history.for_name(name)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.session.history.diagnostics()
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.session.telemetry
    }

    pub fn stats(&self) -> &AnalysisStats {
        &self.session.stats
    }

    pub fn source_of(&self, file: &Path) -> Option<&str> {
        self.session.sources.get(file).map(String::as_str)
    }

    /// 1-based line of a node, when its file's source is on hand.
    pub fn line_of(&self, node: &NodeId) -> Option<usize> {
        self.source_of(node.file())
            .map(|source| syntax::line_of(source, node.start()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Value;

    #[test]
    fn module_results_carry_the_fall_through_sentinel() {
        let analysis = analyze_source("x = 1\n").unwrap();
        assert!(analysis.result().has_continuation());
    }

    #[test]
    fn analysis_exposes_history_by_name() {
        let analysis = analyze_source("flag = True\n").unwrap();
        let set = analysis.history_for_name("flag").unwrap();
        assert!(set.contains(&Value::Prim(crate::values::Literal::Bool(true))));
    }

    #[test]
    fn analyze_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.py");
        std::fs::write(&path, "answer = 42\n").unwrap();
        let analysis = analyze_file(&path).unwrap();
        assert!(analysis.history_for_name("answer").is_some());
        assert_eq!(analysis.file(), path.as_path());
    }

    #[test]
    fn analyze_file_surfaces_read_failures() {
        let err = analyze_file(Path::new("/no/such/file.py")).unwrap_err();
        assert!(matches!(err, Error::FileSystem { .. }));
    }

    #[test]
    fn line_numbers_come_from_the_recorded_source() {
        let analysis = analyze_source("a = 1\nb = 2\n").unwrap();
        let node = analysis
            .history()
            .nodes()
            .find(|(_, set)| set.contains(&Value::Prim(crate::values::Literal::Int(2))))
            .map(|(node, _)| node.clone())
            .unwrap();
        assert_eq!(analysis.line_of(&node), Some(2));
    }
}
