//! Command-line interface and report rendering.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde_json::json;

use crate::analyzer::Analysis;
use crate::config::AnalysisConfig;
use crate::values::ValueSet;

#[derive(Parser, Debug)]
#[command(
    name = "pysift",
    about = "Whole-program value-flow analyzer for Python",
    version
)]
pub struct Cli {
    /// Python file to analyze
    pub file: PathBuf,

    /// Extra module search directories, tried in order after the analyzed
    /// file's own directory
    #[arg(
        long = "search-path",
        value_name = "DIR",
        env = "PYSIFT_PATH",
        value_delimiter = ':'
    )]
    pub search_paths: Vec<PathBuf>,

    /// Files whose function bodies are not descended into (full path or
    /// file name)
    #[arg(long = "skip", value_name = "FILE")]
    pub skip: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub fn to_config(&self) -> AnalysisConfig {
        let mut config = AnalysisConfig::new();
        if let Some(parent) = self.file.parent().filter(|p| !p.as_os_str().is_empty()) {
            config = config.with_search_path(parent);
        }
        for dir in &self.search_paths {
            config = config.with_search_path(dir);
        }
        for file in &self.skip {
            config = config.with_skip_file(file);
        }
        config
    }
}

fn sorted_symbols(analysis: &Analysis) -> Vec<(&String, &ValueSet)> {
    let mut symbols: Vec<(&String, &ValueSet)> = analysis.history().names().collect();
    symbols.sort_by(|a, b| a.0.cmp(b.0));
    symbols
}

pub fn render_text(analysis: &Analysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "analysis of {}", analysis.file().display());

    let _ = writeln!(out, "\nsymbols:");
    for (name, values) in sorted_symbols(analysis) {
        let _ = writeln!(out, "  {name}: {values}");
    }

    let diagnostics = analysis.diagnostics();
    if !diagnostics.is_empty() {
        let _ = writeln!(out, "\ndiagnostics:");
        for diag in &diagnostics {
            let line = analysis
                .line_of(&diag.node)
                .map(|l| l.to_string())
                .unwrap_or_else(|| "?".to_string());
            let _ = writeln!(
                out,
                "  {}:{line}: {}: {}",
                diag.node.file().display(),
                diag.kind,
                diag.detail
            );
        }
    }

    let telemetry = analysis.telemetry();
    if !telemetry.is_empty() {
        let _ = writeln!(out, "\nmethod calls:");
        let mut classes: Vec<_> = telemetry.classes().collect();
        classes.sort_by(|a, b| a.0.cmp(b.0));
        for (class, invocations) in classes {
            for inv in invocations {
                let ctor = inv
                    .ctor_args
                    .iter()
                    .map(ValueSet::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let call = inv
                    .call_args
                    .iter()
                    .map(ValueSet::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(
                    out,
                    "  {class}.{}({call})  [constructed with ({ctor})]",
                    inv.methods.join("|")
                );
            }
        }
    }

    let stats = analysis.stats();
    let _ = writeln!(
        out,
        "\nstats: {} calls analyzed, {} unknowns, {} modules loaded",
        stats.calls_analyzed, stats.unknown_values, stats.modules_loaded
    );
    out
}

pub fn render_json(analysis: &Analysis) -> serde_json::Value {
    let mut symbols = serde_json::Map::new();
    for (name, values) in sorted_symbols(analysis) {
        symbols.insert(
            name.clone(),
            json!(values.iter().map(|v| v.to_string()).collect::<Vec<_>>()),
        );
    }

    let diagnostics: Vec<serde_json::Value> = analysis
        .diagnostics()
        .iter()
        .map(|diag| {
            json!({
                "kind": diag.kind.code(),
                "detail": diag.detail,
                "file": diag.node.file().display().to_string(),
                "line": analysis.line_of(&diag.node),
            })
        })
        .collect();

    let mut telemetry = serde_json::Map::new();
    let mut classes: Vec<_> = analysis.telemetry().classes().collect();
    classes.sort_by(|a, b| a.0.cmp(b.0));
    for (class, invocations) in classes {
        let calls: Vec<serde_json::Value> = invocations
            .iter()
            .map(|inv| {
                json!({
                    "ctor_args": inv.ctor_args.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                    "call_args": inv.call_args.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                    "methods": inv.methods,
                })
            })
            .collect();
        telemetry.insert(class.clone(), json!(calls));
    }

    json!({
        "file": analysis.file().display().to_string(),
        "symbols": symbols,
        "diagnostics": diagnostics,
        "telemetry": telemetry,
        "stats": analysis.stats(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_source;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_puts_the_file_directory_first() {
        let cli = Cli::parse_from([
            "pysift",
            "/work/project/app.py",
            "--search-path",
            "/extra/libs",
            "--skip",
            "vendor.py",
        ]);
        let config = cli.to_config();
        assert_eq!(config.search_paths[0], PathBuf::from("/work/project"));
        assert_eq!(config.search_paths[1], PathBuf::from("/extra/libs"));
        assert!(config.should_skip(std::path::Path::new("anything/vendor.py")));
    }

    #[test]
    fn text_report_lists_symbols_and_diagnostics() {
        let analysis = analyze_source("x = 1\ny = missing_thing()\n").unwrap();
        let report = render_text(&analysis);
        assert!(report.contains("x: 1"));
        assert!(report.contains("stats:"));
    }

    #[test]
    fn json_report_has_the_expected_shape() {
        let analysis = analyze_source("x = 'hi'\n").unwrap();
        let report = render_json(&analysis);
        assert_eq!(report["file"], "<string>");
        assert!(report["symbols"]["x"]
            .as_array()
            .unwrap()
            .contains(&json!("'hi'")));
        assert!(report["stats"]["calls_analyzed"].is_number());
    }
}
