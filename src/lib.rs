// Export modules for library usage
pub mod analyzer;
pub mod builtins;
pub mod cli;
pub mod config;
pub mod env;
pub mod errors;
pub mod history;
pub mod interp;
pub mod modules;
pub mod session;
pub mod syntax;
pub mod values;

// Re-export commonly used types
pub use crate::analyzer::{analyze_file, analyze_source, Analysis, Analyzer};
pub use crate::config::AnalysisConfig;
pub use crate::env::Env;
pub use crate::errors::{Error, Result};
pub use crate::history::{History, MethodInvocation, Telemetry};
pub use crate::session::{AnalysisSession, AnalysisStats, CallStack};
pub use crate::syntax::NodeId;
pub use crate::values::{
    union, DiagKind, Diagnostic, Literal, Value, ValueSet,
};
