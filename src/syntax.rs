//! Parsing front-end and tree-node identity.
//!
//! Every analysis artifact (history entries, diagnostics, value provenance)
//! is keyed by [`NodeId`]: the source file plus the node's byte span. Two
//! clones of the same parsed node carry the same span and therefore the same
//! identity, which lets value structures hold owned copies of definition
//! nodes without losing track of where they came from.

use std::fs;
use std::path::{Path, PathBuf};

use rustpython_parser::ast::{self, Ranged};
use rustpython_parser::Parse;

use crate::errors::{Error, Result};

/// Identity of a syntax-tree node: source file plus byte span.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId {
    file: PathBuf,
    start: usize,
    end: usize,
}

impl NodeId {
    pub fn of<N: Ranged>(file: &Path, node: &N) -> NodeId {
        NodeId {
            file: file.to_path_buf(),
            start: node.start().to_usize(),
            end: node.end().to_usize(),
        }
    }

    pub fn synthetic(file: &Path) -> NodeId {
        NodeId {
            file: file.to_path_buf(),
            start: 0,
            end: 0,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}..{}", self.file.display(), self.start, self.end)
    }
}

/// 1-based line number of a byte offset within `source`.
pub fn line_of(source: &str, offset: usize) -> usize {
    source
        .as_bytes()
        .iter()
        .take(offset)
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

/// Parse a module body from in-memory source.
pub fn parse_module(source: &str, path: &Path) -> Result<Vec<ast::Stmt>> {
    ast::Suite::parse(source, &path.to_string_lossy())
        .map_err(|e| Error::parse(path, e.to_string()))
}

/// Read and parse a module from disk.
pub fn parse_file(path: &Path) -> Result<Vec<ast::Stmt>> {
    let source = fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    parse_module(&source, path)
}
