//! Code Analyzer Module
//!
//! Provides the API-level view of source code:
//! - Multi-language API extraction (tree-sitter)
//! - Diff engine and severity classification
//! - File scanning with gitignore support

pub mod diff;
pub mod parser;
pub mod scanner;

pub use diff::DiffEngine;
