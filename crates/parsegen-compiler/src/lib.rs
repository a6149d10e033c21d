//! Parsegen compiler: grammar front-end producing ATNs for code generation.
//!
//! This crate provides the compilation pipeline for grammar files:
//! - `syntax` - lexer and parser for the grammar surface syntax
//! - `ast` - the grammar AST arena
//! - `grammar` - the grammar object and its symbol tables
//! - `transform` - import merging, implicit-lexer extraction, block-set
//!   reduction, left-recursion elimination
//! - `semantic` - the semantic pass pipeline
//! - `atn` - ATN construction and optimization
//! - `analysis` - per-decision lookahead and LL(1) classification
//! - `output` - vocab and interpreter-file emission
//! - `diagnostics` - error reporting

pub mod analysis;
pub mod ast;
pub mod atn;
pub mod diagnostics;
pub mod grammar;
pub mod literals;
pub mod output;
pub mod pipeline;
pub mod semantic;
pub mod syntax;
pub mod transform;

#[cfg(test)]
pub mod test_utils;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, MessageFormat, Severity};
pub use grammar::Grammar;
pub use pipeline::{CompileOptions, CompiledGrammar, Compiler, ImportResolver, MapResolver, NoImports};

/// Errors that abort a compilation outright.
///
/// Everything recoverable flows through [`Diagnostics`]; these are the
/// conditions the pipeline cannot continue past.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The grammar declaration itself could not be parsed.
    #[error("grammar {0} is unusable: {1} syntax errors")]
    Unparsable(String, usize),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for pipeline entry points.
pub type Result<T> = std::result::Result<T, Error>;
