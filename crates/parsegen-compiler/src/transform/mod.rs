//! Grammar AST transforms.
//!
//! These passes make the root grammar self-contained and regular before
//! semantic analysis:
//! - `imports` - merge imported grammars into the root
//! - `implicit_lexer` - split the lexer half out of a combined grammar
//! - `blockset` - collapse alternative blocks of single terminals into sets
//! - `left_recursion` - rewrite directly left-recursive rules
//!
//! Each pass is a standalone function that mutates the grammar and reports
//! through the diagnostics collection.

mod blockset;
mod implicit_lexer;
mod imports;
mod left_recursion;

#[cfg(test)]
mod blockset_tests;
#[cfg(test)]
mod implicit_lexer_tests;
#[cfg(test)]
mod imports_tests;
#[cfg(test)]
mod left_recursion_tests;

pub use blockset::reduce_blocks_to_sets;
pub(crate) use blockset::lexer_set_intervals;
pub use implicit_lexer::extract_implicit_lexer;
pub use imports::merge_imports;
pub use left_recursion::{is_left_recursive, rewrite_left_recursive_rule};
