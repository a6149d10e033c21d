//! The semantic pass pipeline.
//!
//! Pass order is fixed. The driver compares the error count at stage
//! boundaries; a stage that produced new errors still reports everything
//! it found, but later stages do not run on the broken grammar.

mod attribute_checks;
mod basic_checks;
mod channels;
mod lexer_checks;
mod rule_collector;
mod symbol_checks;
mod symbol_collector;
mod token_types;


pub use rule_collector::collect_rules;
pub use symbol_collector::collect_symbols;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;
use crate::transform::{is_left_recursive, rewrite_left_recursive_rule};

/// Run the full semantic pipeline over one grammar.
///
/// The passes run in three gated stages: collection+basic checks, the
/// left-recursion transform, then the symbol/typing checks. A stage that
/// raises the error count still reports everything it found, but the next
/// stage does not run on the broken grammar.
///
/// Returns `false` when the pipeline stopped early.
pub fn run_semantic_pipeline(g: &mut Grammar, diags: &mut Diagnostics) -> bool {
    let stages: &[&[fn(&mut Grammar, &mut Diagnostics)]] = &[
        &[collect_rules, basic_checks::check],
        &[transform_left_recursion],
        &[
            collect_symbols,
            symbol_checks::check,
            token_types::assign,
            channels::assign,
            lexer_checks::check_mode_conflicts,
            lexer_checks::check_unreachable_tokens,
            lexer_checks::check_case_insensitive_options,
            lexer_checks::check_ranges,
            attribute_checks::check,
        ],
    ];

    for stage in stages {
        let errors_before = diags.error_count();
        for pass in *stage {
            pass(g, diags);
        }
        if diags.error_count() > errors_before {
            return false;
        }
    }
    true
}

/// Pass 3: rewrite directly left-recursive parser rules.
fn transform_left_recursion(g: &mut Grammar, diags: &mut Diagnostics) {
    if g.is_lexer() {
        return;
    }
    let names: Vec<String> = g.rules.keys().cloned().collect();
    for name in names {
        let Some(rule) = g.rule(&name) else { continue };
        if rule.is_token_rule() || !is_left_recursive(g, rule.node, &name) {
            continue;
        }
        let pos = g.tree.node(g.rule(&name).expect("rule exists").node).pos();
        match rewrite_left_recursive_rule(g, &name) {
            Some(info) => {
                if let Some(rule) = g.rule_mut(&name) {
                    rule.left_recursion = Some(info);
                }
            }
            // Every alternative recurses; nothing can seed the loop.
            None => {
                let file = g.file_name.clone();
                diags.emit(DiagnosticKind::LeftRecursionCycles, &file, pos, &[&name]);
            }
        }
    }
}
