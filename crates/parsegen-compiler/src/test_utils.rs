//! Shared helpers for the compiler's tests.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::pipeline::{CompiledGrammar, Compiler};

/// Run the full pipeline over grammar text, returning the result and the
/// diagnostics it produced.
pub fn compile(text: &str) -> (CompiledGrammar, Diagnostics) {
    let mut diags = Diagnostics::new();
    let compiled = Compiler::default()
        .compile("T.g4", text, &mut diags)
        .expect("grammar should be processable");
    (compiled, diags)
}

/// Compile text that is expected to be clean.
pub fn compile_clean(text: &str) -> CompiledGrammar {
    let (compiled, diags) = compile(text);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    compiled
}

/// Compile text and return just the diagnostic kinds, in emission order.
pub fn diagnostic_kinds(text: &str) -> Vec<DiagnosticKind> {
    let (_, diags) = compile(text);
    diags.kinds()
}

/// Assert the diagnostics contain `kind` with a message containing `what`.
pub fn assert_diagnostic(diags: &Diagnostics, kind: DiagnosticKind, what: &str) {
    let found = diags
        .iter()
        .any(|d| d.kind == kind && d.message.contains(what));
    assert!(
        found,
        "expected {kind:?} mentioning {what:?}, got: {:#?}",
        diags.as_slice()
    );
}
