//! Shared command plumbing.

use std::path::Path;

use parsegen_compiler::{
    CompileOptions, CompiledGrammar, Compiler, Diagnostics, DiagnosticsPrinter, MessageFormat,
};

use crate::cli::GrammarArgs;
use crate::resolver::FsResolver;

/// Run the pipeline over the grammar named by the CLI args, print the
/// diagnostics, and report whether the run was error-free.
pub fn compile_from_args(args: &GrammarArgs) -> Result<(CompiledGrammar, bool), String> {
    let path = &args.grammar;
    check_extension(path)?;
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let file_name = path.display().to_string();

    let resolver = FsResolver::for_grammar(path);
    let mut diags = Diagnostics::new();
    let compiled = Compiler::new(&resolver)
        .options(CompileOptions {
            warnings_are_errors: args.warnings_are_errors,
        })
        .compile(&file_name, &text, &mut diags)
        .map_err(|e| e.to_string())?;

    let format = MessageFormat::from_name(&args.format).unwrap_or_default();
    let rendered = DiagnosticsPrinter::new(&diags).format(format).render();
    eprint!("{rendered}");

    Ok((compiled, !diags.has_errors()))
}

fn check_extension(path: &Path) -> Result<(), String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("g4" | "g") => Ok(()),
        _ => Err(format!(
            "{}: expected a .g4 (or .g) grammar file",
            path.display()
        )),
    }
}
