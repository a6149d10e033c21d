//! `parsegen compile`: write the vocab and interp artifacts.

use std::path::{Path, PathBuf};

use parsegen_compiler::output::{write_interp_file, write_vocab_file};
use parsegen_compiler::Grammar;

use crate::cli::CompileArgs;

use super::common::compile_from_args;

pub fn run(args: CompileArgs) -> Result<bool, String> {
    let (compiled, clean) = compile_from_args(&args.grammar)?;
    if !clean {
        return Ok(false);
    }

    let out_dir = args
        .output
        .clone()
        .or_else(|| {
            args.grammar
                .grammar
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| format!("cannot create {}: {e}", out_dir.display()))?;

    write_artifacts(&compiled.grammar, &out_dir, args.json)?;
    if let Some(lexer) = compiled.lexer() {
        write_artifacts(lexer, &out_dir, args.json)?;
    }
    Ok(true)
}

fn write_artifacts(grammar: &Grammar, out_dir: &Path, json: bool) -> Result<(), String> {
    let write = |suffix: &str, content: &str| -> Result<(), String> {
        let path = out_dir.join(format!("{}{suffix}", grammar.name));
        std::fs::write(&path, content).map_err(|e| format!("cannot write {}: {e}", path.display()))
    };

    write(".tokens", &write_vocab_file(grammar))?;
    write(".interp", &write_interp_file(grammar).map_err(|e| e.to_string())?)?;

    if json {
        if let Some(atn) = grammar.atn.as_ref() {
            let rendered = serde_json::to_string_pretty(atn)
                .map_err(|e| format!("cannot serialize ATN: {e}"))?;
            write(".atn.json", &rendered)?;
        }
    }
    Ok(())
}
