//! `parsegen interp`: print the interpreter dump to stdout.

use parsegen_compiler::output::write_interp_file;

use crate::cli::GrammarArgs;

use super::common::compile_from_args;

pub fn run(args: GrammarArgs) -> Result<bool, String> {
    let (compiled, clean) = compile_from_args(&args)?;
    if !clean {
        return Ok(false);
    }
    let dump = write_interp_file(&compiled.grammar).map_err(|e| e.to_string())?;
    print!("{dump}");
    if let Some(lexer) = compiled.lexer() {
        let dump = write_interp_file(lexer).map_err(|e| e.to_string())?;
        print!("{dump}");
    }
    Ok(true)
}
