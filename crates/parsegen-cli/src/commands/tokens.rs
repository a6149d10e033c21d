//! `parsegen tokens`: print the vocab file to stdout.

use parsegen_compiler::output::write_vocab_file;

use crate::cli::GrammarArgs;

use super::common::compile_from_args;

pub fn run(args: GrammarArgs) -> Result<bool, String> {
    let (compiled, clean) = compile_from_args(&args)?;
    if clean {
        print!("{}", write_vocab_file(&compiled.grammar));
    }
    Ok(clean)
}
