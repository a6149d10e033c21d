//! `parsegen check`: diagnostics only.

use crate::cli::GrammarArgs;

use super::common::compile_from_args;

pub fn run(args: GrammarArgs) -> Result<bool, String> {
    let (_, clean) = compile_from_args(&args)?;
    Ok(clean)
}
