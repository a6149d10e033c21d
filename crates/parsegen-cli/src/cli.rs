//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "parsegen", version, about = "Grammar compiler front-end")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a grammar and print diagnostics.
    Check(GrammarArgs),
    /// Compile a grammar: write the .tokens vocab and interp files.
    Compile(CompileArgs),
    /// Print the token vocabulary to stdout.
    Tokens(GrammarArgs),
    /// Print the interpreter dump to stdout.
    Interp(GrammarArgs),
}

#[derive(Args, Debug)]
pub struct GrammarArgs {
    /// Grammar file (.g4 or legacy .g).
    pub grammar: PathBuf,

    /// Diagnostic message format.
    #[arg(long, default_value = "antlr", value_parser = ["antlr", "gnu", "vs2005"])]
    pub format: String,

    /// Treat warnings as errors.
    #[arg(long)]
    pub warnings_are_errors: bool,
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    #[command(flatten)]
    pub grammar: GrammarArgs,

    /// Output directory; defaults next to the grammar file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the serialized ATN as JSON.
    #[arg(long)]
    pub json: bool,
}
