mod cli;
mod commands;
mod resolver;

use cli::{Cli, Command};

fn main() {
    let cli = <Cli as clap::Parser>::parse();

    let outcome = match cli.command {
        Command::Check(args) => commands::check::run(args),
        Command::Compile(args) => commands::compile::run(args),
        Command::Tokens(args) => commands::tokens::run(args),
        Command::Interp(args) => commands::interp::run(args),
    };

    match outcome {
        Ok(clean) => std::process::exit(if clean { 0 } else { 1 }),
        Err(err) => {
            eprintln!("parsegen: {err}");
            std::process::exit(1);
        }
    }
}
