use indoc::indoc;

use crate::cli::{Cli, Command, CompileArgs, GrammarArgs};

fn parse(args: &[&str]) -> Cli {
    <Cli as clap::Parser>::try_parse_from(args).expect("args should parse")
}

#[test]
fn check_command_parses() {
    let cli = parse(&["parsegen", "check", "G.g4"]);
    match cli.command {
        Command::Check(GrammarArgs { grammar, format, warnings_are_errors }) => {
            assert_eq!(grammar.to_str(), Some("G.g4"));
            assert_eq!(format, "antlr");
            assert!(!warnings_are_errors);
        }
        other => panic!("expected check, got {other:?}"),
    }
}

#[test]
fn format_flag_is_validated() {
    let cli = parse(&["parsegen", "check", "--format", "gnu", "G.g4"]);
    match cli.command {
        Command::Check(args) => assert_eq!(args.format, "gnu"),
        other => panic!("expected check, got {other:?}"),
    }

    let err = <Cli as clap::Parser>::try_parse_from(["parsegen", "check", "--format", "xml", "G.g4"]);
    assert!(err.is_err());
}

#[test]
fn compile_command_takes_output_and_json() {
    let cli = parse(&["parsegen", "compile", "-o", "gen", "--json", "G.g4"]);
    match cli.command {
        Command::Compile(CompileArgs { grammar, output, json }) => {
            assert_eq!(grammar.grammar.to_str(), Some("G.g4"));
            assert_eq!(output.as_deref().and_then(|p| p.to_str()), Some("gen"));
            assert!(json);
        }
        other => panic!("expected compile, got {other:?}"),
    }
}

#[test]
fn end_to_end_check_of_a_temp_grammar() {
    let dir = std::env::temp_dir().join("parsegen-cli-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("E2E.g4");
    std::fs::write(
        &path,
        indoc! {r"
            grammar E2E;
            s : ID EOF ;
            ID : [a-z]+ ;
        "},
    )
    .unwrap();

    let args = GrammarArgs {
        grammar: path.clone(),
        format: "antlr".to_string(),
        warnings_are_errors: false,
    };
    let clean = crate::commands::check::run(args).unwrap();
    assert!(clean);

    let bad = dir.join("BAD.g4");
    std::fs::write(&bad, "grammar BAD; s : missing ;").unwrap();
    let args = GrammarArgs {
        grammar: bad,
        format: "antlr".to_string(),
        warnings_are_errors: false,
    };
    let clean = crate::commands::check::run(args).unwrap();
    assert!(!clean);
}

#[test]
fn non_grammar_extension_is_rejected() {
    let args = GrammarArgs {
        grammar: "notes.txt".into(),
        format: "antlr".to_string(),
        warnings_are_errors: false,
    };
    let err = crate::commands::check::run(args).unwrap_err();
    assert!(err.contains("expected a .g4"));
}
