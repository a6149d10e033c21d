use indoc::indoc;

use crate::ast::NodeKind;
use crate::test_utils::{compile, compile_clean};

#[test]
fn combined_grammar_splits_into_lexer_and_parser() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        s : ID '=' expr ';' ;
        expr : ID ;
        ID : [a-z]+ ;
        WS : [ \t]+ -> skip ;
    "});
    let g = &compiled.grammar;
    let lexer = compiled.lexer().expect("combined grammar grows a lexer");

    assert_eq!(lexer.name, "TLexer");
    assert!(lexer.is_lexer());

    // Parser kept only the parser rules.
    let parser_rules: Vec<&str> = g.rules.keys().map(String::as_str).collect();
    assert_eq!(parser_rules, vec!["s", "expr"]);

    // Lexer got the moved rules plus synthesized literal rules, literals
    // first.
    let lexer_rules: Vec<&str> = lexer.rules.keys().map(String::as_str).collect();
    assert_eq!(lexer_rules, vec!["T__0", "T__1", "ID", "WS"]);

    // The parser sees the lexer's vocabulary.
    assert_eq!(g.token_type("'='"), lexer.token_type("'='"));
    assert_eq!(g.token_type("ID"), lexer.token_type("ID"));
    assert!(g.token_type("';'") > 0);
}

#[test]
fn aliased_literals_get_no_synthesized_rule() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        s : 'if' ID ;
        IF : 'if' ;
        ID : [a-z]+ ;
    "});
    let lexer = compiled.lexer().unwrap();
    let names: Vec<&str> = lexer.rules.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["IF", "ID"], "no T__ rule for aliased 'if'");
    assert_eq!(
        compiled.grammar.token_type("'if'"),
        lexer.token_type("IF")
    );
}

#[test]
fn no_lexer_when_nothing_to_extract() {
    let (compiled, diags) = compile("grammar T; s : s2 ; s2 : s3 ; s3 : ;");
    assert!(compiled.lexer().is_none());
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn lexer_scoped_actions_move() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        @lexer::members { int lexerState; }
        @parser::members { int parserState; }
        s : ID ;
        ID : [a-z]+ ;
    "});
    let g = &compiled.grammar;
    let lexer = compiled.lexer().unwrap();

    let lexer_keys: Vec<&(String, String)> = lexer.named_actions.keys().collect();
    assert!(lexer_keys
        .iter()
        .any(|(scope, name)| scope == "lexer" && name == "members"));

    // The combined grammar keeps only the parser-scoped action.
    let parser_keys: Vec<&(String, String)> = g.named_actions.keys().collect();
    assert_eq!(parser_keys.len(), 1);
    assert!(parser_keys
        .iter()
        .any(|(scope, name)| scope == "parser" && name == "members"));
}

#[test]
fn grammar_options_propagate_minus_blacklist() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        options { language = Rust; superClass = Base; }
        s : ID ;
        ID : [a-z]+ ;
    "});
    let lexer = compiled.lexer().unwrap();
    assert_eq!(lexer.option("language"), Some("Rust"));
    assert_eq!(lexer.option("superClass"), None);
}

#[test]
fn channels_move_to_the_lexer() {
    let compiled = compile_clean(indoc! {r"
        grammar T;
        channels { COMMENTS }
        s : ID ;
        ID : [a-z]+ ;
        LC : '//' -> channel(COMMENTS) ;
    "});
    let g = &compiled.grammar;
    let lexer = compiled.lexer().unwrap();
    assert!(lexer.channel_value("COMMENTS").is_some());
    // No channels block left on the parser side.
    let leftover = g
        .tree
        .children(g.root)
        .iter()
        .filter(|&&c| matches!(g.tree.kind(c), NodeKind::Channels))
        .count();
    assert_eq!(leftover, 0);
}
