use parsegen_core::{MIN_USER_TOKEN_TYPE, TOKEN_EOF, TOKEN_INVALID_TYPE};

use crate::diagnostics::{Diagnostics, SrcPos};
use crate::syntax::parse_grammar;

use super::rule::parse_attr_defs;
use super::{Grammar, Rule};

fn grammar(src: &str) -> Grammar {
    let mut diags = Diagnostics::new();
    let (tree, root) = parse_grammar("T.g4", src, &mut diags).unwrap();
    assert!(diags.is_empty(), "{diags:?}");
    Grammar::new("T.g4", tree, root)
}

#[test]
fn eof_is_preregistered() {
    let g = grammar("grammar T; a : A ;");
    assert_eq!(g.token_type("EOF"), TOKEN_EOF);
    assert_eq!(g.max_token_type, TOKEN_INVALID_TYPE);
}

#[test]
fn token_types_start_at_min_user_type() {
    let mut g = grammar("grammar T; a : A ;");
    let a = g.define_token_name("A");
    let b = g.define_token_name("B");
    assert_eq!(a, MIN_USER_TOKEN_TYPE);
    assert_eq!(b, MIN_USER_TOKEN_TYPE + 1);

    // Redefinition returns the existing type.
    assert_eq!(g.define_token_name("A"), a);
    assert_eq!(g.max_token_type, b);

    // Forward and reverse maps agree.
    assert_eq!(g.type_to_token_name[a as usize].as_deref(), Some("A"));
    assert_eq!(g.token_type("A"), a);
}

#[test]
fn literal_aliasing() {
    let mut g = grammar("lexer grammar T; A : 'a' ;");
    let t = g.define_token_alias("IF", "'if'");
    assert_eq!(g.token_type("'if'"), t);
    assert_eq!(g.token_type("IF"), t);
    assert_eq!(g.token_display_name(t), "'if'");

    g.undefine_string_literal("'if'");
    assert_eq!(g.token_type("'if'"), TOKEN_INVALID_TYPE);
    // The symbolic name survives alias removal.
    assert_eq!(g.token_type("IF"), t);
    assert_eq!(g.token_display_name(t), "IF");
}

#[test]
fn rule_indices_follow_insertion_and_removal() {
    let mut g = grammar("grammar T; a : A ; b : B ; c : C ;");
    g.define_rule(Rule::new("a", g.root, 1)).unwrap();
    g.define_rule(Rule::new("b", g.root, 1)).unwrap();
    g.define_rule(Rule::new("c", g.root, 1)).unwrap();

    assert_eq!(g.rule("b").unwrap().index, 1);
    // Duplicate definition is rejected.
    assert!(g.define_rule(Rule::new("b", g.root, 1)).is_none());

    g.remove_rule("a");
    assert_eq!(g.rule("b").unwrap().index, 0);
    assert_eq!(g.rule("c").unwrap().index, 1);
    for (i, (_, r)) in g.rules.iter().enumerate() {
        assert_eq!(r.index, i);
    }
}

#[test]
fn channels_count_up_from_reserved() {
    let mut g = grammar("lexer grammar T; A : 'a' ;");
    let first = g.define_channel("COMMENTS");
    let second = g.define_channel("DIRECTIVES");
    assert_eq!(first, parsegen_core::MIN_USER_CHANNEL_VALUE);
    assert_eq!(second, first + 1);
    assert_eq!(g.define_channel("COMMENTS"), first);
    assert_eq!(g.channel_value("COMMENTS"), Some(first));
}

#[test]
fn import_vocab_preserves_types() {
    let mut lexer = grammar("lexer grammar L; A : 'a' ;");
    lexer.define_token_name("A");
    lexer.define_token_alias("B", "'b'");

    let mut parser = grammar("parser grammar P; s : A ;");
    parser.import_vocab(&lexer);
    assert_eq!(parser.token_type("A"), lexer.token_type("A"));
    assert_eq!(parser.token_type("'b'"), lexer.token_type("'b'"));
    assert_eq!(parser.max_token_type, lexer.max_token_type);
}

#[test]
fn attr_defs_parse_names_and_generics() {
    let pos = SrcPos::new(1, 0);
    let defs = parse_attr_defs("[int x, Map<String, int> table, float y = 1.0]", pos);
    let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["x", "table", "y"]);
    assert_eq!(defs[0].decl, "int x");

    assert!(parse_attr_defs("[]", pos).is_empty());
    assert!(parse_attr_defs("[ ]", pos).is_empty());
}
