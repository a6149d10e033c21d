use super::lexer::{lex, TokKind};

fn kinds(src: &str) -> Vec<TokKind> {
    lex(src).into_iter().map(|t| t.kind).collect()
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("lexer grammar L;"),
        vec![TokKind::KwLexer, TokKind::KwGrammar, TokKind::Id, TokKind::Semi]
    );
    // Prefixes of keywords are plain identifiers.
    assert_eq!(kinds("grammars"), vec![TokKind::Id]);
    assert_eq!(kinds("lexers"), vec![TokKind::Id]);
}

#[test]
fn comments_are_skipped() {
    assert_eq!(
        kinds("a // line comment\n/* block\ncomment */ b"),
        vec![TokKind::Id, TokKind::Id]
    );
    assert_eq!(kinds("/* tricky **/ x"), vec![TokKind::Id]);
}

#[test]
fn operators_lex_longest_match() {
    assert_eq!(
        kinds("-> .. . += + = :: :"),
        vec![
            TokKind::Arrow,
            TokKind::DotDot,
            TokKind::Dot,
            TokKind::PlusAssign,
            TokKind::Plus,
            TokKind::Assign,
            TokKind::ColonColon,
            TokKind::Colon
        ]
    );
}

#[test]
fn string_literals_and_escapes() {
    let toks = lex(r"'a' '\'' '\\' 'if'");
    assert_eq!(toks.len(), 4);
    assert!(toks.iter().all(|t| t.kind == TokKind::StrLit));
}

#[test]
fn charset_keeps_brackets_and_escapes() {
    let src = r"[a-z\]] [0-9]";
    let toks = lex(src);
    assert_eq!(toks.len(), 2);
    assert_eq!(toks[0].kind, TokKind::BracketBlock);
    assert_eq!(toks[0].text(src), r"[a-z\]]");
}

#[test]
fn action_blocks_balance_braces() {
    let src = "{ if (x) { y(); } } next";
    let toks = lex(src);
    assert_eq!(toks[0].kind, TokKind::ActionBlock);
    assert_eq!(toks[0].text(src), "{ if (x) { y(); } }");
    assert_eq!(toks[1].kind, TokKind::Id);
}

#[test]
fn action_blocks_skip_strings_and_comments() {
    let src = "{ s = \"}\"; // }\n c = '}'; /* } */ }";
    let toks = lex(src);
    assert_eq!(toks.len(), 1);
    assert_eq!(toks[0].kind, TokKind::ActionBlock);
}

#[test]
fn garbage_coalesces() {
    let toks = lex("a \u{1}\u{2}\u{3} b");
    let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![TokKind::Id, TokKind::Garbage, TokKind::Id]);
}

#[test]
fn positions_are_line_and_column() {
    let src = "grammar T;\nfoo : A ;";
    let toks = lex(src);
    let foo = toks.iter().find(|t| t.text(src) == "foo").unwrap();
    assert_eq!((foo.line, foo.col), (2, 0));
    let a = toks.iter().find(|t| t.text(src) == "A").unwrap();
    assert_eq!((a.line, a.col), (2, 6));
}
