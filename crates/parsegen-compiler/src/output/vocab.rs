//! `.tokens` vocab file emission.

use std::fmt::Write;

use crate::grammar::Grammar;

/// Render the token vocabulary: `NAME=type` lines for symbolic tokens,
/// then `'literal'=type` lines for literal aliases.
pub fn write_vocab_file(g: &Grammar) -> String {
    let (names, literals) = g.token_vocab_entries();
    let mut out = String::new();
    for (name, ttype) in names {
        writeln!(out, "{name}={ttype}").expect("String write never fails");
    }
    for (literal, ttype) in literals {
        writeln!(out, "{literal}={ttype}").expect("String write never fails");
    }
    out
}
