//! Lexer for the grammar surface syntax.
//!
//! Produces span-based tokens; text is sliced from the source when the
//! parser materializes AST nodes. Brace-delimited actions are matched with
//! a callback that balances nested braces and skips strings and comments,
//! so `{ if (x) { y(); } }` is one token.

use logos::{Lexer, Logos};

/// Token kinds of the grammar language.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum TokKind {
    #[token("lexer")]
    KwLexer,
    #[token("parser")]
    KwParser,
    #[token("grammar")]
    KwGrammar,
    #[token("options")]
    KwOptions,
    #[token("tokens")]
    KwTokens,
    #[token("channels")]
    KwChannels,
    #[token("import")]
    KwImport,
    #[token("fragment")]
    KwFragment,
    #[token("mode")]
    KwMode,
    #[token("returns")]
    KwReturns,
    #[token("locals")]
    KwLocals,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Id,
    #[regex(r"[0-9]+")]
    Int,

    /// `'...'` with backslash escapes.
    #[regex(r"'(?:\\.|[^'\\\n])*'")]
    StrLit,
    /// `[...]` with backslash escapes: char sets and argument actions.
    #[regex(r"\[(?:\\.|[^\]\\])*\]")]
    BracketBlock,
    /// `{...}` balanced action text.
    #[token("{", lex_action)]
    ActionBlock,

    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token(";")]
    Semi,
    #[token("|")]
    Pipe,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("->")]
    Arrow,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("+=")]
    PlusAssign,
    #[token("=")]
    Assign,
    #[token("~")]
    Tilde,
    #[token(",")]
    Comma,
    #[token("@")]
    At,
    #[token("#")]
    Pound,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    /// Run of characters the lexer could not match.
    Garbage,
}

/// Consume a balanced `{...}` block. The opening brace is already matched;
/// skip strings, chars, and comments while counting depth.
fn lex_action(lex: &mut Lexer<'_, TokKind>) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    lex.bump(i + 1);
                    return true;
                }
            }
            q @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    false
}

/// A lexed token: kind plus source span and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tok {
    pub kind: TokKind,
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub col: u32,
}

impl Tok {
    pub fn text<'s>(&self, src: &'s str) -> &'s str {
        &src[self.start..self.end]
    }
}

/// Tokenize source. Consecutive unmatched characters coalesce into single
/// `Garbage` tokens so malformed input yields one error, not one per byte.
pub fn lex(src: &str) -> Vec<Tok> {
    let line_starts = line_starts(src);
    let pos_of = |offset: usize| -> (u32, u32) {
        let line = line_starts.partition_point(|&s| s <= offset);
        let col = offset - line_starts[line - 1];
        (line as u32, col as u32)
    };

    let mut tokens = Vec::new();
    let mut lexer = TokKind::lexer(src);
    let mut garbage_start: Option<usize> = None;

    let flush_garbage = |tokens: &mut Vec<Tok>, start: Option<usize>, end: usize| {
        if let Some(start) = start {
            let (line, col) = pos_of(start);
            tokens.push(Tok {
                kind: TokKind::Garbage,
                start,
                end,
                line,
                col,
            });
        }
    };

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => {
                flush_garbage(&mut tokens, garbage_start.take(), span.start);
                let (line, col) = pos_of(span.start);
                tokens.push(Tok {
                    kind,
                    start: span.start,
                    end: span.end,
                    line,
                    col,
                });
            }
            Err(()) => {
                garbage_start.get_or_insert(span.start);
            }
        }
    }
    flush_garbage(&mut tokens, garbage_start.take(), src.len());

    tokens
}

/// Tokenize a sub-range of `src`, keeping spans and positions absolute.
///
/// Used to parse the interior of `options {...}` / `tokens {...}` blocks,
/// which the main lexer captures as single balanced-brace tokens.
pub(crate) fn lex_slice(src: &str, start: usize, end: usize) -> Vec<Tok> {
    let line_starts = line_starts(src);
    lex(&src[start..end])
        .into_iter()
        .map(|t| {
            let abs_start = t.start + start;
            let line = line_starts.partition_point(|&s| s <= abs_start);
            let col = abs_start - line_starts[line - 1];
            Tok {
                kind: t.kind,
                start: abs_start,
                end: t.end + start,
                line: line as u32,
                col: col as u32,
            }
        })
        .collect()
}

fn line_starts(src: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in src.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}
