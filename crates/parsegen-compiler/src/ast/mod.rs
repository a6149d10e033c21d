//! The grammar AST.
//!
//! Nodes live in an arena owned by [`Tree`] and reference each other by
//! [`NodeId`]. A node carries its kind, the token it came from, its ordered
//! children, a parent back-reference, and optional per-node options. The
//! transform pipeline edits the tree structurally; [`Tree::refresh_parents`]
//! restores the parent/child invariant after a batch of edits.

mod tree;

#[cfg(test)]
mod ast_tests;

pub use tree::{Node, NodeId, SrcToken, Tree};

use crate::diagnostics::SrcPos;
use parsegen_core::GrammarKind;

/// Kind tag of an AST node, with kind-specific payload where one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of a grammar file.
    GrammarRoot { kind: GrammarKind },

    // Prequel sections.
    /// `options { ... }` at grammar or rule level; children are `Opt`.
    Options,
    /// Single `name = value` entry; token is the name, child is the value.
    Opt,
    /// `tokens { ... }`; children are `TokenRef`.
    Tokens,
    /// `channels { ... }`; children are `Id`.
    Channels,
    /// `import a, b;`; children are `Id`.
    Import,
    /// `@scope::name { ... }`; children: optional scope `Id`, `Id`, `Action`.
    NamedAction,

    /// Bare identifier.
    Id,

    /// Container of the grammar's rules, before any `mode` section.
    Rules,
    /// `mode M;` section; token is the mode name, children are rules.
    Mode,
    /// Rule definition; token is the rule name.
    Rule { fragment: bool },
    /// `returns [..]`; child is `ArgAction`.
    Returns,
    /// `locals [..]`; child is `ArgAction`.
    Locals,

    /// Alternative block `a | b | c`; children are `Alt`.
    Block,
    /// One alternative; children are its elements in order.
    Alt { label: Option<String> },

    // EBNF suffixes. The single child is the suffixed element or block.
    Optional { greedy: bool },
    Star { greedy: bool },
    Plus { greedy: bool },

    // Atoms.
    /// Uppercase reference: a token (or EOF).
    TokenRef,
    /// Lowercase reference: a rule; optional `ArgAction` child carries call args.
    RuleRef,
    /// Quoted literal; token text keeps the quotes.
    StringLiteral,
    /// `'a'..'z'`; children are the two `StringLiteral` bounds.
    Range,
    /// `[a-z0-9]`; token text keeps the brackets.
    CharSet,
    /// `.`
    Wildcard,
    /// `~x`; child is the negated set element.
    Not,
    /// Set produced by block-set reduction; children are the merged terminals.
    Set,

    /// `x=e` or `x+=e`; token is the label name, child is the element.
    Label { list: bool },

    /// `{ ... }` action; token text keeps the braces.
    Action,
    /// `{ ... }?` semantic predicate.
    Predicate,
    /// Precedence guard inserted by left-recursion elimination.
    PrecPredicate { precedence: u32 },
    /// `[ ... ]` argument action (rule parameters or call arguments).
    ArgAction,

    /// Commands after `->`; children are `LexerCommand`.
    LexerCommands,
    /// Single command; token is the command name, optional child its argument.
    LexerCommand,
}

impl NodeKind {
    /// True for nodes that can appear as an element of an alternative.
    pub fn is_element(&self) -> bool {
        matches!(
            self,
            NodeKind::Block
                | NodeKind::Optional { .. }
                | NodeKind::Star { .. }
                | NodeKind::Plus { .. }
                | NodeKind::TokenRef
                | NodeKind::RuleRef
                | NodeKind::StringLiteral
                | NodeKind::Range
                | NodeKind::CharSet
                | NodeKind::Wildcard
                | NodeKind::Not
                | NodeKind::Set
                | NodeKind::Label { .. }
                | NodeKind::Action
                | NodeKind::Predicate
                | NodeKind::PrecPredicate { .. }
        )
    }

    /// Terminal atoms eligible for block-set reduction.
    pub fn is_set_element(&self) -> bool {
        matches!(
            self,
            NodeKind::TokenRef | NodeKind::StringLiteral | NodeKind::Range | NodeKind::CharSet
        )
    }
}

impl Node {
    pub fn pos(&self) -> SrcPos {
        SrcPos::new(self.token.line, self.token.col)
    }
}
