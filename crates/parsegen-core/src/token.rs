//! Reserved token types, channels, and character bounds.

/// Token type 0 is never assigned to user tokens.
pub const TOKEN_INVALID_TYPE: i32 = 0;

/// End-of-file sentinel. Also a legal member of lookahead sets.
pub const TOKEN_EOF: i32 = -1;

/// Epsilon pseudo-token used only inside the analysis passes.
pub const TOKEN_EPSILON: i32 = -2;

/// First token type available to user grammars.
pub const MIN_USER_TOKEN_TYPE: i32 = 1;

pub const MIN_CHAR_VALUE: i32 = 0x0000;
pub const MAX_CHAR_VALUE: i32 = 0x10FFFF;

/// Channel tokens are emitted on unless a lexer command says otherwise.
pub const DEFAULT_TOKEN_CHANNEL: i32 = 0;

/// Channel conventionally used for whitespace and comments.
pub const HIDDEN_CHANNEL: i32 = 1;

/// First channel value available to `channels { ... }` declarations.
pub const MIN_USER_CHANNEL_VALUE: i32 = 2;

/// Names a grammar may not reuse for rules, modes, or channels.
pub const COMMON_CONSTANTS: &[&str] = &[
    "HIDDEN",
    "SKIP",
    "MORE",
    "EOF",
    "DEFAULT_TOKEN_CHANNEL",
    "DEFAULT_MODE",
    "MAX_CHAR_VALUE",
    "MIN_CHAR_VALUE",
];
