//! Raw token definition.
//!
//! The `RawToken` enum is the logos-derived tokenizer output before keyword
//! resolution and numeric cooking.

use logos::Logos;

/// Raw token from logos (before cooking).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum RawToken {
    /// `#` starts a line comment; discarded by the cooking loop.
    #[regex(r"#[^\n]*", priority = 4)]
    LineComment,

    /// `[A-Za-z][A-Za-z0-9]*`. Keywords are resolved from the lexeme later.
    #[regex(r"[A-Za-z][A-Za-z0-9]*", priority = 3)]
    Ident,

    /// `[0-9.]+`, greedily. More than one dot is allowed here; the cooking
    /// layer decides what the lexeme is worth.
    #[regex(r"[0-9.]+", priority = 3)]
    Number,

    /// Any other printable ASCII character, one at a time.
    #[regex(r"[!-~]", priority = 1)]
    Punct,
}
