//! jwfmt decides where line breaks, indentation and column alignment go
//! in Java-like source: an external parser supplies the AST and token
//! stream, the engine annotates tokens with wrap policies, resolves them
//! against the width limit, and emits a text-edit set.

pub mod ast;
pub mod config;
pub mod error;
mod fmt;
mod oper;
pub mod token;

#[cfg(test)]
mod test;

pub use config::{BracePosition, FormatOptions, ParenPosition, SplitStyle};
pub use error::ConfigError;
pub use fmt::{apply_edits, FormatResult, Overflow, TextEdit};
pub use token::{Region, Span, Token, TokenKind, TokenStore, WrapMode, WrapPolicy};

/// Formats one token stream. The store is consumed; no state survives
/// the invocation. Passing no regions formats the whole stream.
pub fn format(
    source: &str,
    root: &ast::Node,
    store: TokenStore,
    options: &FormatOptions,
    regions: &[Region],
) -> FormatResult {
    fmt::format(source, root, store, options, regions)
}
