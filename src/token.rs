//! The token store: an ordered, randomly-indexable arena of lexical tokens
//! with mutable formatting attributes. Integer indexes are the only
//! cross-references between tokens; block and doc comments carry their own
//! nested store of words and tags.

use std::ops::{Index, IndexMut};

/// Byte range in the original source, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub(crate) fn empty() -> Self {
        Self { start: 0, end: 0 }
    }
}

/// A caller-supplied sub-range of the source restricting formatting.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub offset: usize,
    pub length: usize,
}

impl Region {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    fn contains(&self, span: &Span) -> bool {
        self.offset <= span.start && span.end <= self.offset + self.length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Operator,
    Punct,
    Literal,
    LineComment,
    BlockComment,
    DocComment,
    /// A word inside a comment's nested store.
    Word,
    /// A `@tag` word starting a documentation tag line.
    Tag,
    /// A run of comment text that must never be split (`{@code ...}`,
    /// `<pre>` lines).
    NoFormatRun,
}

impl TokenKind {
    pub fn is_comment(&self) -> bool {
        matches!(
            self,
            Self::LineComment | Self::BlockComment | Self::DocComment
        )
    }
}

/// Enforcement strength of a wrap policy. Variant order is the conflict
/// total order: a policy may only be overwritten by an equal-or-higher
/// variant, and `Disabled` is never overwritten once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WrapMode {
    /// Never break here. Marks malformed or format-off ranges.
    Disabled,
    /// Break implied by a parent construct; fires only when another
    /// member of the same group breaks, and takes structural indent.
    BlockIndent,
    /// Break only if required to satisfy the width.
    WhereNecessary,
    /// Break preferentially over `WhereNecessary` sites, and together
    /// with every other `TopPriority` site of the same group.
    TopPriority,
    /// Always break.
    Force,
}

/// Per-token record describing whether and how a line break may occur
/// before the token.
#[derive(Debug, Clone, Copy)]
pub struct WrapPolicy {
    pub mode: WrapMode,
    /// Anchor token whose line defines the indentation base.
    pub parent: usize,
    /// Last token of the wrap group, inclusive.
    pub group_end: usize,
    /// Additional indentation units on top of the computed base.
    pub extra_indent: usize,
    /// Nesting level of the construct that emitted the policy.
    pub depth: usize,
    /// Cost of breaking here; the solver minimizes the total.
    pub penalty: f32,
    pub is_first: bool,
    /// Indent to the column right after the parent token instead of by
    /// indentation units.
    pub indent_on_column: bool,
}

impl WrapPolicy {
    pub(crate) fn disabled() -> Self {
        Self {
            mode: WrapMode::Disabled,
            parent: 0,
            group_end: usize::MAX,
            extra_indent: 0,
            depth: 0,
            penalty: 0.0,
            is_first: false,
            indent_on_column: false,
        }
    }

    pub(crate) fn same_group(&self, other: &WrapPolicy) -> bool {
        self.parent == other.parent && self.group_end == other.group_end
    }
}

#[derive(Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// Canonical spaces before this token when no break fires.
    pub spaces_before: usize,
    /// Final spacing decided by the wrap executor: `spaces_before` plus
    /// any alignment padding.
    pub pad: usize,
    /// Line breaks before this token in the original source.
    pub original_breaks: usize,
    /// Final break decision; written by the wrap executor.
    pub breaks_before: usize,
    /// Indentation in spaces, meaningful when `breaks_before > 0`.
    pub indent: usize,
    /// Column alignment requested by the aligner.
    pub align: Option<usize>,
    pub wrap: Option<WrapPolicy>,
    /// Excluded from formatting (outside all regions, or malformed).
    pub format_off: bool,
    /// Uniform reindentation delta for breaks preserved inside a
    /// construct that forces continuous reindentation.
    pub indent_delta: isize,
    /// Nested store for block/doc comment content.
    pub internal: Option<TokenStore>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            spaces_before: 0,
            pad: 0,
            original_breaks: 0,
            breaks_before: 0,
            indent: 0,
            align: None,
            wrap: None,
            format_off: false,
            indent_delta: 0,
            internal: None,
        }
    }

    /// A comment token with its content split into a nested store of
    /// words, tags and no-format runs.
    pub fn comment(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        let text = text.into();
        let internal = comment_store(kind, &text);
        let mut token = Self::new(kind, text, span);
        token.internal = internal;
        token
    }
}

#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: Vec<Token>,
    line_starts: Vec<usize>,
}

impl TokenStore {
    pub fn build(source: &str, tokens: Vec<Token>) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            tokens,
            line_starts,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Line and column of a byte offset in the original source.
    pub(crate) fn original_line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line, offset - self.line_starts[line])
    }

    /// Original column of a token's first byte.
    pub(crate) fn original_column(&self, index: usize) -> usize {
        self.original_line_col(self.tokens[index].span.start).1
    }

    /// Attaches a wrap policy, honoring the conflict total order:
    /// Force > TopPriority > WhereNecessary > BlockIndent > Disabled.
    /// An equal-or-higher mode overwrites; a lower mode is dropped,
    /// except that meeting an existing `TopPriority` policy widens its
    /// group end instead. `Disabled` is never replaced.
    pub(crate) fn set_policy(&mut self, index: usize, policy: WrapPolicy) {
        if policy.parent >= index || policy.group_end < index {
            let token = &self.tokens[index];
            panic!(
                "wrap group out of order at token {} ({:?} {:?}): parent {}, group end {}",
                index, token.kind, token.span, policy.parent, policy.group_end
            );
        }
        if self.tokens[index].format_off {
            return;
        }
        let Some(existing) = self.tokens[index].wrap else {
            self.tokens[index].wrap = Some(policy);
            return;
        };
        if existing.mode == WrapMode::Disabled {
            return;
        }
        if policy.mode >= existing.mode {
            self.tokens[index].wrap = Some(policy);
        } else if existing.mode == WrapMode::TopPriority && policy.group_end > existing.group_end {
            // Every member must widen so the group keeps firing together
            // under the solver's (parent, group end) key.
            let last = existing.group_end.min(self.tokens.len() - 1);
            for token in &mut self.tokens[existing.parent + 1..=last] {
                if let Some(wrap) = &mut token.wrap {
                    if wrap.same_group(&existing) {
                        wrap.group_end = policy.group_end;
                    }
                }
            }
        }
    }

    /// Disables formatting for an inclusive token range (malformed
    /// subtrees).
    pub(crate) fn disable_range(&mut self, start: usize, end: usize) {
        for token in &mut self.tokens[start..=end] {
            token.format_off = true;
            token.wrap = Some(WrapPolicy::disabled());
        }
    }

    /// Marks every token not fully contained in some region as
    /// format-off. No regions means the whole stream is in scope.
    pub(crate) fn apply_regions(&mut self, regions: &[Region]) {
        if regions.is_empty() {
            return;
        }
        for token in &mut self.tokens {
            if !regions.iter().any(|r| r.contains(&token.span)) {
                token.format_off = true;
            }
        }
    }

    /// True when the whole inclusive token range takes part in
    /// formatting.
    pub(crate) fn range_enabled(&self, start: usize, end: usize) -> bool {
        self.tokens[start..=end].iter().all(|t| !t.format_off)
    }
}

impl Index<usize> for TokenStore {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl IndexMut<usize> for TokenStore {
    fn index_mut(&mut self, index: usize) -> &mut Token {
        &mut self.tokens[index]
    }
}

/// Splits comment text into the nested word/tag store used by the
/// comment wrap executor. Returns `None` for comments with no content.
fn comment_store(kind: TokenKind, text: &str) -> Option<TokenStore> {
    let body = match kind {
        TokenKind::LineComment => text.strip_prefix("//").unwrap_or(text),
        TokenKind::BlockComment => text
            .strip_prefix("/*")
            .and_then(|t| t.strip_suffix("*/"))
            .unwrap_or(text),
        TokenKind::DocComment => text
            .strip_prefix("/**")
            .and_then(|t| t.strip_suffix("*/"))
            .unwrap_or(text),
        _ => return None,
    };

    let mut tokens: Vec<Token> = vec![];
    let mut pending_breaks = 0;
    let mut in_pre = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        let content = match trimmed.strip_prefix('*') {
            Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
            None => trimmed,
        };
        if in_pre || content.contains("<pre>") {
            let verbatim = content.trim_end();
            if !verbatim.is_empty() {
                push_comment_token(
                    &mut tokens,
                    Token::new(TokenKind::NoFormatRun, verbatim, Span::empty()),
                    &mut pending_breaks,
                );
            }
            in_pre = !content.contains("</pre>") && (in_pre || content.contains("<pre>"));
            pending_breaks += 1;
            continue;
        }
        if content.trim().is_empty() {
            pending_breaks += 1;
            continue;
        }
        let mut first_in_line = true;
        let mut rest = content.trim();
        while !rest.is_empty() {
            let token = if let Some(inline) = rest.strip_prefix("{@") {
                // An inline `{@code ...}` run stays unsplit up to its
                // closing brace.
                let close = inline.find('}').map(|i| i + 3).unwrap_or(rest.len());
                let (run, tail) = rest.split_at(close);
                rest = tail.trim_start();
                Token::new(TokenKind::NoFormatRun, run, Span::empty())
            } else {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                let (word, tail) = rest.split_at(end);
                rest = tail.trim_start();
                let word_kind =
                    if first_in_line && word.starts_with('@') && kind == TokenKind::DocComment {
                        TokenKind::Tag
                    } else {
                        TokenKind::Word
                    };
                Token::new(word_kind, word, Span::empty())
            };
            first_in_line = false;
            push_comment_token(&mut tokens, token, &mut pending_breaks);
        }
        pending_breaks = 1;
    }
    if tokens.is_empty() {
        return None;
    }
    Some(TokenStore {
        tokens,
        line_starts: vec![0],
    })
}

fn push_comment_token(tokens: &mut Vec<Token>, mut token: Token, pending_breaks: &mut usize) {
    token.original_breaks = *pending_breaks;
    token.spaces_before = if tokens.is_empty() || *pending_breaks > 0 {
        0
    } else {
        1
    };
    if tokens.is_empty() {
        token.original_breaks = 0;
    }
    tokens.push(token);
    *pending_breaks = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(mode: WrapMode, parent: usize, group_end: usize) -> WrapPolicy {
        WrapPolicy {
            mode,
            parent,
            group_end,
            extra_indent: 0,
            depth: 0,
            penalty: 1.0,
            is_first: true,
            indent_on_column: false,
        }
    }

    fn store_of(n: usize) -> TokenStore {
        let tokens = (0..n)
            .map(|i| {
                Token::new(
                    TokenKind::Identifier,
                    "x",
                    Span::new(i * 2, i * 2 + 1),
                )
            })
            .collect();
        TokenStore::build(&"x ".repeat(n), tokens)
    }

    #[test]
    fn higher_mode_overwrites_lower() {
        let mut store = store_of(4);
        store.set_policy(2, policy(WrapMode::WhereNecessary, 0, 3));
        store.set_policy(2, policy(WrapMode::Force, 1, 3));
        assert_eq!(store[2].wrap.unwrap().mode, WrapMode::Force);
        assert_eq!(store[2].wrap.unwrap().parent, 1);
    }

    #[test]
    fn lower_mode_is_dropped() {
        let mut store = store_of(4);
        store.set_policy(2, policy(WrapMode::Force, 0, 3));
        store.set_policy(2, policy(WrapMode::WhereNecessary, 1, 3));
        assert_eq!(store[2].wrap.unwrap().mode, WrapMode::Force);
        assert_eq!(store[2].wrap.unwrap().parent, 0);
    }

    #[test]
    fn lower_mode_widens_top_priority_group() {
        let mut store = store_of(6);
        store.set_policy(2, policy(WrapMode::TopPriority, 0, 3));
        store.set_policy(3, policy(WrapMode::TopPriority, 0, 3));
        store.set_policy(2, policy(WrapMode::WhereNecessary, 1, 5));
        let wrap = store[2].wrap.unwrap();
        assert_eq!(wrap.mode, WrapMode::TopPriority);
        assert_eq!(wrap.group_end, 5);
        // Sibling members widen too, keeping the shared group key.
        assert_eq!(store[3].wrap.unwrap().group_end, 5);
        assert_eq!(store[3].wrap.unwrap().parent, 0);
    }

    #[test]
    fn disabled_is_never_replaced() {
        let mut store = store_of(4);
        store.disable_range(1, 2);
        store.set_policy(2, policy(WrapMode::Force, 0, 3));
        assert_eq!(store[2].wrap.unwrap().mode, WrapMode::Disabled);
    }

    #[test]
    #[should_panic(expected = "wrap group out of order")]
    fn out_of_order_group_fails_fast() {
        let mut store = store_of(4);
        store.set_policy(1, policy(WrapMode::Force, 2, 3));
    }

    #[test]
    fn doc_comment_words_and_tags() {
        let token = Token::comment(
            TokenKind::DocComment,
            "/** Returns a value.\n * @param x the input\n */",
            Span::new(0, 46),
        );
        let store = token.internal.unwrap();
        let kinds: Vec<_> = store.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Tag,
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Word,
            ]
        );
        assert_eq!(store[3].text, "@param");
        assert_eq!(store[3].original_breaks, 1);
    }

    #[test]
    fn inline_code_run_stays_whole() {
        let token = Token::comment(
            TokenKind::DocComment,
            "/** Use {@code a + b} here. */",
            Span::new(0, 30),
        );
        let store = token.internal.unwrap();
        let texts: Vec<_> = store.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Use", "{@code a + b}", "here."]);
        assert_eq!(store[1].kind, TokenKind::NoFormatRun);
    }

    #[test]
    fn blank_comment_line_keeps_paragraph_break() {
        let token = Token::comment(
            TokenKind::BlockComment,
            "/* one\n *\n * two\n */",
            Span::new(0, 20),
        );
        let store = token.internal.unwrap();
        assert_eq!(store[1].text, "two");
        assert_eq!(store[1].original_breaks, 2);
    }

    #[test]
    fn region_containment_marks_tokens_off() {
        let mut store = store_of(4);
        store.apply_regions(&[Region::new(2, 3)]);
        assert!(store[0].format_off);
        assert!(!store[1].format_off);
        assert!(!store[2].format_off);
        assert!(store[3].format_off);
        assert!(!store.range_enabled(0, 3));
        assert!(store.range_enabled(1, 2));
    }
}
