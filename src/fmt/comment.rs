//! The comment wrap executor: reflows comment text to the width budget
//! using the code indentation the wrap executor settled on. Tag lines
//! always start fresh; no-format runs are never split.

use super::wrap::advance_column;
use crate::{
    config::FormatOptions,
    token::{TokenKind, TokenStore},
};

/// Floor for the usable text width of deeply indented comments.
const MIN_TEXT_WIDTH: usize = 10;

pub(crate) fn wrap_comments(store: &mut TokenStore, options: &FormatOptions) {
    let mut col = 0;
    for i in 0..store.len() {
        let token = &store[i];
        let start_col = if token.breaks_before > 0 {
            token.indent
        } else if i == 0 {
            0
        } else {
            col + token.pad
        };
        if !token.format_off && token.internal.is_some() {
            let reflowed = match token.kind {
                TokenKind::LineComment if options.format_line_comments => {
                    reflow_line_comment(store, i, start_col, options)
                }
                TokenKind::BlockComment | TokenKind::DocComment => {
                    Some(reflow_block_comment(store, i, start_col, options))
                }
                _ => None,
            };
            if let Some(text) = reflowed {
                store[i].text = text;
            }
        }
        col = advance_column(start_col, &store[i]);
    }
}

fn budget(base: usize, prefix_len: usize, options: &FormatOptions) -> usize {
    options
        .max_line_width
        .saturating_sub(base + prefix_len)
        .max(MIN_TEXT_WIDTH)
}

fn reflow_line_comment(
    store: &TokenStore,
    index: usize,
    base: usize,
    options: &FormatOptions,
) -> Option<String> {
    let internal = store[index].internal.as_ref()?;
    let words: Vec<&str> = internal.iter().map(|t| t.text.as_str()).collect();
    let lines = fill(&words, budget(base, 3, options));
    let sep = format!("\n{}// ", " ".repeat(base));
    let text = format!("// {}", lines.join(&sep));
    (text != store[index].text).then_some(text)
}

fn reflow_block_comment(
    store: &TokenStore,
    index: usize,
    base: usize,
    options: &FormatOptions,
) -> String {
    let token = &store[index];
    let internal = token.internal.as_ref().expect("comment has content");
    let opener = if token.kind == TokenKind::DocComment {
        "/**"
    } else {
        "/*"
    };

    if token.kind == TokenKind::BlockComment && collapses(store, index) {
        let words: Vec<&str> = internal.iter().map(|t| t.text.as_str()).collect();
        let inline = format!("/* {} */", words.join(" "));
        if base + inline.chars().count() <= options.max_line_width {
            return inline;
        }
    }

    let width = budget(base, 3, options);
    let mut lines: Vec<String> = vec![];
    let mut current = String::new();
    for word in internal.iter() {
        let verbatim = word.kind == TokenKind::NoFormatRun && !word.text.starts_with("{@");
        if word.original_breaks >= 2 {
            flush(&mut lines, &mut current);
            lines.push(String::new());
        }
        if verbatim || word.kind == TokenKind::Tag {
            flush(&mut lines, &mut current);
        }
        if verbatim {
            lines.push(word.text.clone());
            continue;
        }
        if current.is_empty() {
            current = word.text.clone();
        } else if current.chars().count() + 1 + word.text.chars().count() <= width {
            current.push(' ');
            current.push_str(&word.text);
        } else {
            flush(&mut lines, &mut current);
            current = word.text.clone();
        }
    }
    flush(&mut lines, &mut current);

    let margin = " ".repeat(base + 1);
    let mut text = String::from(opener);
    for line in &lines {
        text.push('\n');
        text.push_str(&margin);
        text.push('*');
        if !line.is_empty() {
            text.push(' ');
            text.push_str(line);
        }
    }
    text.push('\n');
    text.push_str(&margin);
    text.push_str("*/");
    text
}

/// A block comment may collapse to one line: no tags, no paragraph
/// breaks, no verbatim runs.
fn collapses(store: &TokenStore, index: usize) -> bool {
    let internal = store[index].internal.as_ref().expect("comment has content");
    internal.iter().enumerate().all(|(i, t)| {
        t.kind == TokenKind::Word && (i == 0 || t.original_breaks < 2)
    })
}

fn flush(lines: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        lines.push(std::mem::take(current));
    }
}

/// Greedy fill of words into lines of at most `width` columns.
fn fill(words: &[&str], width: usize) -> Vec<String> {
    let mut lines = vec![];
    let mut current = String::new();
    for word in words {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    flush(&mut lines, &mut current);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Span, Token};

    fn comment_store(kind: TokenKind, text: &str) -> TokenStore {
        let token = Token::comment(kind, text, Span::new(0, text.len()));
        TokenStore::build(text, vec![token])
    }

    fn narrow(width: usize) -> FormatOptions {
        FormatOptions {
            max_line_width: width,
            ..FormatOptions::default()
        }
    }

    #[test]
    fn long_block_comment_is_reflowed() {
        let mut store = comment_store(
            TokenKind::BlockComment,
            "/* the quick brown fox jumps over the lazy dog near the river bank */",
        );
        wrap_comments(&mut store, &narrow(30));
        assert_eq!(
            store[0].text,
            "/*\n * the quick brown fox jumps\n * over the lazy dog near the\n * river bank\n */"
        );
    }

    #[test]
    fn short_block_comment_collapses() {
        let mut store = comment_store(TokenKind::BlockComment, "/*\n * short note\n */");
        wrap_comments(&mut store, &narrow(40));
        assert_eq!(store[0].text, "/* short note */");
    }

    #[test]
    fn tag_always_starts_a_line() {
        // Plenty of room on the first line; the tag still starts fresh.
        let mut store = comment_store(
            TokenKind::DocComment,
            "/** Returns the result.\n * @param x the input\n */",
        );
        wrap_comments(&mut store, &narrow(60));
        assert_eq!(
            store[0].text,
            "/**\n * Returns the result.\n * @param x the input\n */"
        );
    }

    #[test]
    fn inline_code_run_is_never_split() {
        let mut store = comment_store(
            TokenKind::DocComment,
            "/** prefer {@code first.compose(second)} over nesting */",
        );
        wrap_comments(&mut store, &narrow(30));
        let text = &store[0].text;
        assert!(text
            .lines()
            .any(|line| line.ends_with("{@code first.compose(second)}")));
    }

    #[test]
    fn paragraph_break_is_preserved() {
        let mut store = comment_store(TokenKind::DocComment, "/** one\n *\n * two */");
        wrap_comments(&mut store, &narrow(40));
        assert_eq!(store[0].text, "/**\n * one\n *\n * two\n */");
    }

    #[test]
    fn pre_block_lines_stay_verbatim() {
        let mut store = comment_store(
            TokenKind::DocComment,
            "/** Example:\n * <pre>\n * a.b(  1,   2 )\n * </pre>\n */",
        );
        wrap_comments(&mut store, &narrow(80));
        assert_eq!(
            store[0].text,
            "/**\n * Example:\n * <pre>\n * a.b(  1,   2 )\n * </pre>\n */"
        );
    }
}
