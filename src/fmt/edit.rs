//! Edit extraction: renders every inter-token gap from the final break,
//! indent and spacing state, diffs it against the original source, and
//! emits the minimal ordered edit set.

use crate::{config::FormatOptions, token::TokenStore};

/// A replacement relative to the original source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub offset: usize,
    pub length: usize,
    pub text: String,
}

/// Applies an ordered, non-overlapping edit set to the source.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pos = 0;
    for edit in edits {
        out.push_str(&source[pos..edit.offset]);
        out.push_str(&edit.text);
        pos = edit.offset + edit.length;
    }
    out.push_str(&source[pos..]);
    out
}

pub(crate) fn extract(
    source: &str,
    store: &TokenStore,
    options: &FormatOptions,
) -> Vec<TextEdit> {
    let mut edits = vec![];
    if store.is_empty() {
        return edits;
    }
    let mut prev_end = 0;
    let mut prev_off = false;
    for i in 0..store.len() {
        let token = &store[i];
        // Gaps touching an unformatted token keep their original text.
        if !token.format_off && !(i > 0 && prev_off) {
            let original = &source[prev_end..token.span.start];
            let desired = if i == 0 {
                String::new()
            } else if token.breaks_before > 0 {
                let mut gap = "\n".repeat(token.breaks_before);
                gap.push_str(&" ".repeat(token.indent));
                gap
            } else {
                " ".repeat(token.pad)
            };
            if original != desired {
                edits.push(TextEdit {
                    offset: prev_end,
                    length: token.span.start - prev_end,
                    text: desired,
                });
            }
        }
        if !token.format_off && token.text != source[token.span.start..token.span.end] {
            edits.push(TextEdit {
                offset: token.span.start,
                length: token.span.end - token.span.start,
                text: token.text.clone(),
            });
        }
        prev_end = token.span.end;
        prev_off = token.format_off;
    }
    if !prev_off {
        let trailing = &source[prev_end..];
        let desired = if options.insert_new_line_at_end_of_file_if_missing {
            "\n"
        } else {
            ""
        };
        if trailing != desired {
            edits.push(TextEdit {
                offset: prev_end,
                length: source.len() - prev_end,
                text: desired.to_string(),
            });
        }
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_apply_in_order() {
        let source = "aa  bb cc";
        let edits = vec![
            TextEdit {
                offset: 2,
                length: 2,
                text: " ".to_string(),
            },
            TextEdit {
                offset: 6,
                length: 1,
                text: "\n".to_string(),
            },
        ];
        assert_eq!(apply_edits(source, &edits), "aa bb\ncc");
    }

    #[test]
    fn empty_edit_set_is_identity() {
        assert_eq!(apply_edits("x y z", &[]), "x y z");
    }
}
