//! The wrap executor: a left-to-right line-fitting solver. Structural
//! breaks fire immediately; when a projected column exceeds the width
//! limit the best unresolved candidate in scope is chosen by mode rank,
//! then lowest penalty, then nearness to the overflow, and the scan
//! resumes from the fired break.

use crate::{
    config::FormatOptions,
    token::{TokenKind, TokenStore, WrapMode, WrapPolicy},
};
use log::debug;

/// A line that could not be brought under the width limit because no
/// legal break exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    /// Byte offset of the token crossing the limit.
    pub offset: usize,
    /// Column the line reached.
    pub column: usize,
}

pub(crate) fn execute(store: &mut TokenStore, options: &FormatOptions) -> Vec<Overflow> {
    if store.is_empty() {
        return vec![];
    }
    let len = store.len();
    Solver {
        store,
        options,
        end_col: vec![0; len],
        line_indent: vec![0; len],
        forced: vec![false; len],
        fired_groups: vec![],
        overflows: vec![],
    }
    .run()
}

struct Solver<'a> {
    store: &'a mut TokenStore,
    options: &'a FormatOptions,
    /// Column after each processed token.
    end_col: Vec<usize>,
    /// Indent of the line each processed token sits on.
    line_indent: Vec<usize>,
    /// Candidates fired by overflow resolution.
    forced: Vec<bool>,
    fired_groups: Vec<(usize, usize)>,
    overflows: Vec<Overflow>,
}

impl Solver<'_> {
    fn run(mut self) -> Vec<Overflow> {
        let len = self.store.len();
        let mut i = 0;
        let mut line_start = 0;
        let mut cur_indent = 0;
        let mut col = 0;
        let mut reported_line = usize::MAX;

        while i < len {
            let (breaks, indent) = self.break_decision(i, cur_indent);
            self.store[i].breaks_before = breaks;
            if breaks > 0 {
                self.store[i].indent = indent;
                line_start = i;
                cur_indent = indent;
                col = indent;
            } else if i == 0 {
                col = if self.store[0].format_off {
                    self.store.original_column(0)
                } else {
                    0
                };
                cur_indent = col;
            } else {
                let spaces = self.pad(i, col);
                self.store[i].pad = spaces;
                col += spaces;
            }
            self.line_indent[i] = cur_indent;
            col = advance_column(col, &self.store[i]);
            self.end_col[i] = col;

            let token = &self.store[i];
            if col > self.options.max_line_width && !token.format_off && !token.kind.is_comment()
            {
                if let Some(candidate) = self.best_candidate(line_start, i) {
                    let restart = self.fire(candidate, i);
                    i = restart;
                    // The restart token breaks, so the line context is
                    // rebuilt when it is processed.
                    continue;
                }
                if reported_line != line_start {
                    debug!(
                        "no legal break for overflow at offset {} (column {})",
                        token.span.start, col
                    );
                    self.overflows.push(Overflow {
                        offset: token.span.start,
                        column: col,
                    });
                    reported_line = line_start;
                }
            }
            i += 1;
        }
        self.overflows
    }

    /// Decides breaks-before and indent for a token; (0, _) means the
    /// token continues its line.
    fn break_decision(&mut self, i: usize, cur_indent: usize) -> (usize, usize) {
        if i == 0 {
            return (0, 0);
        }
        let token = &self.store[i];
        if token.format_off {
            let indent = if token.original_breaks > 0 {
                self.store.original_column(i)
            } else {
                0
            };
            return (self.store[i].original_breaks, indent);
        }

        if let Some(policy) = token.wrap {
            let fires = match policy.mode {
                WrapMode::Force => true,
                WrapMode::TopPriority | WrapMode::BlockIndent => self.group_fired(&policy),
                WrapMode::WhereNecessary => self.forced[i],
                WrapMode::Disabled => false,
            } || self.forced[i];
            if fires && policy.mode != WrapMode::Disabled {
                self.note_fired(&policy);
                let indent = self.policy_indent(&policy);
                return (self.with_blank_lines(i), indent);
            }
        }

        // Pre-existing line breaks survive when joining is off, after an
        // unformatted range, and next to comments without a policy.
        let token = &self.store[i];
        if token.original_breaks > 0
            && (!self.options.join_wrapped_lines
                || self.store[i - 1].format_off
                || token.kind.is_comment()
                || self.store[i - 1].kind.is_comment())
        {
            let shifted = self.store.original_column(i) as isize + token.indent_delta;
            return (self.with_blank_lines(i), shifted.max(0) as usize);
        }

        // Code never continues a line-comment line.
        if self.store[i - 1].kind == TokenKind::LineComment {
            return (self.with_blank_lines(i), cur_indent);
        }
        (0, 0)
    }

    /// 1 break plus preserved blank lines, capped by configuration.
    fn with_blank_lines(&self, i: usize) -> usize {
        let original = self.store[i].original_breaks;
        if original >= 2 {
            1 + (original - 1).min(self.options.number_of_empty_lines_to_preserve)
        } else {
            1
        }
    }

    fn policy_indent(&self, policy: &WrapPolicy) -> usize {
        if policy.indent_on_column {
            return self.end_col[policy.parent];
        }
        let base = self.line_indent[policy.parent];
        let extra = policy.extra_indent * self.options.indent_size;
        match policy.mode {
            WrapMode::Force | WrapMode::BlockIndent => base + extra,
            _ => base + self.options.continuation_spaces() + extra,
        }
    }

    /// Alignment padding folds into the canonical spacing.
    fn pad(&self, i: usize, col: usize) -> usize {
        let token = &self.store[i];
        match token.align {
            Some(align_col) if !token.format_off && align_col > col => align_col - col,
            _ => token.spaces_before,
        }
    }

    fn group_fired(&self, policy: &WrapPolicy) -> bool {
        self.fired_groups
            .contains(&(policy.parent, policy.group_end))
    }

    fn note_fired(&mut self, policy: &WrapPolicy) {
        let key = (policy.parent, policy.group_end);
        if !self.fired_groups.contains(&key) {
            self.fired_groups.push(key);
        }
    }

    /// The best unresolved candidate on the current line: highest mode
    /// rank, then lowest penalty, then closest to the overflow.
    fn best_candidate(&self, line_start: usize, i: usize) -> Option<usize> {
        let mut best: Option<(usize, &WrapPolicy)> = None;
        for j in (line_start + 1..=i).rev() {
            let token = &self.store[j];
            if token.format_off || self.forced[j] {
                continue;
            }
            let Some(policy) = &token.wrap else { continue };
            if !matches!(
                policy.mode,
                WrapMode::TopPriority | WrapMode::WhereNecessary | WrapMode::BlockIndent
            ) || policy.group_end < i
            {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, current)) => {
                    policy.mode > current.mode
                        || (policy.mode == current.mode
                            && policy.penalty.total_cmp(&current.penalty).is_lt())
                }
            };
            if better {
                best = Some((j, policy));
            }
        }
        best.map(|(j, _)| j)
    }

    /// Fires the chosen candidate and returns the index to rescan from:
    /// the earliest group member that the fire pulls onto its own line.
    fn fire(&mut self, candidate: usize, overflow_at: usize) -> usize {
        let policy = self.store[candidate].wrap.expect("candidate has a policy");
        debug!(
            "breaking before token {} ({:?}, penalty {}) for overflow at {}",
            candidate, policy.mode, policy.penalty, overflow_at
        );
        self.forced[candidate] = true;
        self.note_fired(&policy);
        let mut restart = candidate;
        let last = policy.group_end.min(self.store.len() - 1);
        for j in policy.parent + 1..=last {
            if j >= restart || self.forced[j] || self.store[j].breaks_before > 0 {
                continue;
            }
            match &self.store[j].wrap {
                Some(other)
                    if other.same_group(&policy)
                        && matches!(
                            other.mode,
                            WrapMode::TopPriority | WrapMode::BlockIndent
                        ) =>
                {
                    restart = j;
                }
                _ => {}
            }
        }
        restart
    }
}

/// Column after rendering a token; multi-line comment tokens continue
/// from their last line.
pub(crate) fn advance_column(col: usize, token: &crate::token::Token) -> usize {
    match token.text.rfind('\n') {
        None => col + token.text.chars().count(),
        Some(last) => token.text[last + 1..].chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Span, Token, TokenKind};

    fn ident(text: &str, offset: usize) -> Token {
        let mut token = Token::new(
            TokenKind::Identifier,
            text,
            Span::new(offset, offset + text.len()),
        );
        token.spaces_before = 1;
        token
    }

    fn policy(mode: WrapMode, parent: usize, group_end: usize, penalty: f32) -> WrapPolicy {
        WrapPolicy {
            mode,
            parent,
            group_end,
            extra_indent: 0,
            depth: 0,
            penalty,
            is_first: true,
            indent_on_column: false,
        }
    }

    fn store(words: &[&str]) -> TokenStore {
        let mut offset = 0;
        let mut tokens = vec![];
        let mut source = String::new();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                source.push(' ');
                offset += 1;
            }
            tokens.push(ident(word, offset));
            source.push_str(word);
            offset += word.len();
        }
        tokens[0].spaces_before = 0;
        TokenStore::build(&source, tokens)
    }

    #[test]
    fn force_policy_always_breaks() {
        let mut s = store(&["aa", "bb"]);
        s.set_policy(1, policy(WrapMode::Force, 0, 1, 0.0));
        let overflows = execute(&mut s, &FormatOptions::default());
        assert!(overflows.is_empty());
        assert_eq!(s[1].breaks_before, 1);
    }

    #[test]
    fn where_necessary_fires_only_on_overflow() {
        let options = FormatOptions {
            max_line_width: 12,
            ..FormatOptions::default()
        };
        let mut s = store(&["aaaa", "bbbb", "cccc"]);
        s.set_policy(1, policy(WrapMode::WhereNecessary, 0, 2, 1.0));
        s.set_policy(2, policy(WrapMode::WhereNecessary, 0, 2, 1.0));
        let overflows = execute(&mut s, &options);
        assert!(overflows.is_empty());
        // "aaaa bbbb" fits in 12 columns; "cccc" does not.
        assert_eq!(s[1].breaks_before, 0);
        assert_eq!(s[2].breaks_before, 1);
        assert_eq!(s[2].indent, options.continuation_spaces());
    }

    #[test]
    fn top_priority_is_preferred_over_where_necessary() {
        let options = FormatOptions {
            max_line_width: 12,
            ..FormatOptions::default()
        };
        let mut s = store(&["aaaa", "bbbb", "cccc"]);
        s.set_policy(1, policy(WrapMode::TopPriority, 0, 2, 5.0));
        s.set_policy(2, policy(WrapMode::WhereNecessary, 0, 2, 1.0));
        let overflows = execute(&mut s, &options);
        assert!(overflows.is_empty());
        assert_eq!(s[1].breaks_before, 1);
    }

    #[test]
    fn one_per_line_group_breaks_together() {
        let options = FormatOptions {
            max_line_width: 12,
            ..FormatOptions::default()
        };
        let mut s = store(&["aaaa", "bbbb", "cccc", "dddd"]);
        for j in 1..=3 {
            s.set_policy(j, policy(WrapMode::TopPriority, 0, 3, 1.0));
        }
        execute(&mut s, &options);
        assert_eq!(s[1].breaks_before, 1);
        assert_eq!(s[2].breaks_before, 1);
        assert_eq!(s[3].breaks_before, 1);
    }

    #[test]
    fn indent_on_column_anchors_after_parent() {
        let mut s = store(&["foo", "bar", "baz"]);
        let mut on_column = policy(WrapMode::Force, 0, 2, 0.0);
        on_column.indent_on_column = true;
        s.set_policy(2, on_column);
        execute(&mut s, &FormatOptions::default());
        assert_eq!(s[2].breaks_before, 1);
        assert_eq!(s[2].indent, 3);
    }

    #[test]
    fn unbreakable_overflow_is_reported() {
        let options = FormatOptions {
            max_line_width: 8,
            ..FormatOptions::default()
        };
        let mut s = store(&["aaaaaaaaaaaa"]);
        let overflows = execute(&mut s, &options);
        assert_eq!(
            overflows,
            vec![Overflow {
                offset: 0,
                column: 12
            }]
        );
    }

    #[test]
    fn source_breaks_survive_when_joining_is_off() {
        let options = FormatOptions {
            join_wrapped_lines: false,
            ..FormatOptions::default()
        };
        let mut s = store(&["aa", "bb"]);
        s[1].original_breaks = 1;
        execute(&mut s, &options);
        assert_eq!(s[1].breaks_before, 1);
    }

    #[test]
    fn source_breaks_are_joined_by_default() {
        let mut s = store(&["aa", "bb"]);
        s[1].original_breaks = 1;
        execute(&mut s, &FormatOptions::default());
        assert_eq!(s[1].breaks_before, 0);
    }

    #[test]
    fn disabled_tokens_never_break() {
        let options = FormatOptions {
            max_line_width: 4,
            ..FormatOptions::default()
        };
        let mut s = store(&["aaaa", "bbbb"]);
        s.disable_range(0, 1);
        let overflows = execute(&mut s, &options);
        assert!(overflows.is_empty());
        assert_eq!(s[1].breaks_before, 0);
    }
}
