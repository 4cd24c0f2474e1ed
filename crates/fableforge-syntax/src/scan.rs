//! A shared "scan while tracking nesting depth" primitive.
//!
//! Both the comment stripper (spec §4.1: `#` outside quotes starts a
//! comment) and the list-literal splitter (spec §4.2, §4.5: commas/`and`/
//! `or`/`nor` inside parens, quotes, or `{}` don't act as delimiters) need
//! to walk a line while knowing whether they're inside a quoted string,
//! a parenthesized group, or a `{variable}` reference. Rather than
//! duplicate that bookkeeping, both build on one cursor.

/// Tracks nesting while scanning a line left to right.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanState {
    paren_depth: u32,
    brace_depth: u32,
    in_single_quote: bool,
    in_double_quote: bool,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cursor is currently inside a group where delimiters
    /// (comment-starting `#`, list separators) should be ignored.
    pub fn is_inside_group(&self) -> bool {
        self.paren_depth > 0
            || self.brace_depth > 0
            || self.in_single_quote
            || self.in_double_quote
    }

    /// Feeds one character (with a lookahead for quote-escaping via
    /// doubled quotes, matching the source language's `""` convention for
    /// an embedded quote) and updates nesting state.
    ///
    /// Returns `true` if this character was consumed as part of opening
    /// or closing a quote (so callers can special-case escaped quotes).
    pub fn feed(&mut self, c: char) {
        match c {
            '"' if !self.in_single_quote => self.in_double_quote = !self.in_double_quote,
            '\'' if !self.in_double_quote => self.in_single_quote = !self.in_single_quote,
            '(' if !self.in_single_quote && !self.in_double_quote => self.paren_depth += 1,
            ')' if !self.in_single_quote && !self.in_double_quote && self.paren_depth > 0 => {
                self.paren_depth -= 1;
            }
            '{' if !self.in_single_quote && !self.in_double_quote => self.brace_depth += 1,
            '}' if !self.in_single_quote && !self.in_double_quote && self.brace_depth > 0 => {
                self.brace_depth -= 1;
            }
            _ => {}
        }
    }
}

/// Strips a trailing `#` comment from a logical line, respecting quotes
/// (spec §4.1 (ii), §6).
pub fn strip_comment(line: &str) -> &str {
    let mut state = ScanState::new();
    let mut byte_idx = None;
    for (i, c) in line.char_indices() {
        if c == '#' && !state.is_inside_group() {
            byte_idx = Some(i);
            break;
        }
        state.feed(c);
    }
    match byte_idx {
        Some(i) => &line[..i],
        None => line,
    }
}

/// Finds the "next simple character" boundary used by the expression
/// placeholder matcher (spec §4.2): the first top-level occurrence of any
/// character in `stop_chars`, skipping over parens, quotes, and braces.
/// Returns the byte offset, or the string length if none is found.
pub fn next_boundary(text: &str, stop_chars: &[char]) -> usize {
    let mut state = ScanState::new();
    for (i, c) in text.char_indices() {
        if stop_chars.contains(&c) && !state.is_inside_group() {
            return i;
        }
        state.feed(c);
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_comment_ignores_hash_in_quotes() {
        assert_eq!(strip_comment(r#"set {x} to "a # b" # real comment"#), r#"set {x} to "a # b" "#);
    }

    #[test]
    fn strip_comment_no_comment() {
        assert_eq!(strip_comment("set {x} to 5"), "set {x} to 5");
    }

    #[test]
    fn next_boundary_skips_commas_inside_parens() {
        let text = "foo(1, 2), bar";
        let idx = next_boundary(text, &[',']);
        assert_eq!(&text[..idx], "foo(1, 2)");
    }

    #[test]
    fn next_boundary_no_match_returns_len() {
        let text = "foo(1, 2)";
        let idx = next_boundary(text, &[',']);
        assert_eq!(idx, text.len());
    }
}
