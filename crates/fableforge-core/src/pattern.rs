//! The pattern language (spec §3 "Pattern element", §6 "Pattern language").
//!
//! This module only holds the parsed *shape* of a pattern. The matcher
//! that walks a `Pattern` against source text lives in `fableforge-syntax`
//! — kept separate so that `SyntaxInfo` (which carries compiled patterns)
//! can live here in `fableforge-core` without this crate depending on the
//! matching engine.

use crate::class::PatternType;
use thiserror::Error;

/// One element of a compiled pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Case- and whitespace-tolerant literal text.
    Text(String),
    /// `[inner]` — matches `inner` or nothing.
    Optional(Box<Pattern>),
    /// `(a|b|c)` — alternatives tried in order; `marks[i]` is the reported
    /// pattern-index for branch `i` if the source used `N¦...`, else `i`.
    Choice(Vec<Pattern>, Vec<usize>),
    /// An anchored regular expression segment.
    Regex(String),
    /// `%type%` — an expression placeholder.
    ExpressionPlaceholder(PlaceholderSpec),
    /// A fixed sequence of sub-patterns matched back to back.
    Sequence(Vec<Pattern>),
}

/// `%type%` / `%*type%` / `%-type%` / `%~type%` flags (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderFlags {
    /// `%*type%` — literals only, no full expression dispatch.
    pub literal_only: bool,
    /// `%-type%` — this placeholder may be entirely absent.
    pub optional: bool,
    /// `%~type%` — matches a plural expression even though bound `single`.
    pub plural_override: bool,
}

impl Default for PlaceholderFlags {
    fn default() -> Self {
        Self {
            literal_only: false,
            optional: false,
            plural_override: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaceholderSpec {
    pub pattern_type: PatternType,
    pub flags: PlaceholderFlags,
}

impl Pattern {
    /// Parses a registration pattern string, e.g.
    /// `"set %object% to %object%"` or `"(1¦add|2¦remove) %object%"`.
    ///
    /// This is intentionally a thin, hand-rolled recursive-descent parser:
    /// the grammar (§6) is small and fixed, so a dependency on a parser
    /// combinator crate would be more machinery than the problem needs.
    pub fn parse(
        source: &str,
        resolve_type: impl Fn(&str) -> Option<PatternType> + Copy,
    ) -> Result<Pattern, PatternSyntaxError> {
        let chars: Vec<char> = source.chars().collect();
        let mut pos = 0;
        let pattern = parse_sequence(&chars, &mut pos, resolve_type, &[])?;
        if pos != chars.len() {
            return Err(PatternSyntaxError::new(
                pos,
                "unexpected trailing characters in pattern",
            ));
        }
        Ok(pattern)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pattern error at {position}: {message}")]
pub struct PatternSyntaxError {
    pub position: usize,
    pub message: String,
}

impl PatternSyntaxError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

fn parse_sequence(
    chars: &[char],
    pos: &mut usize,
    resolve_type: impl Fn(&str) -> Option<PatternType> + Copy,
    stop_at: &[char],
) -> Result<Pattern, PatternSyntaxError> {
    let mut parts = Vec::new();
    let mut literal = String::new();

    macro_rules! flush_literal {
        () => {
            if !literal.is_empty() {
                parts.push(Pattern::Text(std::mem::take(&mut literal)));
            }
        };
    }

    while *pos < chars.len() {
        let c = chars[*pos];
        if stop_at.contains(&c) {
            break;
        }
        match c {
            '\\' if *pos + 1 < chars.len() => {
                literal.push(chars[*pos + 1]);
                *pos += 2;
            }
            '[' => {
                flush_literal!();
                *pos += 1;
                let inner = parse_sequence(chars, pos, resolve_type, &[']'])?;
                if *pos >= chars.len() || chars[*pos] != ']' {
                    return Err(PatternSyntaxError::new(*pos, "unterminated '['"));
                }
                *pos += 1;
                parts.push(Pattern::Optional(Box::new(inner)));
            }
            '(' => {
                flush_literal!();
                *pos += 1;
                let choice = parse_choice(chars, pos, resolve_type)?;
                parts.push(choice);
            }
            '%' => {
                flush_literal!();
                *pos += 1;
                let placeholder = parse_placeholder(chars, pos, resolve_type)?;
                parts.push(Pattern::ExpressionPlaceholder(placeholder));
            }
            _ => {
                literal.push(c);
                *pos += 1;
            }
        }
    }

    flush_literal!();
    Ok(match parts.len() {
        0 => Pattern::Text(String::new()),
        1 => parts.into_iter().next().unwrap(),
        _ => Pattern::Sequence(parts),
    })
}

fn parse_choice(
    chars: &[char],
    pos: &mut usize,
    resolve_type: impl Fn(&str) -> Option<PatternType> + Copy,
) -> Result<Pattern, PatternSyntaxError> {
    let mut alternatives = Vec::new();
    let mut marks = Vec::new();
    let mut index = 0usize;

    loop {
        // An alternative may open with `N¦` marking its reported index.
        let mark_start = *pos;
        let mut mark = None;
        let mut scan = *pos;
        let mut digits = String::new();
        while scan < chars.len() && chars[scan].is_ascii_digit() {
            digits.push(chars[scan]);
            scan += 1;
        }
        if !digits.is_empty() && scan < chars.len() && chars[scan] == '¦' {
            mark = digits.parse::<usize>().ok();
            *pos = scan + 1;
        } else {
            *pos = mark_start;
        }

        let alt = parse_sequence(chars, pos, resolve_type, &['|', ')'])?;
        alternatives.push(alt);
        marks.push(mark.unwrap_or(index));
        index += 1;

        if *pos >= chars.len() {
            return Err(PatternSyntaxError::new(*pos, "unterminated '('"));
        }
        match chars[*pos] {
            '|' => {
                *pos += 1;
                continue;
            }
            ')' => {
                *pos += 1;
                break;
            }
            _ => unreachable!(),
        }
    }

    Ok(Pattern::Choice(alternatives, marks))
}

fn parse_placeholder(
    chars: &[char],
    pos: &mut usize,
    resolve_type: impl Fn(&str) -> Option<PatternType> + Copy,
) -> Result<PlaceholderSpec, PatternSyntaxError> {
    let mut flags = PlaceholderFlags::default();
    loop {
        match chars.get(*pos) {
            Some('*') => {
                flags.literal_only = true;
                *pos += 1;
            }
            Some('-') => {
                flags.optional = true;
                *pos += 1;
            }
            Some('~') => {
                flags.plural_override = true;
                *pos += 1;
            }
            _ => break,
        }
    }

    let start = *pos;
    while *pos < chars.len() && chars[*pos] != '%' {
        *pos += 1;
    }
    if *pos >= chars.len() {
        return Err(PatternSyntaxError::new(start, "unterminated '%'"));
    }
    let name: String = chars[start..*pos].iter().collect();
    *pos += 1; // consume closing '%'

    let base_type = resolve_type(&name).ok_or_else(|| {
        PatternSyntaxError::new(start, format!("unknown expression type '{name}'"))
    })?;
    let pattern_type = PatternType {
        class: base_type.class,
        single: base_type.single && !flags.plural_override,
    };

    Ok(PlaceholderSpec {
        pattern_type,
        flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::Symbol;

    fn object_type() -> PatternType {
        PatternType::single(Symbol::from_raw(0))
    }

    #[test]
    fn parses_plain_text() {
        let pat = Pattern::parse("set to", |_| None).unwrap();
        assert!(matches!(pat, Pattern::Text(t) if t == "set to"));
    }

    #[test]
    fn parses_choice_with_marks() {
        let pat = Pattern::parse("(1¦add|2¦remove)", |_| None).unwrap();
        match pat {
            Pattern::Choice(alts, marks) => {
                assert_eq!(alts.len(), 2);
                assert_eq!(marks, vec![1, 2]);
            }
            other => panic!("expected Choice, got {other:?}"),
        }
    }

    #[test]
    fn parses_placeholder() {
        let pat = Pattern::parse("set %object% to %object%", |name| {
            (name == "object").then(object_type)
        })
        .unwrap();
        match pat {
            Pattern::Sequence(parts) => {
                assert_eq!(parts.len(), 4);
                assert!(matches!(parts[1], Pattern::ExpressionPlaceholder(_)));
                assert!(matches!(parts[3], Pattern::ExpressionPlaceholder(_)));
            }
            other => panic!("expected Sequence, got {other:?}"),
        }
    }

    #[test]
    fn unknown_placeholder_type_errors() {
        let err = Pattern::parse("%bogus%", |_| None).unwrap_err();
        assert!(err.message.contains("bogus"));
    }
}
