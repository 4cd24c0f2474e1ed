//! The pattern matcher (spec §4.2): walks a compiled [`Pattern`] against a
//! text fragment starting at a byte offset, returning the new cursor
//! position on success.
//!
//! `Pattern::ExpressionPlaceholder` can't be resolved here: matching one
//! means recursively parsing an expression, which is the dispatcher's job
//! (`crate::dispatch`), and the dispatcher in turn needs this matcher for
//! its own registrations' patterns. [`PlaceholderResolver`] breaks that
//! cycle: the dispatcher implements it and this module only depends on the
//! trait.

use fableforge_core::match_context::{Mark, MatchContext};
use fableforge_core::pattern::{Pattern, PlaceholderSpec};
use regex::Regex;

/// Resolves one `%type%` placeholder against `text[pos..]`. Implemented by
/// the dispatcher; pushes its capture onto `ctx` itself so failed attempts
/// leave nothing behind.
pub trait PlaceholderResolver {
    /// `stop_chars` hints at the characters that would start the next
    /// literal pattern element after this placeholder, so the resolver
    /// knows where to stop a greedy "next simple character boundary" scan
    /// (spec §4.2) without needing true backtracking. An empty slice means
    /// the placeholder is followed by nothing fixed (end of sequence, or a
    /// sibling that isn't literal text) — the resolver falls back to
    /// whitespace-delimited scanning.
    fn resolve(
        &mut self,
        text: &str,
        pos: usize,
        spec: &PlaceholderSpec,
        stop_chars: &[char],
        ctx: &mut MatchContext,
    ) -> Option<usize>;
}

/// A [`Pattern`] with its regex segments pre-compiled (SPEC_FULL.md
/// "pattern compilation caching"): recompiling a `Regex` on every match
/// attempt against every candidate registration would make matching
/// quadratic in script size for no reason, so registrations compile once at
/// registry-insertion time and the registry stores the result.
#[derive(Debug)]
pub enum CompiledPattern {
    Text(String),
    Optional(Box<CompiledPattern>),
    Choice(Vec<CompiledPattern>, Vec<usize>),
    Regex(Regex),
    ExpressionPlaceholder(PlaceholderSpec),
    Sequence(Vec<CompiledPattern>),
}

impl CompiledPattern {
    pub fn compile(pattern: &Pattern) -> Result<Self, regex::Error> {
        Ok(match pattern {
            Pattern::Text(s) => CompiledPattern::Text(s.clone()),
            Pattern::Optional(inner) => {
                CompiledPattern::Optional(Box::new(Self::compile(inner)?))
            }
            Pattern::Choice(alts, marks) => {
                let compiled = alts
                    .iter()
                    .map(Self::compile)
                    .collect::<Result<Vec<_>, _>>()?;
                CompiledPattern::Choice(compiled, marks.clone())
            }
            Pattern::Regex(src) => CompiledPattern::Regex(Regex::new(&format!("^(?:{src})"))?),
            Pattern::ExpressionPlaceholder(spec) => {
                CompiledPattern::ExpressionPlaceholder(spec.clone())
            }
            Pattern::Sequence(parts) => {
                let compiled = parts
                    .iter()
                    .map(Self::compile)
                    .collect::<Result<Vec<_>, _>>()?;
                CompiledPattern::Sequence(compiled)
            }
        })
    }
}

/// Matches `pattern` against `text` starting at byte offset `at`. Returns
/// the new cursor position on success, or `None` (FAIL, spec §4.2 contract)
/// on mismatch.
pub fn match_pattern(
    pattern: &CompiledPattern,
    text: &str,
    at: usize,
    ctx: &mut MatchContext,
    resolver: &mut dyn PlaceholderResolver,
) -> Option<usize> {
    match pattern {
        CompiledPattern::Text(lit) => match_text(lit, text, at),
        CompiledPattern::Optional(inner) => {
            let checkpoint = ctx.marks.len();
            match match_pattern(inner, text, at, ctx, resolver) {
                Some(end) => {
                    ctx.push_mark(Mark::OptionalPresent(true));
                    Some(end)
                }
                None => {
                    ctx.marks.truncate(checkpoint);
                    ctx.push_mark(Mark::OptionalPresent(false));
                    Some(at)
                }
            }
        }
        CompiledPattern::Choice(alts, marks) => {
            for (alt, mark) in alts.iter().zip(marks) {
                let checkpoint = ctx.marks.len();
                let capture_checkpoint = ctx.captures.len();
                if let Some(end) = match_pattern(alt, text, at, ctx, resolver) {
                    ctx.push_mark(Mark::ChoiceIndex(*mark));
                    return Some(end);
                }
                ctx.marks.truncate(checkpoint);
                ctx.captures.truncate(capture_checkpoint);
            }
            None
        }
        CompiledPattern::Regex(re) => {
            let m = re.find(&text[at..])?;
            if m.start() != 0 {
                return None;
            }
            Some(at + m.end())
        }
        CompiledPattern::ExpressionPlaceholder(spec) => {
            resolver.resolve(text, at, spec, &[], ctx)
        }
        CompiledPattern::Sequence(parts) => {
            let mut pos = at;
            for (i, part) in parts.iter().enumerate() {
                if let CompiledPattern::ExpressionPlaceholder(spec) = part {
                    let stop_chars = parts.get(i + 1).map(leading_chars).unwrap_or_default();
                    pos = resolver.resolve(text, pos, spec, &stop_chars, ctx)?;
                } else {
                    pos = match_pattern(part, text, pos, ctx, resolver)?;
                }
            }
            Some(pos)
        }
    }
}

/// The set of characters that could legally start a match of `pattern`,
/// used to bound a preceding expression placeholder's greedy scan.
fn leading_chars(pattern: &CompiledPattern) -> Vec<char> {
    match pattern {
        CompiledPattern::Text(lit) => lit.chars().find(|c| !c.is_whitespace()).into_iter().collect(),
        CompiledPattern::Sequence(parts) => parts.first().map(leading_chars).unwrap_or_default(),
        CompiledPattern::Choice(alts, _) => alts.iter().flat_map(leading_chars).collect(),
        CompiledPattern::Optional(inner) => leading_chars(inner),
        CompiledPattern::Regex(_) | CompiledPattern::ExpressionPlaceholder(_) => Vec::new(),
    }
}

/// Whitespace- and case-tolerant literal matching: each whitespace-
/// separated word in `lit` must appear in order in `text`, with any amount
/// of whitespace allowed (and required) between words, case folded.
fn match_text(lit: &str, text: &str, pos: usize) -> Option<usize> {
    let words: Vec<&str> = lit.split_whitespace().collect();
    if words.is_empty() {
        return Some(pos);
    }

    let mut cursor = pos;
    for word in words {
        cursor = skip_whitespace(text, cursor);
        for wc in word.chars() {
            let mut iter = text[cursor..].char_indices();
            match iter.next() {
                Some((_, tc)) if chars_match_ci(tc, wc) => {
                    cursor += tc.len_utf8();
                }
                _ => return None,
            }
        }
    }
    Some(cursor)
}

fn chars_match_ci(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn skip_whitespace(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
