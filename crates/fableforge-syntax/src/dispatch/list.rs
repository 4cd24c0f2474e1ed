//! And/or list-literal parsing (spec §4.5): splits on top-level commas and
//! `and`/`or`/`nor` at nesting depth zero, then parses each item.

use crate::engine::Engine;
use crate::scan::ScanState;
use fableforge_core::class::{ClassId, PatternType};
use fableforge_core::diagnostics::{DiagnosticLog, ErrorKind};
use fableforge_core::expr::{ExprHandle, Expression, ExpressionList, ListJoin, LiteralList};
use fableforge_core::parser_state::ParserState;
use fableforge_core::pattern::PlaceholderFlags;

pub fn parse_list(
    engine: &mut Engine,
    text: &str,
    target: Option<PatternType>,
    flags: PlaceholderFlags,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    line: u32,
) -> Option<ExprHandle> {
    let (join, parts) = split_list(text)?;
    if parts.len() < 2 {
        return None;
    }
    if parts.iter().any(|p| p.trim().is_empty()) {
        log.error(ErrorKind::MalformedInput, line, "list has a zero-length element");
        return None;
    }

    let mut items: Vec<ExprHandle> = Vec::new();
    for part in &parts {
        let item: ExprHandle = if flags.literal_only {
            Box::new(super::expression::parse_literal(engine, part.trim(), target)?)
        } else {
            super::expression::parse_expression(
                engine,
                part.trim(),
                target,
                PlaceholderFlags::default(),
                state,
                log,
                line,
            )?
        };
        items.push(item);
    }

    // `literal_only` (`%*type%`) only constrains how each element is parsed.
    // Whether the resulting list is a `LiteralList` or `ExpressionList`
    // depends on what actually came out the other end (spec §4.5 "If every
    // element is a Literal..."): a plain `%object%` placeholder over an
    // all-literal list (e.g. "1, 2 and 3") must still produce a
    // `LiteralList`, since step 2's literal-parse attempt can land on
    // `SimpleLiteral` without `%*%` forcing it.
    if let Some(literals) = items.iter().map(|item| item.as_literal().cloned()).collect::<Option<Vec<_>>>() {
        let class = target
            .map(|t| t.class)
            .unwrap_or_else(|| common_class(engine, literals.iter().map(|l| l.class)));
        return Some(Box::new(LiteralList { class, join, items: literals }));
    }

    let class = target
        .map(|t| t.class)
        .unwrap_or_else(|| common_class(engine, items.iter().map(|i| i.return_type())));
    Some(Box::new(ExpressionList { class, join, items }))
}

/// An unconstrained list's item class is its elements' "common superclass"
/// (spec §4.5). This crate has no separate subtype hierarchy, so it reuses
/// the converter graph already built for step 2's literal coercion: the
/// first class every element either equals or has a registered converter
/// into. Falls back to the first element's own class if no single class
/// covers every element (e.g. a genuinely disjoint mix with no converters
/// between them at all) — still a defined, documented rule, not an
/// incidental one.
fn common_class(engine: &Engine, classes: impl Iterator<Item = ClassId> + Clone) -> ClassId {
    for candidate in classes.clone() {
        if classes
            .clone()
            .all(|c| c == candidate || engine.converters.converter_exists(c, candidate))
        {
            return candidate;
        }
    }
    classes.clone().next().expect("list always has at least 2 items")
}

/// A mask over byte offsets: `true` where that position sits outside every
/// paren/brace/quote group, so list separators found there are real.
fn top_level_mask(text: &str) -> Vec<bool> {
    let mut mask = vec![false; text.len() + 1];
    let mut scanner = ScanState::new();
    for (i, c) in text.char_indices() {
        mask[i] = !scanner.is_inside_group();
        scanner.feed(c);
    }
    mask[text.len()] = !scanner.is_inside_group();
    mask
}

fn split_list(text: &str) -> Option<(ListJoin, Vec<String>)> {
    let mask = top_level_mask(text);
    // `is_keyword` distinguishes a bare comma from an explicit and/or/nor:
    // the and-vs-or rule (spec §4.5 "combining rule") only looks at the
    // explicit conjunction words. A comma is punctuation, not a vote — "1, 2
    // or 3" is still an or-list even though one of its two separators is a
    // comma, and "1 and 2 or 3" is still an and-list even though neither of
    // its separators is a comma.
    let mut cuts: Vec<(usize, usize, bool, bool)> = Vec::new();

    for (idx, _) in text.match_indices(',') {
        if mask[idx] {
            cuts.push((idx, idx + 1, false, false));
        }
    }
    for (keyword, is_or) in [(" and ", false), (" or ", true), (" nor ", true)] {
        for (idx, _) in text.match_indices(keyword) {
            if mask[idx] {
                cuts.push((idx, idx + keyword.len(), is_or, true));
            }
        }
    }
    if cuts.is_empty() {
        return None;
    }
    cuts.sort_by_key(|&(start, ..)| start);

    // A comma immediately followed (modulo whitespace) by a conjunction
    // keyword — an Oxford comma, e.g. "apples, bananas, and cherries" — is
    // one logical separator between two elements, not a comma separator
    // plus a keyword separator with a zero-length element between them.
    // Coalesce the two cuts, trimming off the keyword's own trailing space
    // so it stays attached to the next element, same as a bare comma does.
    let mut filtered: Vec<(usize, usize, bool, bool)> = Vec::new();
    for cut in cuts {
        if let Some(prev) = filtered.last_mut() {
            if cut.0 < prev.1 {
                continue;
            }
            if !prev.3 && cut.3 && text[prev.1..cut.0].trim().is_empty() {
                prev.1 = cut.1 - 1;
                prev.2 = cut.2;
                prev.3 = true;
                continue;
            }
        }
        filtered.push(cut);
    }

    // And-list unless every *keyword* separator is or/nor; mixing and/or
    // yields and-list; a list joined only by commas (no keyword at all)
    // defaults to and-list.
    let join = if filtered.iter().any(|&(_, _, _, is_keyword)| is_keyword)
        && filtered
            .iter()
            .filter(|&&(_, _, _, is_keyword)| is_keyword)
            .all(|&(_, _, is_or, _)| is_or)
    {
        ListJoin::Or
    } else {
        ListJoin::And
    };

    let mut parts = Vec::new();
    let mut cursor = 0;
    for &(start, end, ..) in &filtered {
        parts.push(text[cursor..start].to_string());
        cursor = end;
    }
    parts.push(text[cursor..].to_string());
    Some((join, parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_oxford_comma_and_list() {
        let (join, parts) = split_list("apples, bananas, and cherries").unwrap();
        assert_eq!(join, ListJoin::And);
        assert_eq!(parts, vec!["apples", " bananas", " cherries"]);
    }

    #[test]
    fn splits_or_list() {
        let (join, parts) = split_list("a sword or a shield").unwrap();
        assert_eq!(join, ListJoin::Or);
        assert_eq!(parts, vec!["a sword", "a shield"]);
    }

    #[test]
    fn ignores_separators_inside_parens() {
        assert!(split_list("(a and b)").is_none());
    }

    #[test]
    fn single_item_is_not_a_list() {
        assert!(split_list("just one thing").is_none());
    }

    #[test]
    fn mixing_and_and_or_yields_and_list() {
        let (join, parts) = split_list("1 and 2 or 3").unwrap();
        assert_eq!(join, ListJoin::And);
        assert_eq!(parts, vec!["1", "2", "3"]);
    }

    #[test]
    fn oxford_comma_before_or_is_still_an_or_list() {
        let (join, parts) = split_list("1, 2 or 3").unwrap();
        assert_eq!(join, ListJoin::Or);
        assert_eq!(parts, vec!["1", " 2", "3"]);
    }

    #[test]
    fn plain_placeholder_over_all_literal_items_builds_a_literal_list() {
        use fableforge_core::class::Type;
        use fableforge_core::diagnostics::DiagnosticLog;
        use fableforge_core::value::Value;

        let mut engine = Engine::new();
        let number_class = fableforge_core::interner::Symbol::from_raw(0);
        engine.register_type(
            Type::new(number_class, "number", "numbers").with_literal_parser(std::sync::Arc::new(|s| {
                s.parse::<f64>().ok().map(Value::Number)
            })),
        );
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();

        // No `%*%` — plain placeholder, literal_only is false — yet every
        // item still parses as a literal, so this must produce a
        // `LiteralList`, not an `ExpressionList`.
        let expr = parse_list(
            &mut engine,
            "1, 2 and 3",
            None,
            PlaceholderFlags::default(),
            &mut state,
            &mut log,
            1,
        )
        .unwrap();
        assert!(expr.as_literal().is_none()); // the list itself isn't a literal
        assert_eq!(expr.to_string(None, false), "1 and 2 and 3");
        assert!(format!("{expr:?}").starts_with("LiteralList"));
    }

    #[test]
    fn unconstrained_mixed_list_takes_the_class_every_item_converts_into() {
        use fableforge_core::class::Type;
        use fableforge_core::diagnostics::DiagnosticLog;
        use fableforge_core::value::Value;

        let mut engine = Engine::new();
        let number_class = fableforge_core::interner::Symbol::from_raw(0);
        let text_class = fableforge_core::interner::Symbol::from_raw(1);
        engine.register_type(
            Type::new(number_class, "number", "numbers").with_literal_parser(std::sync::Arc::new(|s| {
                s.parse::<f64>().ok().map(Value::Number)
            })),
        );
        engine.register_type(Type::new(text_class, "text", "texts").with_literal_parser(std::sync::Arc::new(
            |s| Some(Value::Text(s.to_string())),
        )));
        engine.converters.register(number_class, text_class, |v| match v {
            Value::Number(n) => Some(Value::Text(n.to_string())),
            _ => None,
        });
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();

        // "5" parses as a number literal, "hello" only as text; with no
        // target, the common class is text, since every number converts
        // into text but not vice versa.
        let expr = parse_list(&mut engine, "5 and hello", None, PlaceholderFlags::default(), &mut state, &mut log, 1)
            .unwrap();
        assert_eq!(expr.return_type(), text_class);
    }

    #[test]
    fn common_class_falls_back_to_first_item_when_nothing_converts() {
        let mut engine = Engine::new();
        let a = fableforge_core::interner::Symbol::from_raw(0);
        let b = fableforge_core::interner::Symbol::from_raw(1);
        assert_eq!(common_class(&engine, [a, b].into_iter()), a);
    }
}
