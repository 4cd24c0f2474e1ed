//! Expression parsing (spec §4.4): parenthesized sub-expressions, literals,
//! variable references, and/or lists, then a recency-ordered walk over
//! registered expressions, in that order.

use crate::engine::Engine;
use crate::pattern_match::{match_pattern, PlaceholderResolver};
use fableforge_core::class::PatternType;
use fableforge_core::diagnostics::{DiagnosticLog, ErrorKind};
use fableforge_core::event::ConditionalMode;
use fableforge_core::expr::{
    Expression, ExprHandle, SimpleLiteral, StringPart, Variable, VariableIndex, VariableName, VariableString,
};
use fableforge_core::match_context::MatchContext;
use fableforge_core::parser_state::ParserState;
use fableforge_core::pattern::PlaceholderFlags;

/// Bridges the pattern matcher's placeholder hook back into
/// [`parse_expression`] (spec §4.2/§4.4's mutual recursion: a registered
/// expression's pattern can itself contain `%type%` placeholders).
pub struct Dispatcher<'a> {
    pub engine: &'a mut Engine,
    pub state: &'a mut ParserState,
    pub log: &'a mut DiagnosticLog,
    pub line: u32,
}

impl PlaceholderResolver for Dispatcher<'_> {
    fn resolve(
        &mut self,
        text: &str,
        pos: usize,
        spec: &fableforge_core::pattern::PlaceholderSpec,
        stop_chars: &[char],
        ctx: &mut MatchContext,
    ) -> Option<usize> {
        let boundary = if stop_chars.is_empty() {
            text.len()
        } else {
            pos + crate::scan::next_boundary(&text[pos..], stop_chars)
        };
        let candidate = text[pos..boundary].trim_end();
        if candidate.is_empty() {
            return if spec.flags.optional { Some(pos) } else { None };
        }
        let expr = parse_expression(
            self.engine,
            candidate,
            Some(spec.pattern_type),
            spec.flags,
            self.state,
            self.log,
            self.line,
        )?;
        ctx.push_capture(expr);
        Some(pos + candidate.len())
    }
}

/// Parses `text` (already isolated to one candidate expression fragment) as
/// an expression, per the spec §4.4 dispatch order:
/// 1. a parenthesized sub-expression,
/// 2. a literal of the target class,
/// 3. a `{name}` variable reference,
/// 4. an and/or list,
/// 5. a recency-ordered walk over registered expression patterns.
pub fn parse_expression(
    engine: &mut Engine,
    text: &str,
    target: Option<PatternType>,
    flags: PlaceholderFlags,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    line: u32,
) -> Option<ExprHandle> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(inner) = strip_matching_parens(text) {
        let checkpoint = log.checkpoint();
        if let Some(expr) = parse_expression(engine, inner, target, flags, state, log, line) {
            return Some(expr);
        }
        log.discard_since(checkpoint);
    }

    if let Some(expr) = parse_string_literal(engine, text, target, state, log, line) {
        return Some(expr);
    }

    if let Some(lit) = parse_literal(engine, text, target) {
        return Some(Box::new(lit));
    }

    if let Some(expr) = parse_variable(text, target) {
        return Some(expr);
    }

    if flags.literal_only {
        log.error(ErrorKind::NoMatch, line, format!("expected a literal, found '{text}'"));
        return None;
    }

    if let Some(expr) = crate::dispatch::list::parse_list(engine, text, target, flags, state, log, line) {
        return Some(expr);
    }

    if let Some(expr) = parse_registered_expression(engine, text, target, state, log, line) {
        return Some(expr);
    }

    log.error(ErrorKind::NoMatch, line, format!("no expression matches '{text}'"));
    None
}

/// Boolean expression parsing (spec §4.4): parses an unconstrained
/// expression, then enforces `mode` against its `is_conditional()` marker.
pub fn parse_boolean_expression(
    engine: &mut Engine,
    text: &str,
    mode: ConditionalMode,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    line: u32,
) -> Option<ExprHandle> {
    if let Some(literal) = parse_bool_literal(engine, text) {
        // A bare `true`/`false` is a conditional by definition, even though
        // `SimpleLiteral::is_conditional()` defaults to `false` like every
        // other literal (spec §4.4 "plus handling of the literal words
        // true/false").
        return match mode {
            ConditionalMode::MustNot => {
                log.error(ErrorKind::SemanticError, line, "expected a non-conditional expression");
                None
            }
            _ => Some(literal),
        };
    }
    let expr = parse_expression(engine, text, None, PlaceholderFlags::default(), state, log, line)?;
    match mode {
        ConditionalMode::Must if !expr.is_conditional() => {
            log.error(ErrorKind::SemanticError, line, "expected a conditional expression");
            None
        }
        ConditionalMode::MustNot if expr.is_conditional() => {
            log.error(ErrorKind::SemanticError, line, "expected a non-conditional expression");
            None
        }
        _ => Some(expr),
    }
}

/// Recognizes the bare literal words `true`/`false` as a boolean
/// `SimpleLiteral`, independent of whatever literal parser the host
/// registered for its boolean type (spec §4.4).
fn parse_bool_literal(engine: &Engine, text: &str) -> Option<ExprHandle> {
    let class = engine.bool_class()?;
    let trimmed = text.trim();
    let value = if trimmed.eq_ignore_ascii_case("true") {
        fableforge_core::value::Value::Boolean(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        fableforge_core::value::Value::Boolean(false)
    } else {
        return None;
    };
    Some(Box::new(SimpleLiteral { class, value }))
}

/// Tries every registered type's literal parser against the full fragment.
/// Unconstrained, any type's parser may hit. Constrained to `target`, a
/// type only gets tried if its class is `target`'s own or convertible to it
/// (spec §4.4 step 2 "every type whose class is a subtype of, or
/// convertible to, `expected.type`"); a hit from a convertible type is
/// converted into `target`'s class before wrapping ("wrap in
/// `SimpleLiteral` (convert if needed)").
pub fn parse_literal(engine: &Engine, text: &str, target: Option<PatternType>) -> Option<SimpleLiteral> {
    match target {
        Some(t) => engine.types.values().find_map(|ty| {
            if !engine.converters.converter_exists(ty.class, t.class) {
                return None;
            }
            let value = ty.parse_literal(text)?;
            let value = if ty.class == t.class {
                value
            } else {
                engine.converters.convert(&value, ty.class, t.class)?
            };
            Some(SimpleLiteral { class: t.class, value })
        }),
        None => engine.types.values().find_map(|ty| {
            ty.parse_literal(text).map(|value| SimpleLiteral { class: ty.class, value })
        }),
    }
}

/// Recognizes a `"quoted"` string literal and parses its `%...%`
/// interpolated segments as nested expressions (spec §4.4 step 2 "String
/// literals are parsed by a separate `VariableString` recognizer that
/// handles quoting and percent-delimited interpolation"). A doubled `""`
/// inside the quotes is an escaped literal quote character, the same
/// convention the comment-stripper's `ScanState` assumes elsewhere.
fn parse_string_literal(
    engine: &mut Engine,
    text: &str,
    target: Option<PatternType>,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    line: u32,
) -> Option<ExprHandle> {
    let class = engine.string_class()?;
    if target.is_some_and(|t| t.class != class) {
        return None;
    }
    if text.len() < 2 || !text.starts_with('"') || !text.ends_with('"') {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    if inner.contains('"') && !is_properly_escaped(inner) {
        return None;
    }

    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;
    while pos < inner.len() {
        let rest = &inner[pos..];
        if let Some(stripped) = rest.strip_prefix("\"\"") {
            literal.push('"');
            pos = inner.len() - stripped.len();
            continue;
        }
        if let Some(after_percent) = rest.strip_prefix('%') {
            let end = after_percent.find('%')?;
            if !literal.is_empty() {
                parts.push(StringPart::Literal(std::mem::take(&mut literal)));
            }
            let segment = &after_percent[..end];
            let expr = parse_expression(engine, segment, None, Default::default(), state, log, line)?;
            parts.push(StringPart::Interpolated(expr));
            pos = inner.len() - after_percent.len() + end + 1;
            continue;
        }
        let c = rest.chars().next().unwrap();
        literal.push(c);
        pos += c.len_utf8();
    }
    if !literal.is_empty() || parts.is_empty() {
        parts.push(StringPart::Literal(literal));
    }
    Some(Box::new(VariableString { parts, class }))
}

/// Every `"` in `inner` must be the first half of a doubled `""`.
fn is_properly_escaped(inner: &str) -> bool {
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() != Some(&'"') {
                return false;
            }
            chars.next();
        }
    }
    true
}

/// `{name}` or `{name::index}` (spec §4.4 step 3). Requires a target: a
/// bare variable reference's class is inferred from context, not stated.
fn parse_variable(text: &str, target: Option<PatternType>) -> Option<ExprHandle> {
    let target = target?;
    if text.len() < 2 || !text.starts_with('{') || !text.ends_with('}') {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    if inner.is_empty() {
        return None;
    }
    let name = match inner.split_once("::") {
        Some((base, index)) if !base.is_empty() && !index.is_empty() => {
            VariableName::Indexed(base.to_string(), Box::new(VariableIndex::Literal(index.to_string())))
        }
        Some(_) => return None,
        None => VariableName::Plain(inner.to_string()),
    };
    Some(Box::new(Variable {
        name,
        class: target.class,
        plural: !target.single,
    }))
}

/// Step 5: a recency-ordered walk over registered expression patterns,
/// applying plurality and return-type conversion checks after a successful
/// match (spec §4.4 steps 5a-5c).
fn parse_registered_expression(
    engine: &mut Engine,
    text: &str,
    target: Option<PatternType>,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    line: u32,
) -> Option<ExprHandle> {
    let candidate_ids: Vec<usize> = engine.expressions.candidates().iter().map(|e| e.id).collect();

    for id in candidate_ids {
        let (patterns, factory, class) = {
            let entry = engine.expressions.get(id)?;
            (entry.patterns.clone(), entry.info.factory.clone(), entry.info.syntax.class)
        };

        for pattern in &patterns {
            let mut ctx = MatchContext::new();
            let checkpoint = log.checkpoint();
            let matched_end = log.recurse("matching", |log| {
                match_pattern(
                    pattern,
                    text,
                    0,
                    &mut ctx,
                    &mut Dispatcher { engine: &mut *engine, state: &mut *state, log, line },
                )
            });

            let Some(end) = matched_end else {
                log.discard_since(checkpoint);
                continue;
            };
            if end != text.len() {
                log.discard_since(checkpoint);
                continue;
            }

            let mut instance = factory();
            let captures = std::mem::take(&mut ctx.captures);
            let pattern_index = ctx.pattern_index();
            let initialized = log.recurse("initializing", |_| instance.init(captures, pattern_index, &ctx));
            if !initialized {
                log.discard_since(checkpoint);
                continue;
            }
            if target.is_some_and(|t| t.single && !instance.is_single()) {
                log.discard_since(checkpoint);
                continue;
            }

            let final_expr = match target {
                Some(t) if t.class != instance.return_type() => match instance.convert_to(t.class) {
                    Some(converted) => converted,
                    None => {
                        log.discard_since(checkpoint);
                        continue;
                    }
                },
                _ => instance,
            };
            // Restriction is checked last, after match+init+conversion all
            // succeed (spec §4.4 step 5e runs after 5a-5d). Kept rather than
            // discarded: unlike a failed match or init, a restricted-syntax
            // rejection should be visible to the script author even when the
            // dispatcher goes on to accept another candidate.
            if state.is_restricted(class) {
                log.error(ErrorKind::RestrictedSyntax, line, "this syntax is restricted in the current context");
                continue;
            }
            engine.expressions.mark_matched(id);
            return Some(final_expr);
        }
    }
    None
}

/// `(inner)` when parens wrap the whole fragment and are themselves
/// balanced (so `(a) and (b)` isn't mistaken for one parenthesized group).
fn strip_matching_parens(text: &str) -> Option<&str> {
    if !text.starts_with('(') || !text.ends_with(')') {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fableforge_core::class::Type;
    use fableforge_core::diagnostics::DiagnosticLog;
    use fableforge_core::value::Value;

    fn engine_with_string_and_number() -> Engine {
        let mut engine = Engine::new();
        let text_class = fableforge_core::interner::Symbol::from_raw(0);
        let number_class = fableforge_core::interner::Symbol::from_raw(1);
        engine.register_type(Type::new(text_class, "text", "texts"));
        engine.set_string_class(text_class);
        engine.register_type(
            Type::new(number_class, "number", "numbers").with_literal_parser(std::sync::Arc::new(|s| {
                s.parse::<f64>().ok().map(Value::Number)
            })),
        );
        engine
    }

    #[test]
    fn plain_quoted_string_has_one_literal_part() {
        let mut engine = engine_with_string_and_number();
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();
        let expr = parse_string_literal(&mut engine, "\"hello world\"", None, &mut state, &mut log, 1).unwrap();
        assert_eq!(expr.to_string(None, false), "hello world");
    }

    #[test]
    fn doubled_quote_is_an_escaped_literal_quote() {
        let mut engine = engine_with_string_and_number();
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();
        let expr = parse_string_literal(&mut engine, "\"say \"\"hi\"\"\"", None, &mut state, &mut log, 1).unwrap();
        assert_eq!(expr.to_string(None, false), "say \"hi\"");
    }

    #[test]
    fn percent_delimited_segment_interpolates_a_nested_expression() {
        let mut engine = engine_with_string_and_number();
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();
        let expr = parse_string_literal(&mut engine, "\"value: %5%!\"", None, &mut state, &mut log, 1).unwrap();
        assert_eq!(expr.to_string(None, false), "value: 5!");
    }

    #[test]
    fn unquoted_text_is_not_a_string_literal() {
        let mut engine = engine_with_string_and_number();
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();
        assert!(parse_string_literal(&mut engine, "hello", None, &mut state, &mut log, 1).is_none());
    }

    fn engine_with_bool() -> Engine {
        let mut engine = Engine::new();
        let bool_class = fableforge_core::interner::Symbol::from_raw(0);
        engine.register_type(Type::new(bool_class, "boolean", "booleans"));
        engine.set_bool_class(bool_class);
        engine
    }

    #[test]
    fn bare_true_is_a_conditional_literal() {
        let mut engine = engine_with_bool();
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();
        let expr =
            parse_boolean_expression(&mut engine, "true", ConditionalMode::Must, &mut state, &mut log, 1).unwrap();
        assert_eq!(expr.to_string(None, false), "true");
        assert!(log.entries().is_empty());
    }

    #[test]
    fn bare_false_is_case_insensitive() {
        let mut engine = engine_with_bool();
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();
        let expr =
            parse_boolean_expression(&mut engine, "FALSE", ConditionalMode::Must, &mut state, &mut log, 1).unwrap();
        assert_eq!(expr.to_string(None, false), "false");
    }

    #[test]
    fn bool_literal_rejected_where_a_non_conditional_expression_is_required() {
        let mut engine = engine_with_bool();
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();
        let expr =
            parse_boolean_expression(&mut engine, "true", ConditionalMode::MustNot, &mut state, &mut log, 1);
        assert!(expr.is_none());
        assert!(!log.entries().is_empty());
    }

    #[test]
    fn unregistered_bool_class_leaves_true_false_to_fall_through() {
        let mut engine = Engine::new();
        let mut state = ParserState::new();
        let mut log = DiagnosticLog::new();
        assert!(parse_bool_literal(&engine, "true").is_none());
        assert!(parse_boolean_expression(&mut engine, "true", ConditionalMode::Must, &mut state, &mut log, 1).is_none());
    }
}
