//! Effect, section, and `load_items` dispatch (spec §4.6, §4.7).

use super::expression::parse_boolean_expression;
use crate::elements::FileElement;
use crate::engine::Engine;
use crate::pattern_match::match_pattern;
use fableforge_core::diagnostics::{DiagnosticLog, ErrorKind};
use fableforge_core::event::ConditionalMode;
use fableforge_core::match_context::MatchContext;
use fableforge_core::parser_state::ParserState;
use fableforge_core::statement::{ConditionalBranch, ConditionalStatement, InlineConditionStatement, StmtHandle};

use super::expression::Dispatcher;

/// Parses one effect line against `engine.statements` (non-section entries
/// only). No return-type coercion (spec §4.6): a match either `init`s
/// successfully or the dispatcher tries the next candidate.
pub fn parse_effect(
    engine: &mut Engine,
    text: &str,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    line: u32,
) -> Option<StmtHandle> {
    parse_statement_registration(engine, text, state, log, line, false).map(|(stmt, _)| stmt)
}

/// Parses one section header against `engine.statements` (section entries
/// only). The caller still owns recursing into the body via [`load_items`]
/// and installing it with `SectionBody::accept_children`.
pub fn parse_section(
    engine: &mut Engine,
    header: &str,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    line: u32,
) -> Option<StmtHandle> {
    parse_statement_registration(engine, header, state, log, line, true).map(|(stmt, _)| stmt)
}

/// Same as [`parse_section`] but also hands back the matched registration's
/// class, so a caller about to recurse into the section's body can push it
/// onto [`ParserState`]'s statement-scope stack first (spec §3 `ParserState`
/// "current_statement_stack").
fn parse_section_with_class(
    engine: &mut Engine,
    header: &str,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    line: u32,
) -> Option<(StmtHandle, fableforge_core::class::ClassId)> {
    parse_statement_registration(engine, header, state, log, line, true)
}

fn parse_statement_registration(
    engine: &mut Engine,
    text: &str,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    line: u32,
    want_section: bool,
) -> Option<(StmtHandle, fableforge_core::class::ClassId)> {
    let text = text.trim().trim_end_matches(':').trim();
    let candidate_ids: Vec<usize> = engine.statements.candidates().iter().map(|e| e.id).collect();

    for id in candidate_ids {
        let (patterns, factory, class, is_section) = {
            let entry = engine.statements.get(id)?;
            (
                entry.patterns.clone(),
                entry.info.factory.clone(),
                entry.info.syntax.class,
                entry.info.is_section,
            )
        };
        if is_section != want_section {
            continue;
        }

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
            // Restriction is checked after a successful match+init, not as a
            // pre-filter (spec §4.4 step 5e runs after 5a-5d). Unlike a
            // failed match or init, this diagnostic is kept rather than
            // discarded: a restricted syntax should be visible to the
            // script author even when the dispatcher goes on to try (and
            // possibly accept) another candidate.
            if state.is_restricted(class) {
                log.error(ErrorKind::RestrictedSyntax, line, "this syntax is restricted in the current context");
                continue;
            }
            engine.statements.mark_matched(id);
            return Some((instance, class));
        }
    }
    None
}

/// `true` if `header` is an `else`/`else if` that can't possibly be the
/// header of a top-level trigger (spec §4.8 step 4, scenario S5: a stray
/// `else:` at the top of a file, not nested under an `if`, must still be
/// reported as the same "An 'else' must be placed after..." structure
/// error load_items gives a misplaced `else` nested under a trigger —
/// not the generic "code outside a trigger"/"no event matches" error a
/// plain non-conditional header would get). Exposed so the cold-parse loop
/// in `fableforge-loader` can check a top-level section header before
/// attempting to match it against the event registry.
pub fn dangling_conditional_header(header: &str) -> bool {
    matches!(classify_header(header), HeaderKind::ElseIf(_) | HeaderKind::Else)
}

enum HeaderKind<'a> {
    If(&'a str),
    ElseIf(&'a str),
    Else,
    Other,
}

fn classify_header(header: &str) -> HeaderKind<'_> {
    let body = header.trim();
    let body = body.strip_suffix(':').unwrap_or(body).trim();
    let lower = body.to_ascii_lowercase();
    if lower == "else" {
        HeaderKind::Else
    } else if lower.starts_with("else if ") {
        HeaderKind::ElseIf(body["else if ".len()..].trim())
    } else if lower.starts_with("if ") {
        HeaderKind::If(body["if ".len()..].trim())
    } else {
        HeaderKind::Other
    }
}

/// Builds the linked statement chain for one block of sibling file elements
/// (spec §4.7): skips `Void`, groups `if`/`else if`/`else` section runs into
/// one [`ConditionalStatement`], recognizes `continue if` as an
/// [`InlineConditionStatement`], and dispatches everything else through
/// [`parse_effect`]/[`parse_section`].
pub fn load_items(
    engine: &mut Engine,
    elements: &[FileElement],
    state: &mut ParserState,
    log: &mut DiagnosticLog,
) -> Option<StmtHandle> {
    let mut stmts: Vec<StmtHandle> = Vec::new();
    let mut i = 0;

    while i < elements.len() {
        match &elements[i] {
            FileElement::Void { .. } => {
                i += 1;
            }
            FileElement::Simple { line, text } => {
                if let Some(stmt) = parse_simple(engine, *line, text, state, log) {
                    stmts.push(stmt);
                }
                i += 1;
            }
            FileElement::Section { line, header, children } => match classify_header(header) {
                HeaderKind::If(condition) => {
                    let mut branches = vec![ConditionalBranch {
                        condition: parse_boolean_expression(engine, condition, ConditionalMode::Must, state, log, *line),
                        body: log.recurse("matching", |log| load_items(engine, children, state, log)),
                    }];
                    i += 1;
                    i = consume_else_chain(engine, elements, i, state, log, &mut branches);
                    stmts.push(Box::new(ConditionalStatement::new(branches)));
                }
                HeaderKind::ElseIf(_) | HeaderKind::Else => {
                    log.error(
                        ErrorKind::StructureError,
                        *line,
                        "An 'else' must be placed after an 'if' or an 'else if'",
                    );
                    i += 1;
                }
                HeaderKind::Other => {
                    if let Some(stmt) = parse_section_with_body(engine, *line, header, children, state, log) {
                        stmts.push(stmt);
                    }
                    i += 1;
                }
            },
        }
    }

    let mut next: Option<StmtHandle> = None;
    for mut stmt in stmts.into_iter().rev() {
        stmt.set_next(next.take());
        next = Some(stmt);
    }
    next
}

/// Consumes trailing `else if`/`else` siblings (skipping `Void`s between
/// them) into `branches`, returning the index just past the last one
/// consumed.
fn consume_else_chain(
    engine: &mut Engine,
    elements: &[FileElement],
    mut i: usize,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
    branches: &mut Vec<ConditionalBranch>,
) -> usize {
    loop {
        let mut j = i;
        while matches!(elements.get(j), Some(FileElement::Void { .. })) {
            j += 1;
        }
        match elements.get(j) {
            Some(FileElement::Section { line, header, children }) => match classify_header(header) {
                HeaderKind::ElseIf(condition) => {
                    branches.push(ConditionalBranch {
                        condition: parse_boolean_expression(engine, condition, ConditionalMode::Must, state, log, *line),
                        body: log.recurse("matching", |log| load_items(engine, children, state, log)),
                    });
                    i = j + 1;
                }
                HeaderKind::Else => {
                    branches.push(ConditionalBranch {
                        condition: None,
                        body: log.recurse("matching", |log| load_items(engine, children, state, log)),
                    });
                    return j + 1;
                }
                _ => return i,
            },
            _ => return i,
        }
    }
}

fn parse_simple(
    engine: &mut Engine,
    line: u32,
    text: &str,
    state: &mut ParserState,
    log: &mut DiagnosticLog,
) -> Option<StmtHandle> {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("continue if ") {
        let condition_src = text["continue if ".len()..].trim();
        let condition = parse_boolean_expression(engine, condition_src, ConditionalMode::Must, state, log, line)?;
        return Some(Box::new(InlineConditionStatement::new(condition, state.current_statement_scope())));
    }
    parse_effect(engine, text, state, log, line)
}

fn parse_section_with_body(
    engine: &mut Engine,
    line: u32,
    header: &str,
    children: &[FileElement],
    state: &mut ParserState,
    log: &mut DiagnosticLog,
) -> Option<StmtHandle> {
    let (mut stmt, class) = parse_section_with_class(engine, header, state, log, line)?;
    state.push_statement_scope(class);
    let body = log.recurse("matching", |log| load_items(engine, children, state, log));
    state.pop_statement_scope();
    if let Some(section) = stmt.as_section_mut() {
        section.accept_children(body);
    } else {
        log.error(ErrorKind::StructureError, line, "registered section is missing a body hook");
    }
    Some(stmt)
}
