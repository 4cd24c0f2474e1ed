//! Trigger parsing (spec §4.8 step 1-4): matches a top-level section's
//! header against the event registry and builds its body with a fresh,
//! event-scoped [`ParserState`].

use super::expression::Dispatcher;
use crate::elements::FileElement;
use crate::engine::Engine;
use crate::pattern_match::match_pattern;
use fableforge_core::diagnostics::{DiagnosticLog, ErrorKind};
use fableforge_core::match_context::MatchContext;
use fableforge_core::class::ClassId;
use fableforge_core::parser_state::ParserState;
use fableforge_core::registry_info::EventInstance;
use std::collections::HashSet;

/// A parsed event header, staged for body parsing (spec §3 `UnloadedTrigger`,
/// §4.8 step 4 "returns an `UnloadedTrigger` (body parsing is deferred)").
///
/// Deferred on purpose: step 5 sorts these by descending `loading_priority`
/// *before* step 6 parses any bodies, so a higher-priority trigger's
/// `load_section` runs strictly before a lower-priority one's even when the
/// lower one appears first in the file (spec §8 property 8, §5 "Within one
/// script, trigger finalization respects descending `loading_priority`").
/// Building the body here instead — eagerly, during the cold parse — would
/// make body-parsing order match source order, not priority order.
pub struct UnloadedTrigger<'a> {
    pub event: Box<dyn EventInstance>,
    pub children: &'a [FileElement],
    pub line: u32,
    pub state: ParserState,
    pub loading_priority: i32,
}

pub fn parse_trigger<'a>(
    engine: &mut Engine,
    header: &str,
    children: &'a [FileElement],
    line: u32,
    log: &mut DiagnosticLog,
) -> Option<UnloadedTrigger<'a>> {
    parse_trigger_restricted(engine, header, children, line, log, &HashSet::new())
}

/// As [`parse_trigger`], but the event's body starts with `restricted_seed`
/// already in its restricted-syntax set (a loader-supplied floor seeded
/// from `ScriptLoadOptions.restricted_syntaxes` — spec §9 "restricted
/// syntaxes", SPEC_FULL.md "Configuration").
pub fn parse_trigger_restricted<'a>(
    engine: &mut Engine,
    header: &str,
    children: &'a [FileElement],
    line: u32,
    log: &mut DiagnosticLog,
    restricted_seed: &HashSet<ClassId>,
) -> Option<UnloadedTrigger<'a>> {
    let text = header.trim().trim_end_matches(':').trim();
    let candidate_ids: Vec<usize> = engine.events.candidates().iter().map(|e| e.id).collect();

    for id in candidate_ids {
        let (patterns, factory, handled_contexts, loading_priority) = {
            let entry = engine.events.get(id)?;
            (
                entry.patterns.clone(),
                entry.info.factory.clone(),
                entry.info.handled_contexts.clone(),
                entry.info.loading_priority,
            )
        };

        let mut state = match handled_contexts.first() {
            Some(&class) => ParserState::for_event(class),
            None => ParserState::new(),
        }
        .with_restricted(restricted_seed.clone());

        for pattern in &patterns {
            let mut ctx = MatchContext::new();
            let checkpoint = log.checkpoint();
            let matched_end = log.recurse("matching", |log| {
                match_pattern(
                    pattern,
                    text,
                    0,
                    &mut ctx,
                    &mut Dispatcher { engine: &mut *engine, state: &mut state, log, line },
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
            let initialized = log.recurse("initializing", |_| instance.init(captures));
            if !initialized {
                log.discard_since(checkpoint);
                continue;
            }

            engine.events.mark_matched(id);
            return Some(UnloadedTrigger {
                event: instance,
                children,
                line,
                state,
                loading_priority,
            });
        }
    }

    log.error(ErrorKind::NoMatch, line, format!("no event matches '{text}'"));
    None
}
