//! The syntax registry (spec §4.3): a priority-ordered table of
//! registrations, one per expression/effect/section/event, with patterns
//! compiled once at insertion time and a recency list layered on top so a
//! registration that just matched is tried first next time.

mod recency;


pub use recency::RecencyList;

use crate::pattern_match::CompiledPattern;
use fableforge_core::class::ClassId;
use fableforge_core::registry_info::SyntaxInfo;
use std::sync::Arc;

/// Runs at registration time, given the class a registration declares, and
/// may veto it outright (spec §9's replacement for exceptions thrown from
/// `init`/constructors: a registry-wide check rather than a per-call try).
pub type InitValidator = Arc<dyn Fn(ClassId) -> bool + Send + Sync>;

/// One registered entry together with its compiled patterns. `id` is the
/// entry's permanent position in insertion order — used by [`RecencyList`]
/// so recency records stay valid even though candidate *iteration* order is
/// computed fresh each call.
pub struct Entry<Info> {
    pub id: usize,
    pub info: Info,
    pub patterns: Vec<CompiledPattern>,
}

/// Implemented by every registration-info shape (`ExpressionInfo`,
/// `StatementInfo`, `EventInfo`) so `Registry<Info>` can read the common
/// `SyntaxInfo` fields without knowing which kind it's holding.
pub trait HasSyntaxInfo {
    fn syntax_info(&self) -> &SyntaxInfo;
}

impl HasSyntaxInfo for fableforge_core::registry_info::ExpressionInfo {
    fn syntax_info(&self) -> &SyntaxInfo {
        &self.syntax
    }
}

impl HasSyntaxInfo for fableforge_core::registry_info::StatementInfo {
    fn syntax_info(&self) -> &SyntaxInfo {
        &self.syntax
    }
}

impl HasSyntaxInfo for fableforge_core::registry_info::EventInfo {
    fn syntax_info(&self) -> &SyntaxInfo {
        &self.syntax
    }
}

impl HasSyntaxInfo for fableforge_core::registry_info::ComparatorInfo {
    fn syntax_info(&self) -> &SyntaxInfo {
        &self.syntax
    }
}

pub struct Registry<Info> {
    entries: Vec<Entry<Info>>,
    recency: RecencyList,
    validators: Vec<InitValidator>,
}

impl<Info> Default for Registry<Info> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            recency: RecencyList::new(),
            validators: Vec::new(),
        }
    }
}

impl<Info: HasSyntaxInfo> Registry<Info> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a global veto check, run against a candidate's class before its
    /// patterns are even tried (spec §9 "INIT_VALIDATORS").
    pub fn add_validator(&mut self, validator: InitValidator) {
        self.validators.push(validator);
    }

    /// Registers `info`, compiling its patterns once. Returns the entry id
    /// (stable for the registry's lifetime, used with [`Self::mark_matched`]).
    pub fn register(&mut self, info: Info) -> Result<usize, regex::Error> {
        let patterns = info
            .syntax_info()
            .patterns
            .iter()
            .map(CompiledPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let id = self.entries.len();
        self.entries.push(Entry { id, info, patterns });
        Ok(id)
    }

    /// Candidate entries in try order: recency-touched entries first (most
    /// recent first), then the rest ordered by descending priority, ties
    /// broken by registration order, skipping any entry a validator vetoes.
    pub fn candidates(&self) -> Vec<&Entry<Info>> {
        let mut seen = vec![false; self.entries.len()];
        let mut ordered = Vec::with_capacity(self.entries.len());

        for &id in self.recency.order() {
            if let Some(entry) = self.entries.get(id) {
                if self.passes_validators(entry) {
                    tracing::trace!(entry_id = id, "recency hit");
                    ordered.push(entry);
                }
                seen[id] = true;
            }
        }

        if ordered.is_empty() {
            tracing::trace!("recency miss, falling back to full registry order");
        }

        let mut rest: Vec<&Entry<Info>> = self
            .entries
            .iter()
            .filter(|e| !seen[e.id] && self.passes_validators(e))
            .collect();
        rest.sort_by(|a, b| {
            b.info
                .syntax_info()
                .priority
                .cmp(&a.info.syntax_info().priority)
                .then(a.id.cmp(&b.id))
        });
        ordered.extend(rest);
        ordered
    }

    fn passes_validators(&self, entry: &Entry<Info>) -> bool {
        let class = entry.info.syntax_info().class;
        let passes = self.validators.iter().all(|v| v(class));
        if !passes {
            tracing::debug!(entry_id = entry.id, "init validator vetoed candidate");
        }
        passes
    }

    /// Records that `id` just matched, so it's tried first next time (spec
    /// §4.3 "recently-matched registrations are tried first").
    pub fn mark_matched(&mut self, id: usize) {
        tracing::trace!(entry_id = id, "marking matched, moved to front of recency list");
        self.recency.touch(id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Entry<Info>> {
        self.entries.get(id)
    }
}
