//! Statements: nodes in a trigger's linked body (spec §3 `Statement`).

use crate::event::EventContext;
use crate::expr::ExprHandle;
use crate::match_context::MatchContext;
use std::fmt;

pub type StmtHandle = Box<dyn Statement>;

/// What running a statement reports back to its caller. Execution itself
/// is out of scope (spec.md); this exists only so `walk`'s signature is
/// complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkResult {
    Continue,
    Stop,
}

/// Spec §3 `Statement` capability set: `{init, walk, set_next}`.
pub trait Statement: fmt::Debug + Send + Sync {
    fn init(&mut self, captures: Vec<ExprHandle>, pattern_index: usize, parse_result: &MatchContext) -> bool;

    /// Out-of-scope execution hook; a host application's interpreter
    /// drives this against a live `EventContext`.
    fn walk(&self, ctx: &dyn EventContext) -> WalkResult;

    fn set_next(&mut self, next: Option<StmtHandle>);

    fn next(&self) -> Option<&StmtHandle>;

    /// Statements that are also sections (block statements) override this
    /// to expose `SectionBody`, avoiding a second, parallel trait-object
    /// hierarchy (spec §9 "avoid deep inheritance trees; prefer
    /// composition + a vtable-style dispatch").
    fn as_section_mut(&mut self) -> Option<&mut dyn SectionBody> {
        None
    }
}

/// Extra capability for statements that are block statements (spec §3:
/// "Sections (block statements) additionally carry a child chain and a
/// `load_section(body, parser_state, logger)` operation").
pub trait SectionBody {
    /// Installs this section's already-linked child chain. The recursion
    /// that builds it (`load_items`, spec §4.7) lives in `fableforge-syntax`
    /// and would otherwise create a crate cycle, so this only accepts the
    /// finished result — the same `Option<StmtHandle>` chain-head shape a
    /// `Trigger` stores.
    fn accept_children(&mut self, head: Option<StmtHandle>);
}

/// One `if`/`else if`/`else` arm: `condition` is `None` for a trailing
/// `else` (spec §4.7 `if`/`else-if`/`else` construction).
#[derive(Debug)]
pub struct ConditionalBranch {
    pub condition: Option<ExprHandle>,
    pub body: Option<StmtHandle>,
}

/// The built-in control statement `load_items` produces from an `if` /
/// `else if` / `else` run of sibling sections (spec §4.7). This is a
/// dispatcher-internal statement kind, not a host-registered one, so it
/// lives alongside the literal/variable built-ins in this crate rather than
/// in `fableforge-syntax`.
#[derive(Debug)]
pub struct ConditionalStatement {
    pub branches: Vec<ConditionalBranch>,
    next: Option<StmtHandle>,
}

impl ConditionalStatement {
    pub fn new(branches: Vec<ConditionalBranch>) -> Self {
        Self { branches, next: None }
    }
}

impl Statement for ConditionalStatement {
    fn init(&mut self, _captures: Vec<ExprHandle>, _pattern_index: usize, _parse_result: &MatchContext) -> bool {
        true
    }

    fn walk(&self, _ctx: &dyn EventContext) -> WalkResult {
        WalkResult::Continue
    }

    fn set_next(&mut self, next: Option<StmtHandle>) {
        self.next = next;
    }

    fn next(&self) -> Option<&StmtHandle> {
        self.next.as_ref()
    }
}

/// A standalone `continue if <condition>` line (spec §4.7): not a block,
/// just a guard evaluated before the rest of the chain runs.
#[derive(Debug)]
pub struct InlineConditionStatement {
    pub condition: ExprHandle,
    /// The class of the section this `continue if` is nested directly
    /// under, if any (spec §3 `ParserState.current_statement_stack`:
    /// "used by `continue if` ... to find the statement this line
    /// continues"). Execution deciding what "continuing" means for a given
    /// enclosing class is a host concern; this is recorded for that host.
    pub enclosing_section: Option<crate::class::ClassId>,
    next: Option<StmtHandle>,
}

impl InlineConditionStatement {
    pub fn new(condition: ExprHandle, enclosing_section: Option<crate::class::ClassId>) -> Self {
        Self {
            condition,
            enclosing_section,
            next: None,
        }
    }
}

impl Statement for InlineConditionStatement {
    fn init(&mut self, _captures: Vec<ExprHandle>, _pattern_index: usize, _parse_result: &MatchContext) -> bool {
        true
    }

    fn walk(&self, _ctx: &dyn EventContext) -> WalkResult {
        WalkResult::Continue
    }

    fn set_next(&mut self, next: Option<StmtHandle>) {
        self.next = next;
    }

    fn next(&self) -> Option<&StmtHandle> {
        self.next.as_ref()
    }
}
