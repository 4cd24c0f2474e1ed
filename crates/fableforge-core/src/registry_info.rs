//! Registration records (spec §3 `SyntaxInfo<C>`).
//!
//! These are pure data: the registry that stores, orders, and dispatches
//! against them lives in `fableforge-syntax`. Keeping the struct shapes
//! here lets both the registry and anything constructing registrations
//! (a host application's "addon" crate) depend on one small crate instead
//! of the whole matching engine.

use crate::class::{ClassId, PatternType};
use crate::expr::{ExprHandle, Expression};
use crate::pattern::Pattern;
use crate::statement::StmtHandle;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh, uninitialized instance for one match attempt (spec §9
/// "store an explicit factory alongside each `SyntaxInfo`... eliminating
/// runtime reflection").
pub type ExpressionFactory = Arc<dyn Fn() -> Box<dyn Expression> + Send + Sync>;
pub type StatementFactory = Arc<dyn Fn() -> StmtHandle + Send + Sync>;
pub type EventFactory = Arc<dyn Fn() -> Box<dyn EventInstance> + Send + Sync>;

/// A parsed trigger event instance (spec §3 "Trigger ... owns one `event`
/// instance"). Execution/dispatch against the live bus is a host concern;
/// this crate only needs the registration-time shape.
pub trait EventInstance: std::fmt::Debug + Send + Sync {
    fn init(&mut self, captures: Vec<ExprHandle>) -> bool;
    fn handled_contexts(&self) -> &[ClassId];
}

/// Free-standing data shared by every registration kind (spec §3
/// `SyntaxInfo<C>`): `(registerer, class_tag, priority, patterns,
/// optional_factory, data_bag)`.
#[derive(Clone)]
pub struct SyntaxInfo {
    pub registerer: String,
    pub class: ClassId,
    pub priority: i32,
    pub patterns: Vec<Pattern>,
    pub data_bag: HashMap<String, String>,
}

impl std::fmt::Debug for SyntaxInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxInfo")
            .field("registerer", &self.registerer)
            .field("priority", &self.priority)
            .field("pattern_count", &self.patterns.len())
            .finish()
    }
}

/// `ExpressionInfo` extends `SyntaxInfo` with `return_type, is_single`
/// (spec §3).
#[derive(Clone)]
pub struct ExpressionInfo {
    pub syntax: SyntaxInfo,
    pub return_type: ClassId,
    pub is_single: bool,
    pub factory: ExpressionFactory,
}

impl std::fmt::Debug for ExpressionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionInfo")
            .field("syntax", &self.syntax)
            .field("is_single", &self.is_single)
            .finish()
    }
}

/// An effect or section registration (no return-type coercion, spec §4.6).
#[derive(Clone)]
pub struct StatementInfo {
    pub syntax: SyntaxInfo,
    pub factory: StatementFactory,
    /// Set for section registrations: sections additionally recurse into
    /// their body (spec §4.6 "Section match additionally calls
    /// `load_section`").
    pub is_section: bool,
}

impl std::fmt::Debug for StatementInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementInfo")
            .field("syntax", &self.syntax)
            .field("is_section", &self.is_section)
            .finish()
    }
}

/// `EventInfo` extends `SyntaxInfo` with `handled_contexts` (spec §3) and
/// carries the `loading_priority` used to order trigger finalization
/// (spec §4.8 step 5, GLOSSARY "Loading priority"). Defaults to `0` when a
/// registration doesn't declare one (SPEC_FULL.md "SUPPLEMENTED").
#[derive(Clone)]
pub struct EventInfo {
    pub syntax: SyntaxInfo,
    pub handled_contexts: Vec<ClassId>,
    pub loading_priority: i32,
    pub factory: EventFactory,
}

impl std::fmt::Debug for EventInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventInfo")
            .field("syntax", &self.syntax)
            .field("loading_priority", &self.loading_priority)
            .finish()
    }
}

/// A comparator registration (spec §3 "comparators" syntax-registry kind).
/// Concrete comparison logic (the `is`/`is not` condition that consults it)
/// is a host concern (spec.md Non-goals "comparators"); this crate only
/// catalogs that one was registered between `left_class` and `right_class`,
/// the same boundary `Converters` draws around concrete conversion
/// functions.
#[derive(Clone)]
pub struct ComparatorInfo {
    pub syntax: SyntaxInfo,
    pub left_class: ClassId,
    pub right_class: ClassId,
}

impl std::fmt::Debug for ComparatorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparatorInfo")
            .field("syntax", &self.syntax)
            .field("left_class", &self.left_class)
            .field("right_class", &self.right_class)
            .finish()
    }
}

/// Pattern type a registration declares for one of its placeholders — used
/// by `Pattern::parse`'s type-name resolver.
#[derive(Clone, Copy, Debug)]
pub struct NamedPatternType {
    pub name: &'static str,
    pub pattern_type: PatternType,
}
