//! External collaborator interfaces: the runtime event context and event
//! bus (spec §6). The core and syntax engine only need the *shapes* of
//! these — their implementations belong to the host application per
//! spec.md's explicit scope (`Explicitly out of scope`).

use crate::class::ClassId;
use std::fmt;

/// A runtime trigger context ("the event occurrence passed to a trigger",
/// GLOSSARY). Execution against live contexts is out of scope; this trait
/// exists only so `Expression::get_values`/`Statement::walk` have a
/// parameter to be generic over.
pub trait EventContext: fmt::Debug {
    /// The registered class of the concrete event this context represents.
    fn event_class(&self) -> ClassId;
}

/// What the runtime dispatcher needs from this crate (spec §6
/// `EventBus.register` / `EventBus.call`). Execution is out of scope; this
/// is the seam a host application implements.
pub trait EventBus {
    fn register(&mut self, trigger_id: TriggerId, event_class: ClassId);
}

/// Opaque identity for a loaded trigger, handed to the event bus on
/// registration (spec §4.8 step 6 `event.register(trigger, event_bus)`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TriggerId(pub u64);

/// The three-way conditional-acceptance mode for boolean expression parsing
/// (spec §4.4 "Boolean expression parsing").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionalMode {
    /// The expression must be conditional-capable.
    Must,
    /// The expression must not be conditional-capable.
    MustNot,
    /// Either is acceptable.
    May,
}

/// Marker capability: an expression that may stand alone as a boolean
/// condition (spec §4.4 "a `Conditional` capability marker").
pub trait Conditional {}
