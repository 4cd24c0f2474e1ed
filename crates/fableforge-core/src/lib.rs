//! Core data model for the fableforge scripting DSL.
//!
//! This crate holds the shapes every other crate builds on: scripts and
//! triggers, the statement/expression capability sets, the pattern
//! language's parsed form, and the registration records a syntax registry
//! indexes. It intentionally contains no matching logic and no script
//! I/O — those live in `fableforge-syntax` and `fableforge-loader`
//! respectively, so that registering new syntax (a host "addon" crate's
//! only real dependency) doesn't pull in the whole engine.

pub mod class;
pub mod diagnostics;
pub mod event;
pub mod expr;
pub mod interner;
pub mod match_context;
pub mod parser_state;
pub mod pattern;
pub mod registry_info;
pub mod script;
pub mod statement;
pub mod value;

pub use class::{ClassId, PatternType, Type};
pub use event::{Conditional, ConditionalMode, EventBus, EventContext, TriggerId};
pub use expr::{Expression, ExprHandle};
pub use match_context::MatchContext;
pub use parser_state::ParserState;
pub use pattern::Pattern;
pub use registry_info::{EventInfo, ExpressionInfo, SyntaxInfo};
pub use script::{Script, Trigger};
pub use statement::{
    ConditionalBranch, ConditionalStatement, InlineConditionStatement, SectionBody, Statement,
    StmtHandle, WalkResult,
};
pub use value::Value;
