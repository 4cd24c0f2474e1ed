//! Parser entry points (spec §4.4, §4.5, §4.6, §4.7, §4.8): the pieces that
//! walk an [`Engine`](crate::engine::Engine)'s registries against source
//! text and produce expressions, statements, and triggers.

mod expression;
mod list;
mod statement;
mod trigger;

pub use expression::{parse_boolean_expression, parse_expression, parse_literal, Dispatcher};
pub use statement::{dangling_conditional_header, load_items, parse_effect, parse_section};
pub use trigger::{parse_trigger, parse_trigger_restricted, UnloadedTrigger};
