//! The pattern-matching syntax engine: turns source text into the
//! `fableforge-core` data model.
//!
//! Layering mirrors the dependency direction: [`scan`] and [`elements`] are
//! pure text processing with no knowledge of registrations; [`pattern_match`]
//! walks a compiled pattern but defers `%type%` placeholders to whoever
//! implements [`pattern_match::PlaceholderResolver`]; [`registry`] holds
//! registrations; [`dispatch`] ties pattern matching and the registry
//! together into the actual expression/statement/trigger parsers; [`engine`]
//! is the handle threading through all of it.

pub mod dispatch;
pub mod elements;
pub mod engine;
pub mod pattern_match;
pub mod registry;
pub mod scan;

pub use dispatch::{
    dangling_conditional_header, load_items, parse_boolean_expression, parse_effect, parse_expression, parse_section,
    parse_trigger, parse_trigger_restricted, UnloadedTrigger,
};
pub use elements::{build_file_tree, FileElement};
pub use engine::Engine;
