//! Script-load configuration (SPEC_FULL.md "Configuration"): a small struct
//! passed to `get_or_load_script`, constructed directly by a host or parsed
//! from a `fableforge.toml` the same way `freddiehaddad-oxidized` parses its
//! editor config with `toml`.

use fableforge_core::class::ClassId;
use fableforge_core::interner::Symbol;
use serde::Deserialize;
use std::collections::HashSet;

/// Options threaded through one `get_or_load_script`/`load_script` call.
///
/// `restricted_syntaxes` seeds the parser's restricted-syntax stack (spec.md
/// §9 "restricted-syntaxes") with classes the host wants off by default for
/// every script, independent of whatever a section's own body restricts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptLoadOptions {
    /// Bounds nested `load_items`/`parse_boolean_expression` recursion so a
    /// pathologically deep script can't blow the call stack. `0` means no
    /// bound is enforced.
    pub max_recursion_depth: u32,
    /// Class names, resolved against an `Engine`'s registered types at load
    /// time, that are restricted for the whole script from the start.
    pub restricted_syntaxes: Vec<String>,
    /// Added to every registered event's `loading_priority` before the
    /// descending sort in spec.md §4.8 step 5 — lets a host nudge one
    /// script's triggers earlier or later without touching registrations.
    pub extra_trigger_priority_offset: i32,
}

impl Default for ScriptLoadOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 0,
            restricted_syntaxes: Vec::new(),
            extra_trigger_priority_offset: 0,
        }
    }
}

impl ScriptLoadOptions {
    /// Parses a `fableforge.toml` document. Unknown keys are rejected by
    /// `toml`'s default strictness, matching the teacher's config loading.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Resolves `restricted_syntaxes` against an already-interned set of
    /// class names, skipping any name the engine doesn't recognize (a typo
    /// in a config file shouldn't be fatal — it just restricts nothing).
    pub fn restricted_classes(&self, resolve: impl Fn(&str) -> Option<ClassId>) -> HashSet<Symbol> {
        self.restricted_syntaxes.iter().filter_map(|name| resolve(name)).collect()
    }
}
