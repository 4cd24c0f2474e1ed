//! The engine handle (spec §9 "pass an explicit engine handle into the
//! parser entry points rather than reaching for ambient global state"):
//! bundles the type registry, converters, and the three syntax registries
//! that a parse needs to consult.

use crate::registry::Registry;
use fableforge_core::class::{ClassId, Converters, PatternType, Type};
use fableforge_core::pattern::{Pattern, PatternSyntaxError};
use fableforge_core::registry_info::{ComparatorInfo, EventInfo, ExpressionInfo, NamedPatternType, StatementInfo};
use indexmap::IndexMap;

#[derive(Default)]
pub struct Engine {
    /// Keyed by `ClassId`, ordered by registration — useful for a CLI
    /// listing or debug dump where source order is more legible than hash
    /// order.
    pub types: IndexMap<ClassId, Type>,
    pub converters: Converters,
    pub expressions: Registry<ExpressionInfo>,
    /// Effects and sections share one registry (spec §4.6: both are plain
    /// `Statement`s, sections just additionally implement `SectionBody`).
    pub statements: Registry<StatementInfo>,
    pub events: Registry<EventInfo>,
    /// Catalogs which class pairs have a registered comparator (spec §3
    /// "syntax registry" lists `comparators` alongside `converters`). The
    /// `is`/`is not` condition that would consult this is a host's own
    /// concrete syntax element (spec.md Non-goals), so nothing in this
    /// crate reads from it yet — it exists so a host can register and query
    /// one the same way it does `expressions`/`statements`/`events`.
    pub comparators: Registry<ComparatorInfo>,
    pattern_types: Vec<NamedPatternType>,
    /// The class that `"quoted"` text literals parse to (spec §4.4 step 2
    /// "a separate `VariableString` recognizer"). `None` until a host
    /// registers its string type; quoted literals simply don't match
    /// until then, the same as any other unregistered type.
    string_class: Option<ClassId>,
    /// The class that the literal words `true`/`false` parse to (spec §4.4
    /// "Boolean expression parsing ... plus handling of the literal words
    /// true/false"). `None` until a host registers its boolean type.
    bool_class: Option<ClassId>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, ty: Type) {
        self.types.insert(ty.class, ty);
    }

    /// Declares which registered class backs `"quoted"` string literals
    /// (spec §4.4 step 2).
    pub fn set_string_class(&mut self, class: ClassId) {
        self.string_class = Some(class);
    }

    pub fn string_class(&self) -> Option<ClassId> {
        self.string_class
    }

    /// Declares which registered class backs the literal words `true`/
    /// `false` (spec §4.4).
    pub fn set_bool_class(&mut self, class: ClassId) {
        self.bool_class = Some(class);
    }

    pub fn bool_class(&self) -> Option<ClassId> {
        self.bool_class
    }

    /// Makes `%name%` resolvable in pattern source strings (spec §6).
    pub fn register_pattern_type(&mut self, named: NamedPatternType) {
        self.pattern_types.push(named);
    }

    pub fn resolve_pattern_type(&self, name: &str) -> Option<PatternType> {
        self.pattern_types
            .iter()
            .find(|n| n.name == name)
            .map(|n| n.pattern_type)
    }

    /// Parses a registration's raw pattern source against this engine's
    /// known placeholder types (spec §6).
    pub fn compile_pattern_source(&self, source: &str) -> Result<Pattern, PatternSyntaxError> {
        Pattern::parse(source, |name| self.resolve_pattern_type(name))
    }

    pub fn type_of(&self, class: ClassId) -> Option<&Type> {
        self.types.get(&class)
    }

    /// Resolves a registered type's `base_name` back to its `ClassId`
    /// (used by the loader to turn a `ScriptLoadOptions.restricted_syntaxes`
    /// name list into the `ClassId`s `ParserState` actually tracks).
    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.types.values().find(|ty| ty.base_name == name).map(|ty| ty.class)
    }

    /// Whether a comparator was registered between `left`/`right` (in either
    /// order — `is`/`is not` conditions are symmetric).
    pub fn comparator_exists(&self, left: ClassId, right: ClassId) -> bool {
        (0..self.comparators.len()).filter_map(|id| self.comparators.get(id)).any(|entry| {
            (entry.info.left_class == left && entry.info.right_class == right)
                || (entry.info.left_class == right && entry.info.right_class == left)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fableforge_core::interner::Symbol;
    use fableforge_core::registry_info::SyntaxInfo;
    use std::collections::HashMap;

    #[test]
    fn comparator_exists_is_order_independent() {
        let mut engine = Engine::new();
        let number = Symbol::from_raw(0);
        let text = Symbol::from_raw(1);
        engine
            .comparators
            .register(ComparatorInfo {
                syntax: SyntaxInfo {
                    registerer: "test".to_string(),
                    class: Symbol::from_raw(2),
                    priority: 0,
                    patterns: Vec::new(),
                    data_bag: HashMap::new(),
                },
                left_class: number,
                right_class: text,
            })
            .unwrap();
        assert!(engine.comparator_exists(number, text));
        assert!(engine.comparator_exists(text, number));
        assert!(!engine.comparator_exists(number, number));
    }
}
