//! Parser state: the stack-like contextual flags active during parsing
//! (spec §3 `ParserState`).

use crate::class::ClassId;
use std::collections::HashSet;

/// Push/pop discipline across section recursion (spec §4.7, §5 "Within one
/// section body, children are parsed and linked in source order").
#[derive(Debug, Clone, Default)]
pub struct ParserState {
    current_event: Option<ClassId>,
    restricted_syntaxes: HashSet<ClassId>,
    /// Stack of statement chains currently being built, innermost last —
    /// used by `continue if` / inline conditionals to find "the statement
    /// this line continues" without threading an explicit parameter
    /// through every parse call.
    current_statement_stack: Vec<ClassId>,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_event(event_class: ClassId) -> Self {
        Self {
            current_event: Some(event_class),
            ..Self::default()
        }
    }

    /// Seeds the restricted-syntax set a fresh state starts with (used by
    /// the loader's `ScriptLoadOptions.restricted_syntaxes`). A no-op when
    /// `classes` is empty, same as never restricting at all.
    pub fn with_restricted(mut self, classes: HashSet<ClassId>) -> Self {
        if !classes.is_empty() {
            self.restricted_syntaxes = classes;
        }
        self
    }

    pub fn current_event(&self) -> Option<ClassId> {
        self.current_event
    }

    pub fn set_current_event(&mut self, class: ClassId) {
        self.current_event = Some(class);
    }

    pub fn is_restricted(&self, class: ClassId) -> bool {
        !self.restricted_syntaxes.is_empty() && !self.restricted_syntaxes.contains(&class)
    }

    /// Narrows the allowed syntax classes to exactly this set, returning a
    /// guard that restores the previous set on drop — the push/pop
    /// discipline the spec calls for, expressed without a manual
    /// pop-on-every-return-path.
    pub fn restrict<'a>(&'a mut self, classes: HashSet<ClassId>) -> RestrictGuard<'a> {
        let previous = std::mem::replace(&mut self.restricted_syntaxes, classes);
        RestrictGuard {
            state: self,
            previous: Some(previous),
        }
    }

    pub fn push_statement_scope(&mut self, class: ClassId) {
        self.current_statement_stack.push(class);
    }

    pub fn pop_statement_scope(&mut self) {
        self.current_statement_stack.pop();
    }

    pub fn current_statement_scope(&self) -> Option<ClassId> {
        self.current_statement_stack.last().copied()
    }
}

pub struct RestrictGuard<'a> {
    state: &'a mut ParserState,
    previous: Option<HashSet<ClassId>>,
}

impl Drop for RestrictGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.state.restricted_syntaxes = previous;
        }
    }
}

impl std::ops::Deref for RestrictGuard<'_> {
    type Target = ParserState;
    fn deref(&self) -> &ParserState {
        self.state
    }
}

impl std::ops::DerefMut for RestrictGuard<'_> {
    fn deref_mut(&mut self) -> &mut ParserState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::Symbol;

    #[test]
    fn restrict_guard_restores_previous_set_on_drop() {
        let mut state = ParserState::new();
        let a = Symbol::from_raw(1);
        let b = Symbol::from_raw(2);
        assert!(!state.is_restricted(a));
        {
            let mut guard = state.restrict(HashSet::from([a]));
            assert!(!guard.is_restricted(a));
            assert!(guard.is_restricted(b));
        }
        assert!(!state.is_restricted(a));
        assert!(!state.is_restricted(b));
    }
}
