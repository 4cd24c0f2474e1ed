//! String interning for class/type/event tags.
//!
//! Syntax classes ("the tag that names a registered expression/effect/event
//! kind") are compared constantly during dispatch — once per candidate in
//! the registry, per match attempt. Interning them into a cheap `Symbol`
//! makes that an integer comparison instead of a string comparison.

use std::collections::HashMap;

/// A lightweight handle to an interned string.
///
/// Symbols are ordered by insertion order, not lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Construct from a raw index. Only meaningful for symbols produced by
    /// the same `Interner` that handed out the index.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// String interner. Deduplicates strings and returns cheap `Symbol` handles.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    map: HashMap<String, Symbol>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its `Symbol`. Repeated interning of the
    /// same text returns the same symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.to_owned());
        self.map.insert(s.to_owned(), sym);
        sym
    }

    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }

    #[inline]
    pub fn try_resolve(&self, sym: Symbol) -> Option<&str> {
        self.strings.get(sym.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedupes() {
        let mut interner = Interner::new();
        let a = interner.intern("number");
        let b = interner.intern("number");
        let c = interner.intern("text");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "number");
        assert_eq!(interner.resolve(c), "text");
    }

    #[test]
    fn try_resolve_out_of_range() {
        let interner = Interner::new();
        assert_eq!(interner.try_resolve(Symbol::from_raw(0)), None);
    }
}
