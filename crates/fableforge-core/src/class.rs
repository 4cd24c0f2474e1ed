//! The type system: `Type<T>` descriptors, literal parsing, and converters.
//!
//! Classes are opaque, registry-assigned tags (spec §3 `Type<T>`), not Rust
//! types — a type's Rust representation lives behind `Value::Object` at
//! runtime. This mirrors the source system's reliance on class-tag
//! dispatch rather than static generics, chosen deliberately per the
//! design notes: a registry that takes `dyn` factories and tags is easier
//! to reason about in Rust than trying to thread a type parameter through
//! every registered syntax kind.

use crate::interner::Symbol;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Opaque handle to a registered class (e.g. "number", "text", "player").
pub type ClassId = Symbol;

/// Parses a literal token into a `Value` of this class, or `None` if the
/// text isn't a literal of this type.
pub type LiteralParser = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// Renders a value of this class back to source-like text, `debug` controls
/// verbosity (spec §3 `Expression::to_string(ctx, debug)`).
pub type ToStringFn = Arc<dyn Fn(&Value, bool) -> String + Send + Sync>;

/// Arithmetic table entry: given two operand classes, produce the result
/// class and a function combining two values of those classes.
#[derive(Clone)]
pub struct ArithmeticOp {
    pub result_class: ClassId,
    pub apply: Arc<dyn Fn(&Value, &Value) -> Option<Value> + Send + Sync>,
}

/// A registered type (spec §3 `Type<T>`).
#[derive(Clone)]
pub struct Type {
    pub class: ClassId,
    pub base_name: String,
    pub plural_form: String,
    pub literal_parser: Option<LiteralParser>,
    pub to_string: Option<ToStringFn>,
    /// Keyed by operator symbol, e.g. "+", "-".
    pub arithmetic: HashMap<String, ArithmeticOp>,
}

impl std::fmt::Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Type")
            .field("base_name", &self.base_name)
            .field("plural_form", &self.plural_form)
            .field("has_literal_parser", &self.literal_parser.is_some())
            .finish()
    }
}

impl Type {
    pub fn new(class: ClassId, base_name: impl Into<String>, plural_form: impl Into<String>) -> Self {
        Self {
            class,
            base_name: base_name.into(),
            plural_form: plural_form.into(),
            literal_parser: None,
            to_string: None,
            arithmetic: HashMap::new(),
        }
    }

    pub fn with_literal_parser(mut self, parser: LiteralParser) -> Self {
        self.literal_parser = Some(parser);
        self
    }

    pub fn with_to_string(mut self, to_string: ToStringFn) -> Self {
        self.to_string = Some(to_string);
        self
    }

    /// Registers one operator symbol's arithmetic entry, e.g.
    /// `with_arithmetic("+", ArithmeticOp { .. })` (spec §3 `Type<T>`
    /// `arithmetic?`). The concrete `+`/`-` effects that consult this table
    /// are a host concern (spec.md Non-goals "arithmetic tables"); this
    /// crate only carries the data shape a host's arithmetic effect looks
    /// up through [`Type::arithmetic_op`].
    pub fn with_arithmetic(mut self, operator: impl Into<String>, op: ArithmeticOp) -> Self {
        self.arithmetic.insert(operator.into(), op);
        self
    }

    pub fn parse_literal(&self, text: &str) -> Option<Value> {
        self.literal_parser.as_ref().and_then(|p| p(text))
    }

    pub fn arithmetic_op(&self, operator: &str) -> Option<&ArithmeticOp> {
        self.arithmetic.get(operator)
    }
}

/// Converts values between classes (spec §4.4 step 2, §6
/// `Converters.converter_exists` / `convert`).
#[derive(Default)]
pub struct Converters {
    table: HashMap<(ClassId, ClassId), Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>>,
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        from: ClassId,
        to: ClassId,
        convert: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) {
        self.table.insert((from, to), Arc::new(convert));
    }

    pub fn converter_exists(&self, from: ClassId, to: ClassId) -> bool {
        from == to || self.table.contains_key(&(from, to))
    }

    pub fn convert(&self, value: &Value, from: ClassId, to: ClassId) -> Option<Value> {
        if from == to {
            return Some(value.clone());
        }
        self.table.get(&(from, to)).and_then(|f| f(value))
    }
}

/// `(type, single?)` — the expected shape at an expression placeholder
/// (spec §3 `PatternType<T>`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternType {
    pub class: ClassId,
    pub single: bool,
}

impl PatternType {
    pub fn single(class: ClassId) -> Self {
        Self { class, single: true }
    }

    pub fn plural(class: ClassId) -> Self {
        Self { class, single: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::Symbol;

    #[test]
    fn arithmetic_op_looks_up_by_registered_operator_symbol() {
        let number = Symbol::from_raw(0);
        let ty = Type::new(number, "number", "numbers").with_arithmetic(
            "+",
            ArithmeticOp {
                result_class: number,
                apply: Arc::new(|a, b| match (a, b) {
                    (Value::Number(a), Value::Number(b)) => Some(Value::Number(a + b)),
                    _ => None,
                }),
            },
        );
        assert!(ty.arithmetic_op("+").is_some());
        assert!(ty.arithmetic_op("-").is_none());
    }
}
