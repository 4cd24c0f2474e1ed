//! Expressions: value producers evaluated at runtime against a context
//! (spec §3 `Expression<T>`).
//!
//! Concrete user expressions are external collaborators; this crate only
//! defines the capability set every expression implementation must honor
//! and the handful of built-in literal/variable forms the matcher itself
//! has to produce (spec §4.4 steps 2-4).

use crate::class::ClassId;
use crate::event::EventContext;
use crate::match_context::MatchContext;
use crate::value::Value;
use std::fmt;

/// A boxed, type-erased expression instance living in a statement chain or
/// nested inside another expression's captures.
pub type ExprHandle = Box<dyn Expression>;

/// Spec §3 `Expression<T>` capability set.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Binds this freshly-constructed instance to what the matcher
    /// captured. Returning `false` means this instance does not accept
    /// the binding and the dispatcher should try the next candidate
    /// pattern (spec §4.4 step 5b).
    fn init(&mut self, captures: Vec<ExprHandle>, pattern_index: usize, parse_result: &MatchContext) -> bool;

    /// Evaluates this expression against a live event context. Execution
    /// is out of scope for this crate; implementations supplied by a host
    /// application fill this in.
    fn get_values(&self, ctx: &dyn EventContext) -> Vec<Value>;

    /// If true, `get_values` returns at most one element (spec §3
    /// invariant).
    fn is_single(&self) -> bool;

    fn return_type(&self) -> ClassId;

    /// Attempts to view this expression as one returning `target` instead
    /// (spec §4.4 step 5c). Returns `None` if no such conversion exists.
    fn convert_to(&self, target: ClassId) -> Option<ExprHandle>;

    fn to_string(&self, ctx: Option<&dyn EventContext>, debug: bool) -> String;

    /// Whether this expression may stand alone as a boolean condition (spec
    /// §4.4 "a `Conditional` capability marker"). Checking this via a vtable
    /// method rather than downcasting to the `Conditional` marker trait
    /// keeps dispatch working uniformly over `Box<dyn Expression>` (spec §9
    /// "prefer composition + a vtable-style dispatch").
    fn is_conditional(&self) -> bool {
        false
    }

    /// If this expression is a `Literal` (GLOSSARY "an expression whose
    /// value is fixed at parse time"), the literal itself — used by list
    /// parsing (spec §4.5 "If every element is a Literal, build a
    /// `LiteralList`... Else, build an `ExpressionList`") to decide which
    /// kind to build without caring how the element was parsed (a plain
    /// `%type%` placeholder can still land on `SimpleLiteral` via step 2's
    /// literal-parse attempt, same as a `%*type%` one).
    fn as_literal(&self) -> Option<&SimpleLiteral> {
        None
    }
}

/// A literal value fixed at parse time (spec §3, §4.4 step 2).
#[derive(Debug, Clone)]
pub struct SimpleLiteral {
    pub class: ClassId,
    pub value: Value,
}

impl Expression for SimpleLiteral {
    fn init(&mut self, _captures: Vec<ExprHandle>, _pattern_index: usize, _parse_result: &MatchContext) -> bool {
        true
    }

    fn get_values(&self, _ctx: &dyn EventContext) -> Vec<Value> {
        vec![self.value.clone()]
    }

    fn is_single(&self) -> bool {
        true
    }

    fn return_type(&self) -> ClassId {
        self.class
    }

    fn convert_to(&self, _target: ClassId) -> Option<ExprHandle> {
        None
    }

    fn to_string(&self, _ctx: Option<&dyn EventContext>, debug: bool) -> String {
        if debug {
            format!("{:?}", self.value)
        } else {
            match &self.value {
                Value::Text(t) => t.clone(),
                Value::Number(n) => n.to_string(),
                Value::Boolean(b) => b.to_string(),
                other => format!("{other:?}"),
            }
        }
    }

    fn as_literal(&self) -> Option<&SimpleLiteral> {
        Some(self)
    }
}

/// Whether a split list of expressions was joined with "and" or "or"
/// (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListJoin {
    And,
    Or,
}

/// A list of literal expressions (spec §3 `LiteralList`, §4.5).
#[derive(Debug)]
pub struct LiteralList {
    pub class: ClassId,
    pub join: ListJoin,
    pub items: Vec<SimpleLiteral>,
}

impl Expression for LiteralList {
    fn init(&mut self, _captures: Vec<ExprHandle>, _pattern_index: usize, _parse_result: &MatchContext) -> bool {
        true
    }

    fn get_values(&self, ctx: &dyn EventContext) -> Vec<Value> {
        self.items.iter().flat_map(|item| item.get_values(ctx)).collect()
    }

    fn is_single(&self) -> bool {
        self.items.len() <= 1
    }

    fn return_type(&self) -> ClassId {
        self.class
    }

    fn convert_to(&self, _target: ClassId) -> Option<ExprHandle> {
        None
    }

    fn to_string(&self, ctx: Option<&dyn EventContext>, debug: bool) -> String {
        let joiner = match self.join {
            ListJoin::And => "and",
            ListJoin::Or => "or",
        };
        self.items
            .iter()
            .map(|item| item.to_string(ctx, debug))
            .collect::<Vec<_>>()
            .join(&format!(" {joiner} "))
    }
}

/// A list of arbitrary (non-literal) expressions (spec §3 `ExpressionList`,
/// §4.5).
#[derive(Debug)]
pub struct ExpressionList {
    pub class: ClassId,
    pub join: ListJoin,
    pub items: Vec<ExprHandle>,
}

impl Expression for ExpressionList {
    fn init(&mut self, _captures: Vec<ExprHandle>, _pattern_index: usize, _parse_result: &MatchContext) -> bool {
        true
    }

    fn get_values(&self, ctx: &dyn EventContext) -> Vec<Value> {
        self.items.iter().flat_map(|item| item.get_values(ctx)).collect()
    }

    fn is_single(&self) -> bool {
        self.items.len() <= 1 && self.items.iter().all(Expression::is_single)
    }

    fn return_type(&self) -> ClassId {
        self.class
    }

    fn convert_to(&self, _target: ClassId) -> Option<ExprHandle> {
        None
    }

    fn to_string(&self, ctx: Option<&dyn EventContext>, debug: bool) -> String {
        let joiner = match self.join {
            ListJoin::And => "and",
            ListJoin::Or => "or",
        };
        self.items
            .iter()
            .map(|item| item.to_string(ctx, debug))
            .collect::<Vec<_>>()
            .join(&format!(" {joiner} "))
    }
}

/// A `{name}` reference to a runtime-named slot (spec §3 `Variable`,
/// GLOSSARY). Storage and resolution are external (spec.md scope); this
/// is the parse-time handle.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: VariableName,
    pub class: ClassId,
    pub plural: bool,
}

/// `{name}` or `{name::%index%}` — the index component may itself be an
/// expression (spec §4.4 step 3).
#[derive(Debug, Clone)]
pub enum VariableName {
    Plain(String),
    Indexed(String, Box<VariableIndex>),
}

#[derive(Debug, Clone)]
pub enum VariableIndex {
    Literal(String),
    Expression(ClassId),
}

impl Expression for Variable {
    fn init(&mut self, _captures: Vec<ExprHandle>, _pattern_index: usize, _parse_result: &MatchContext) -> bool {
        true
    }

    fn get_values(&self, _ctx: &dyn EventContext) -> Vec<Value> {
        // Variable storage is an external collaborator (spec.md scope).
        Vec::new()
    }

    fn is_single(&self) -> bool {
        !self.plural
    }

    fn return_type(&self) -> ClassId {
        self.class
    }

    fn convert_to(&self, _target: ClassId) -> Option<ExprHandle> {
        None
    }

    fn to_string(&self, _ctx: Option<&dyn EventContext>, _debug: bool) -> String {
        match &self.name {
            VariableName::Plain(n) => format!("{{{n}}}"),
            VariableName::Indexed(n, idx) => match idx.as_ref() {
                VariableIndex::Literal(l) => format!("{{{n}::{l}}}"),
                VariableIndex::Expression(_) => format!("{{{n}::%index%}}"),
            },
        }
    }
}

/// A string literal built from alternating literal runs and `%...%`
/// interpolated expressions (spec §4.4 "a separate `VariableString`
/// recognizer").
#[derive(Debug)]
pub struct VariableString {
    pub parts: Vec<StringPart>,
    pub class: ClassId,
}

#[derive(Debug)]
pub enum StringPart {
    Literal(String),
    Interpolated(ExprHandle),
}

impl Expression for VariableString {
    fn init(&mut self, _captures: Vec<ExprHandle>, _pattern_index: usize, _parse_result: &MatchContext) -> bool {
        true
    }

    fn get_values(&self, ctx: &dyn EventContext) -> Vec<Value> {
        vec![Value::Text(self.to_string(Some(ctx), false))]
    }

    fn is_single(&self) -> bool {
        true
    }

    fn return_type(&self) -> ClassId {
        self.class
    }

    fn convert_to(&self, _target: ClassId) -> Option<ExprHandle> {
        None
    }

    fn to_string(&self, ctx: Option<&dyn EventContext>, debug: bool) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                StringPart::Literal(s) => out.push_str(s),
                StringPart::Interpolated(expr) => match ctx {
                    Some(ctx) => out.push_str(&expr.to_string(Some(ctx), debug)),
                    None => out.push_str(&expr.to_string(None, debug)),
                },
            }
        }
        out
    }
}
