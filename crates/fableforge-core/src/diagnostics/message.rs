//! Diagnostic message shape (spec §6 "Diagnostic record").

use std::path::PathBuf;
use thiserror::Error;

/// Verbosity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
}

/// The closed set of error kinds a user diagnostic may carry (spec §6).
///
/// Deriving `thiserror::Error` here rather than hand-writing `Display`
/// matches the rest of the workspace's one-variant-per-failure-mode
/// convention (`fableforge-loader::LoaderError`) even though `ErrorKind`
/// itself is never returned from a `Result` — it is carried inside a
/// `Diagnostic`, not raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("NO_MATCH")]
    NoMatch,
    #[error("SEMANTIC_ERROR")]
    SemanticError,
    #[error("STRUCTURE_ERROR")]
    StructureError,
    #[error("MALFORMED_INPUT")]
    MalformedInput,
    #[error("RESTRICTED_SYNTAX")]
    RestrictedSyntax,
    #[error("EXCEPTION")]
    Exception,
}

/// One diagnostic entry, as surfaced to a script author.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub verbosity: Verbosity,
    pub line: u32,
    pub context_trail: Vec<String>,
    /// How many `DiagnosticLog::recurse` scopes were open when this entry
    /// was pushed (spec.md §9 "captures ... recursion depth").
    pub recursion_depth: usize,
    pub error_kind: Option<ErrorKind>,
    pub script: Option<PathBuf>,
    pub tip: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, verbosity: Verbosity, line: u32) -> Self {
        Self {
            message: message.into(),
            verbosity,
            line,
            context_trail: Vec::new(),
            recursion_depth: 0,
            error_kind: None,
            script: None,
            tip: None,
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>, line: u32) -> Self {
        Self {
            error_kind: Some(kind),
            ..Self::new(message, Verbosity::Error, line)
        }
    }

    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tip = Some(tip.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: ", self.line)?;
        if let Some(kind) = self.error_kind {
            write!(f, "{kind}: ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(tip) = &self.tip {
            write!(f, " (tip: {tip})")?;
        }
        Ok(())
    }
}
