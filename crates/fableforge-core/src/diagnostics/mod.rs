mod collection;
mod message;

#[cfg(test)]
mod tests;

pub use collection::{Checkpoint, DiagnosticLog};
pub use message::{Diagnostic, ErrorKind, Verbosity};
