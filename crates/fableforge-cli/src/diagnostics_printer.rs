//! Renders [`fableforge_core::diagnostics::Diagnostic`]s with
//! `annotate-snippets`, the same library the teacher's
//! `plotnik-lib::diagnostics::printer` uses, adapted for a line number
//! (spec §6 diagnostic record shape) instead of a byte range.

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use fableforge_core::diagnostics::{Diagnostic, Verbosity};

/// Renders every diagnostic in `diagnostics` against `source`, one snippet
/// group per entry, in source order.
pub fn render(diagnostics: &[Diagnostic], source: &str, path: &str, colored: bool) -> String {
    let renderer = if colored { Renderer::styled() } else { Renderer::plain() };
    let mut out = String::new();

    for diag in diagnostics {
        let range = line_byte_range(source, diag.line);
        let label = match diag.error_kind {
            Some(kind) => format!("{kind}: {}", diag.message),
            None => diag.message.clone(),
        };

        let snippet = Snippet::source(source)
            .line_start(1)
            .path(path)
            .annotation(AnnotationKind::Primary.span(range).label(&label));

        let level = severity_to_level(diag.verbosity);
        let title = match &diag.tip {
            Some(tip) => format!("{} (tip: {tip})", summary(diag)),
            None => summary(diag),
        };
        let report: Vec<Group> = vec![level.primary_title(&title).element(snippet)];

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&renderer.render(&report).to_string());
    }

    out
}

fn summary(diag: &Diagnostic) -> String {
    if !diag.context_trail.is_empty() {
        format!("{} (in {})", diag.message, diag.context_trail.join(" > "))
    } else {
        diag.message.clone()
    }
}

fn severity_to_level(verbosity: Verbosity) -> Level<'static> {
    match verbosity {
        Verbosity::Error => Level::ERROR,
        Verbosity::Warning => Level::WARNING,
        Verbosity::Info => Level::INFO,
        Verbosity::Debug => Level::NOTE,
    }
}

/// 1-indexed line number to a byte range within `source`, for `Snippet`'s
/// span. Out-of-range lines (e.g. line `0` for a file-level diagnostic)
/// fall back to the first character so the renderer still has something
/// to point at.
fn line_byte_range(source: &str, line: u32) -> std::ops::Range<usize> {
    if line == 0 {
        return 0..source.len().min(1);
    }
    let mut offset = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i as u32 + 1 == line {
            let trimmed_len = text.trim_end_matches('\n').len();
            return offset..offset + trimmed_len.max(1).min(text.len());
        }
        offset += text.len();
    }
    offset..source.len().max(offset + 1).min(source.len().max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fableforge_core::diagnostics::ErrorKind;

    #[test]
    fn renders_one_group_per_diagnostic() {
        let source = "on load:\n\tset {x} to 5\n";
        let diagnostics = vec![Diagnostic::error(ErrorKind::NoMatch, "no event matches 'on load'", 1)];
        let rendered = render(&diagnostics, source, "a.sk", false);
        assert!(rendered.contains("NO_MATCH"));
        assert!(rendered.contains("on load"));
    }

    #[test]
    fn line_byte_range_finds_the_right_line() {
        let source = "a\nbb\nccc\n";
        assert_eq!(line_byte_range(source, 1), 0..1);
        assert_eq!(line_byte_range(source, 2), 2..4);
        assert_eq!(line_byte_range(source, 3), 5..8);
    }
}
