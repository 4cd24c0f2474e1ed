use super::FileElement;
use crate::scan;
use fableforge_core::diagnostics::{DiagnosticLog, ErrorKind};

/// One open indentation level while the tree is being built.
struct OpenFrame {
    indent: String,
    /// `None` for the synthetic root frame.
    header: Option<(u32, String)>,
    children: Vec<FileElement>,
}

/// Builds the file element tree for `source` (spec §4.1), logging a
/// `STRUCTURE_ERROR` for each inconsistent indent it has to recover from.
pub fn build_file_tree(source: &str, log: &mut DiagnosticLog) -> FileElement {
    let mut frames = vec![OpenFrame {
        indent: String::new(),
        header: None,
        children: Vec::new(),
    }];

    for (line_no, raw) in join_continuations(source) {
        let stripped = scan::strip_comment(&raw);
        let trimmed_end = stripped.trim_end();
        let content = trimmed_end.trim_start();

        if content.is_empty() {
            frames.last_mut().unwrap().children.push(FileElement::Void { line: line_no });
            continue;
        }

        let indent = &trimmed_end[..trimmed_end.len() - content.len()];

        // Close out any frames we've dedented past.
        while frames.len() > 1 && indent.len() < frames.last().unwrap().indent.len() {
            close_frame(&mut frames);
        }

        let top_indent_len = frames.last().unwrap().indent.len();
        if indent.len() == top_indent_len {
            if indent != frames.last().unwrap().indent {
                log.error(ErrorKind::StructureError, line_no, "inconsistent indentation");
                continue;
            }
            frames.last_mut().unwrap().children.push(FileElement::Simple {
                line: line_no,
                text: content.to_string(),
            });
            continue;
        }

        // indent.len() > top_indent_len: this line wants to nest under the
        // last element of the current frame.
        if !indent.starts_with(frames.last().unwrap().indent.as_str()) {
            log.error(ErrorKind::StructureError, line_no, "inconsistent indentation");
            continue;
        }
        let opens_section = matches!(
            frames.last().unwrap().children.last(),
            Some(FileElement::Simple { text, .. }) if text.trim_end().ends_with(':')
        );
        if !opens_section {
            log.error(ErrorKind::StructureError, line_no, "unexpected indent");
            continue;
        }
        let header = frames.last_mut().unwrap().children.pop().unwrap();
        let (header_line, header_text) = match header {
            FileElement::Simple { line, text } => (line, text),
            _ => unreachable!("opens_section only matches Simple"),
        };
        frames.push(OpenFrame {
            indent: indent.to_string(),
            header: Some((header_line, header_text)),
            children: Vec::new(),
        });
        frames.last_mut().unwrap().children.push(FileElement::Simple {
            line: line_no,
            text: content.to_string(),
        });
    }

    while frames.len() > 1 {
        close_frame(&mut frames);
    }
    let root = frames.pop().unwrap();
    FileElement::Section {
        line: 0,
        header: String::new(),
        children: root.children,
    }
}

/// Pops the innermost frame and attaches it to its parent as a `Section`.
fn close_frame(frames: &mut Vec<OpenFrame>) {
    let finished = frames.pop().unwrap();
    let (header_line, header_text) = finished.header.expect("root frame is never closed");
    frames.last_mut().unwrap().children.push(FileElement::Section {
        line: header_line,
        header: header_text,
        children: finished.children,
    });
}

/// Joins physical lines ending in a trailing `\` into one logical line,
/// tagged with the line number of the first physical line (spec §4.1 (i)).
fn join_continuations(source: &str) -> Vec<(u32, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(u32, String)> = None;

    for (i, raw_line) in source.lines().enumerate() {
        let line_no = (i + 1) as u32;
        let continues = raw_line.ends_with('\\');
        let content = if continues {
            &raw_line[..raw_line.len() - 1]
        } else {
            raw_line
        };
        match &mut pending {
            Some((_, buf)) => buf.push_str(content),
            None => pending = Some((line_no, content.to_string())),
        }
        if !continues {
            out.push(pending.take().unwrap());
        }
    }
    if let Some(last) = pending.take() {
        out.push(last);
    }
    out
}
