use super::*;
use fableforge_core::diagnostics::DiagnosticLog;

fn children(tree: &FileElement) -> &[FileElement] {
    match tree {
        FileElement::Section { children, .. } => children,
        _ => panic!("build_file_tree always returns a root Section"),
    }
}

#[test]
fn line_numbers_are_preserved_in_order() {
    let source = "on load:\n\tset {x} to 5\n\n\t# a comment\n\tset {y} to 6\n";
    let mut log = DiagnosticLog::new();
    let tree = build_file_tree(source, &mut log);
    let top = children(&tree);
    assert_eq!(top.len(), 1);
    let FileElement::Section { line, header, children } = &top[0] else {
        panic!("expected a section");
    };
    assert_eq!(*line, 1);
    assert_eq!(header, "on load:");
    assert_eq!(children[0].line(), 2);
    assert_eq!(children[1].line(), 3); // blank line
    assert_eq!(children[2].line(), 4); // comment-only line
    assert_eq!(children[3].line(), 5);
}

#[test]
fn blank_and_comment_only_lines_are_void() {
    let source = "\n# just a comment\n   \nset {x} to 5\n";
    let mut log = DiagnosticLog::new();
    let tree = build_file_tree(source, &mut log);
    let top = children(&tree);
    assert!(matches!(top[0], FileElement::Void { line: 1 }));
    assert!(matches!(top[1], FileElement::Void { line: 2 }));
    assert!(matches!(top[2], FileElement::Void { line: 3 }));
    assert!(matches!(&top[3], FileElement::Simple { line: 4, text } if text == "set {x} to 5"));
}

#[test]
fn nested_indentation_builds_section_tree() {
    let source = "on load:\n\tif true:\n\t\tset {x} to 1\n\tset {y} to 2\n";
    let mut log = DiagnosticLog::new();
    let tree = build_file_tree(source, &mut log);
    let top = children(&tree);
    let FileElement::Section { children: trigger_body, .. } = &top[0] else {
        panic!("expected a section");
    };
    assert_eq!(trigger_body.len(), 2);
    let FileElement::Section { header, children: if_body, .. } = &trigger_body[0] else {
        panic!("expected nested 'if' section");
    };
    assert_eq!(header, "if true:");
    assert_eq!(if_body.len(), 1);
    assert!(matches!(&trigger_body[1], FileElement::Simple { text, .. } if text == "set {y} to 2"));
}

#[test]
fn inconsistent_dedent_is_a_structure_error_and_is_skipped() {
    // Both lines indent one column, but with a tab vs. a space: same
    // nominal depth, lexically different indent strings (spec §4.1).
    let source = "on load:\n\tset {x} to 1\n set {y} to 2\n";
    let mut log = DiagnosticLog::new();
    let _tree = build_file_tree(source, &mut log);
    assert!(log.entries().iter().any(|d| d.message.contains("inconsistent indentation")));
}

#[test]
fn trailing_backslash_joins_physical_lines() {
    let source = "on load:\n\tset {x} to 1 + \\\n\t2\n";
    let mut log = DiagnosticLog::new();
    let tree = build_file_tree(source, &mut log);
    let top = children(&tree);
    let FileElement::Section { children: body, .. } = &top[0] else {
        panic!("expected a section");
    };
    assert!(matches!(&body[0], FileElement::Simple { line: 2, text } if text == "set {x} to 1 + 2"));
}

#[test]
fn hash_inside_quotes_is_not_a_comment() {
    let source = "set {x} to \"a # b\" # real comment\n";
    let mut log = DiagnosticLog::new();
    let tree = build_file_tree(source, &mut log);
    let top = children(&tree);
    assert!(matches!(&top[0], FileElement::Simple { text, .. } if text == "set {x} to \"a # b\""));
}

/// Renders one indented line per element, `text @line` for leaf elements and
/// `header @line` followed by its children for sections — deliberately not
/// `{:#?}`, so the snapshot reads like the source it came from.
fn render(elements: &[FileElement], depth: usize, out: &mut String) {
    for el in elements {
        let indent = "  ".repeat(depth);
        match el {
            FileElement::Void { line } => out.push_str(&format!("{indent}<void> @{line}\n")),
            FileElement::Simple { line, text } => out.push_str(&format!("{indent}{text} @{line}\n")),
            FileElement::Section { line, header, children } => {
                out.push_str(&format!("{indent}{header} @{line}\n"));
                render(children, depth + 1, out);
            }
        }
    }
}

#[test]
fn nested_if_tree_renders_into_a_readable_snapshot() {
    let source = "on load:\n\tset {x} to 1\n\tif true:\n\t\tset {y} to 2\n";
    let mut log = DiagnosticLog::new();
    let tree = build_file_tree(source, &mut log);
    let mut rendered = String::new();
    render(children(&tree), 0, &mut rendered);
    insta::assert_snapshot!(rendered, @r"
    on load: @1
      set {x} to 1 @2
      if true: @3
        set {y} to 2 @4
    ");
}
