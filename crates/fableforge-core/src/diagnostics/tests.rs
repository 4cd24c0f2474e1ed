use super::*;

#[test]
fn discard_since_drops_scoped_entries() {
    let mut log = DiagnosticLog::new();
    log.error(ErrorKind::NoMatch, 1, "top level");
    let checkpoint = log.checkpoint();
    log.error(ErrorKind::SemanticError, 2, "abandoned candidate");
    assert_eq!(log.entries().len(), 2);
    log.discard_since(checkpoint);
    assert_eq!(log.entries().len(), 1);
    assert_eq!(log.entries()[0].message, "top level");
}

#[test]
fn callback_keeps_on_success_discards_on_failure() {
    let mut log = DiagnosticLog::new();
    log.callback(|log| {
        log.error(ErrorKind::SemanticError, 1, "kept");
        ((), true)
    });
    assert_eq!(log.entries().len(), 1);

    log.callback(|log| {
        log.error(ErrorKind::SemanticError, 2, "discarded");
        ((), false)
    });
    assert_eq!(log.entries().len(), 1);
}

#[test]
fn recurse_attaches_context_trail() {
    let mut log = DiagnosticLog::new();
    log.recurse("matching", |log| {
        log.recurse("initializing", |log| {
            log.error(ErrorKind::RestrictedSyntax, 5, "nested");
        });
    });
    let entry = &log.entries()[0];
    assert_eq!(entry.context_trail, vec!["matching", "initializing"]);
    assert_eq!(entry.recursion_depth, 2);
}

#[test]
fn max_recursion_depth_of_zero_is_unbounded() {
    let mut log = DiagnosticLog::new();
    log.set_max_recursion_depth(0);
    log.recurse("a", |log| log.recurse("b", |log| log.recurse("c", |_| {})));
    assert!(log.entries().is_empty());
}

#[test]
fn exceeding_max_recursion_depth_reports_once() {
    let mut log = DiagnosticLog::new();
    log.set_max_recursion_depth(2);
    log.recurse("a", |log| {
        log.recurse("b", |log| {
            log.recurse("c", |log| {
                log.recurse("d", |_| {});
            });
        });
    });
    let exceptions: Vec<_> = log
        .entries()
        .iter()
        .filter(|d| d.error_kind == Some(ErrorKind::Exception))
        .collect();
    assert_eq!(exceptions.len(), 1);
    assert!(exceptions[0].message.contains("maximum of 2"));
}
