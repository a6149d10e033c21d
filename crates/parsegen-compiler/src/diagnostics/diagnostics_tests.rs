use super::collection::{Diagnostic, DiagnosticListener, Diagnostics, SrcPos};
use super::kind::{DiagnosticKind, Severity};
use super::printer::{DiagnosticsPrinter, MessageFormat};

#[test]
fn template_rendering_fills_placeholders() {
    let msg = DiagnosticKind::RuleRedefinition.render(&["expr", "12"]);
    assert_eq!(msg, "rule expr redefinition; previous at line 12");

    // Missing args degrade instead of panicking.
    let msg = DiagnosticKind::RuleRedefinition.render(&["expr"]);
    assert_eq!(msg, "rule expr redefinition; previous at line ?");
}

#[test]
fn counts_by_severity() {
    let mut diags = Diagnostics::new();
    diags.emit(
        DiagnosticKind::UndefinedRuleRef,
        "T.g4",
        SrcPos::new(3, 0),
        &["missing"],
    );
    diags.emit(
        DiagnosticKind::ImplicitTokenDefinition,
        "T.g4",
        SrcPos::new(4, 2),
        &["ID"],
    );
    assert_eq!(diags.error_count(), 1);
    assert_eq!(diags.warning_count(), 1);
    assert!(diags.has_errors());
}

#[test]
fn one_off_kinds_report_once() {
    let mut diags = Diagnostics::new();
    assert_eq!(
        DiagnosticKind::FragmentActionIgnored.severity(),
        Severity::WarningOneOff
    );
    for _ in 0..3 {
        diags.emit(
            DiagnosticKind::FragmentActionIgnored,
            "L.g4",
            SrcPos::new(1, 0),
            &["F"],
        );
    }
    assert_eq!(diags.len(), 1);
}

#[test]
fn warnings_are_errors_appends_promotion() {
    let mut diags = Diagnostics::new();
    diags.warnings_are_errors = true;
    diags.emit(
        DiagnosticKind::ImplicitTokenDefinition,
        "T.g4",
        SrcPos::new(2, 0),
        &["ID"],
    );
    assert_eq!(
        diags.kinds(),
        vec![
            DiagnosticKind::ImplicitTokenDefinition,
            DiagnosticKind::WarningTreatedAsError
        ]
    );
    assert_eq!(diags.error_count(), 1);
}

struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<String>>>);

impl DiagnosticListener for Recorder {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.0.borrow_mut().push(diagnostic.message.clone());
    }
}

#[test]
fn listeners_receive_diagnostics_in_order() {
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let mut diags = Diagnostics::new();
    diags.add_listener(Box::new(Recorder(seen.clone())));

    diags.emit(
        DiagnosticKind::UndefinedRuleRef,
        "T.g4",
        SrcPos::new(1, 0),
        &["a"],
    );
    diags.emit(
        DiagnosticKind::UndefinedRuleRef,
        "T.g4",
        SrcPos::new(2, 0),
        &["b"],
    );

    assert_eq!(
        *seen.borrow(),
        vec![
            "reference to undefined rule: a".to_string(),
            "reference to undefined rule: b".to_string()
        ]
    );
}

#[test]
fn printer_formats() {
    let mut diags = Diagnostics::new();
    diags.emit(
        DiagnosticKind::UndefinedRuleRef,
        "T.g4",
        SrcPos::new(5, 8),
        &["x"],
    );

    let antlr = DiagnosticsPrinter::new(&diags).render();
    assert_eq!(antlr, "error(56): T.g4:5:8: reference to undefined rule: x\n");

    let gnu = DiagnosticsPrinter::new(&diags)
        .format(MessageFormat::Gnu)
        .render();
    assert_eq!(gnu, "T.g4:5:8: error: reference to undefined rule: x\n");

    let vs = DiagnosticsPrinter::new(&diags)
        .format(MessageFormat::Vs2005)
        .render();
    assert_eq!(vs, "T.g4(5,8) : error 56 : reference to undefined rule: x\n");
}

#[test]
fn format_names_resolve() {
    assert_eq!(MessageFormat::from_name("antlr"), Some(MessageFormat::Antlr));
    assert_eq!(MessageFormat::from_name("gnu"), Some(MessageFormat::Gnu));
    assert_eq!(
        MessageFormat::from_name("vs2005"),
        Some(MessageFormat::Vs2005)
    );
    assert_eq!(MessageFormat::from_name("json"), None);
}
