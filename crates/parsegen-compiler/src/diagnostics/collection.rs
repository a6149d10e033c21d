//! Diagnostics collection: the single write aggregator for the pipeline.

use std::collections::HashSet;
use std::fmt;

use super::kind::{DiagnosticKind, Severity};

/// Line/column source position, 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SrcPos {
    pub line: u32,
    pub col: u32,
}

impl SrcPos {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// One reported issue: kind plus rendered message and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub file: String,
    pub pos: SrcPos,
    pub message: String,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity().is_error()
    }

    pub fn is_warning(&self) -> bool {
        self.severity().is_warning()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}): {}:{}:{}: {}",
            self.severity().label(),
            self.kind.code(),
            self.file,
            self.pos.line,
            self.pos.col,
            self.message
        )
    }
}

/// Listener notified of every diagnostic as it is emitted.
pub trait DiagnosticListener {
    fn report(&mut self, diagnostic: &Diagnostic);
}

/// Accumulates diagnostics from every pipeline stage.
///
/// One-off kinds are suppressed after their first occurrence. When
/// `warnings_are_errors` is set, each warning is followed by an extra
/// `WarningTreatedAsError` error so the run fails.
#[derive(Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    emitted_one_off: HashSet<u32>,
    listeners: Vec<Box<dyn DiagnosticListener>>,
    pub warnings_are_errors: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn DiagnosticListener>) {
        self.listeners.push(listener);
    }

    /// Emit a diagnostic of `kind` at `pos`, filling its message template
    /// with `args`.
    pub fn emit(&mut self, kind: DiagnosticKind, file: &str, pos: SrcPos, args: &[&str]) {
        if kind.severity().one_off() && !self.emitted_one_off.insert(kind.code()) {
            return;
        }

        let diagnostic = Diagnostic {
            kind,
            file: file.to_string(),
            pos,
            message: kind.render(args),
        };
        let was_warning = diagnostic.is_warning();
        self.push(diagnostic);

        if was_warning && self.warnings_are_errors {
            let promoted = Diagnostic {
                kind: DiagnosticKind::WarningTreatedAsError,
                file: file.to_string(),
                pos,
                message: DiagnosticKind::WarningTreatedAsError.render(&[]),
            };
            self.push(promoted);
        }
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        for listener in &mut self.listeners {
            listener.report(&diagnostic);
        }
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_warning()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.is_error())
    }

    /// Kinds in emission order; the scenario tests match against this.
    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.items.iter().map(|d| d.kind).collect()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("items", &self.items)
            .field("warnings_are_errors", &self.warnings_are_errors)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
