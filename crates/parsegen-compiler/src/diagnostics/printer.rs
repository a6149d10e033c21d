//! Rendering diagnostics in the supported message formats.

use std::fmt::Write;

use super::collection::{Diagnostic, Diagnostics};

/// Output format for diagnostic locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    /// `severity(code): file:line:col: message`
    #[default]
    Antlr,
    /// `file:line:col: severity: message`
    Gnu,
    /// `file(line,col) : severity code : message`
    Vs2005,
}

impl MessageFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "antlr" => Some(MessageFormat::Antlr),
            "gnu" => Some(MessageFormat::Gnu),
            "vs2005" => Some(MessageFormat::Vs2005),
            _ => None,
        }
    }
}

/// Renders a diagnostics collection to text, one line per diagnostic.
pub struct DiagnosticsPrinter<'a> {
    diagnostics: &'a Diagnostics,
    format: MessageFormat,
}

impl<'a> DiagnosticsPrinter<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        Self {
            diagnostics,
            format: MessageFormat::default(),
        }
    }

    pub fn format(mut self, format: MessageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for d in self.diagnostics.iter() {
            self.render_one(&mut out, d);
            out.push('\n');
        }
        out
    }

    fn render_one(&self, out: &mut String, d: &Diagnostic) {
        let write_failed = "String write never fails";
        match self.format {
            MessageFormat::Antlr => write!(
                out,
                "{}({}): {}:{}:{}: {}",
                d.severity().label(),
                d.kind.code(),
                d.file,
                d.pos.line,
                d.pos.col,
                d.message
            )
            .expect(write_failed),
            MessageFormat::Gnu => write!(
                out,
                "{}:{}:{}: {}: {}",
                d.file,
                d.pos.line,
                d.pos.col,
                d.severity().label(),
                d.message
            )
            .expect(write_failed),
            MessageFormat::Vs2005 => write!(
                out,
                "{}({},{}) : {} {} : {}",
                d.file,
                d.pos.line,
                d.pos.col,
                d.severity().label(),
                d.kind.code(),
                d.message
            )
            .expect(write_failed),
        }
    }
}
