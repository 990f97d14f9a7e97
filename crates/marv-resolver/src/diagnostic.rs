//! Diagnostic system for errors and warnings
//!
//! Every report produced by the binding pass is a [`Diagnostic`]. Fatal
//! reports are `Error` level, advisory ones are `Warning` level. The pass
//! hands them to a [`DiagnosticSink`] and keeps going; the caller decides
//! whether errors stop the pipeline.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic schema version
pub const DIAG_VERSION: u32 = 1;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Fatal: compilation should not proceed
    Error,
    /// Advisory
    Warning,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
        }
    }
}

/// Secondary location for related diagnostic information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLocation {
    /// File path, or `<intrinsic>` for host-provided names
    pub file: String,
    pub span: Span,
    pub message: String,
}

/// A diagnostic message (error or warning)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub diag_version: u32,
    pub level: DiagnosticLevel,
    /// Stable code (e.g. "MV1001")
    pub code: String,
    pub message: String,
    pub span: Span,
    pub file: String,
    /// Line number (1-based), known once source text is attached
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<usize>,
    /// Column number (1-based), known once source text is attached
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub column: Option<usize>,
    pub length: usize,
    /// Short label for the primary location
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub related: Vec<RelatedLocation>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub help: Option<String>,
}

impl Diagnostic {
    fn with_level(
        level: DiagnosticLevel,
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            diag_version: DIAG_VERSION,
            level,
            code: code.into(),
            message: message.into(),
            span,
            file: "<unknown>".to_string(),
            line: None,
            column: None,
            length: span.len(),
            label: String::new(),
            notes: Vec::new(),
            related: Vec::new(),
            help: None,
        }
    }

    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::with_level(DiagnosticLevel::Error, code, message, span)
    }

    /// Create a new warning diagnostic with code
    pub fn warning_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::with_level(DiagnosticLevel::Warning, code, message, span)
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_related_location(mut self, location: RelatedLocation) -> Self {
        self.related.push(location);
        self
    }

    /// Resolve line/column from the source text the span points into
    pub fn with_source(mut self, source: &str) -> Self {
        let (line, column) = offset_to_line_col(source, self.span.start);
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Format as human-readable string
    pub fn to_human_string(&self) -> String {
        let mut output = String::new();

        // Header: error[MV1001]: Constant 'c' was defined twice in the same scope
        output.push_str(&format!(
            "{}[{}]: {}\n",
            self.level, self.code, self.message
        ));

        match (self.line, self.column) {
            _ if self.span.is_dummy() => output.push_str(&format!("  --> {}\n", self.file)),
            (Some(line), Some(column)) => {
                output.push_str(&format!("  --> {}:{}:{}\n", self.file, line, column))
            }
            // No source text attached: only the byte range is known
            _ => output.push_str(&format!("  --> {}@{}\n", self.file, self.span)),
        }

        if !self.label.is_empty() {
            output.push_str(&format!("   = label: {}\n", self.label));
        }

        for note in &self.notes {
            output.push_str(&format!("   = note: {}\n", note));
        }

        for related in &self.related {
            if related.span.is_dummy() {
                output.push_str(&format!(
                    "   = note: {}: {}\n",
                    related.file, related.message
                ));
            } else {
                output.push_str(&format!(
                    "   = note: related location at {}@{}: {}\n",
                    related.file, related.span, related.message
                ));
            }
        }

        if let Some(help) = &self.help {
            output.push_str(&format!("   = help: {}\n", help));
        }

        output
    }

    /// Format as JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_dummy() {
            write!(f, "{}[{}]: {}", self.level, self.code, self.message)
        } else {
            write!(
                f,
                "{}[{}]: {} {}",
                self.level, self.code, self.span, self.message
            )
        }
    }
}

/// Convert a byte offset into a 1-based (line, column) pair
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Sort diagnostics by level (errors first), then by location
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| match (a.level, b.level) {
        (DiagnosticLevel::Error, DiagnosticLevel::Warning) => std::cmp::Ordering::Less,
        (DiagnosticLevel::Warning, DiagnosticLevel::Error) => std::cmp::Ordering::Greater,
        _ => a
            .file
            .cmp(&b.file)
            .then(a.span.start.cmp(&b.span.start)),
    });
}

/// Destination for diagnostics produced by a pass
///
/// Reporting is write-only: the pass never reads anything back.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Error code registry
pub mod error_codes {
    // MV1xxx - Redefinition
    pub const CONSTANT_REDEFINITION: &str = "MV1001";
    pub const VARIABLE_REDEFINITION: &str = "MW1002";

    // MW2xxx - Resolution
    pub const UNRESOLVED_IDENTIFIER: &str = "MW2001";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::error_with_code(
            error_codes::CONSTANT_REDEFINITION,
            "test error",
            Span::new(0, 5),
        );
        assert_eq!(diag.level, DiagnosticLevel::Error);
        assert_eq!(diag.message, "test error");
        assert_eq!(diag.diag_version, DIAG_VERSION);
        assert_eq!(diag.line, None);
        assert_eq!(diag.column, None);
        assert_eq!(diag.length, 5);
    }

    #[test]
    fn test_warning_creation() {
        let diag = Diagnostic::warning_with_code(
            error_codes::UNRESOLVED_IDENTIFIER,
            "test warning",
            Span::new(0, 3),
        );
        assert_eq!(diag.level, DiagnosticLevel::Warning);
        assert!(!diag.is_error());
    }

    #[test]
    fn test_human_format_without_source_shows_byte_range() {
        let diag = Diagnostic::warning_with_code(
            error_codes::UNRESOLVED_IDENTIFIER,
            "Undefined identifier 'y'",
            Span::new(8, 9),
        )
        .with_file("tree.json");

        let output = diag.to_human_string();
        assert!(output.contains("  --> tree.json@8..9\n"), "{output}");
        assert!(!output.contains("tree.json:1:"));
    }

    #[test]
    fn test_human_format() {
        let diag = Diagnostic::warning_with_code(
            error_codes::UNRESOLVED_IDENTIFIER,
            "Undefined identifier 'y'",
            Span::new(8, 9),
        )
        .with_file("test.js")
        .with_source("var x = y;")
        .with_label("not declared in any enclosing scope");

        let output = diag.to_human_string();
        assert!(output.contains("warning[MW2001]: Undefined identifier 'y'"));
        assert!(output.contains("test.js:1:9"));
        assert_eq!((diag.line, diag.column), (Some(1), Some(9)));
        assert!(output.contains("not declared in any enclosing scope"));
    }

    #[test]
    fn test_human_format_intrinsic_related() {
        let diag = Diagnostic::error_with_code("MV1001", "boom", Span::new(0, 6))
            .with_file("a.js")
            .with_related_location(RelatedLocation {
                file: "<intrinsic>".to_string(),
                span: Span::dummy(),
                message: "first definition, const-style".to_string(),
            });
        let output = diag.to_human_string();
        assert!(output.contains("= note: <intrinsic>: first definition, const-style"));
    }

    #[test]
    fn test_json_format() {
        let diag = Diagnostic::error_with_code("MV1001", "Constant redefined", Span::new(0, 5))
            .with_file("test.js");

        let json = diag.to_json_string().unwrap();
        assert!(json.contains("\"diag_version\": 1"));
        assert!(!json.contains("\"line\""));
        assert!(json.contains("\"level\": \"error\""));
        assert!(json.contains("\"code\": \"MV1001\""));

        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn test_offset_to_line_col() {
        let source = "var a;\nvar b;\n  c;";
        assert_eq!(offset_to_line_col(source, 0), (1, 1));
        assert_eq!(offset_to_line_col(source, 11), (2, 5));
        assert_eq!(offset_to_line_col(source, 16), (3, 3));
    }

    #[test]
    fn test_sort_diagnostics() {
        let error = |message: &str, file: &str, start: usize| {
            Diagnostic::error_with_code("MV1001", message, Span::new(start, start + 1))
                .with_file(file)
        };
        let mut diagnostics = vec![
            Diagnostic::warning_with_code("MW2001", "warn1", Span::new(0, 1)).with_file("a.js"),
            error("err1", "b.js", 0),
            error("err3", "a.js", 40),
            error("err2", "a.js", 12),
        ];

        sort_diagnostics(&mut diagnostics);

        let order: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(order, vec!["err2", "err3", "err1", "warn1"]);
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.report(Diagnostic::warning_with_code("MW2001", "w", Span::dummy()));
        assert_eq!(sink.len(), 1);
    }
}
