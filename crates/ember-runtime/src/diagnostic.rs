//! Diagnostics for builtin compilation failures
//!
//! Builtin source is fixed at build time, so a diagnostic at runtime means the
//! descriptor table itself is broken. Diagnostics still carry a full location
//! and snippet so the offending builtin can be fixed from the report alone.

use crate::span::Span;
use serde::Serialize;
use std::fmt;

/// Diagnostic schema version
pub const DIAG_VERSION: u32 = 1;

/// A compile error attached to a builtin's source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub diag_version: u32,
    /// Error code (e.g., "EB1001")
    pub code: String,
    pub message: String,
    /// Source origin, the builtin's code name
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Length of error span
    pub length: usize,
    /// Source line containing the span
    pub snippet: String,
    /// Short label for caret range
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            diag_version: DIAG_VERSION,
            code: code.into(),
            message: message.into(),
            file: "<builtin>".to_string(),
            line: 1,
            column: span.start + 1,
            length: span.len(),
            snippet: String::new(),
            label: String::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    /// Create a new error diagnostic (uses generic error code)
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::error_with_code(error_codes::GENERIC_ERROR, message, span)
    }

    /// Set the file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    /// Resolve line, column, and snippet of `span` within `source`
    ///
    /// The diagnostic's column is assumed to still hold the byte offset set by
    /// the constructor; multi-line spans are clipped to their first line.
    pub fn located_in(mut self, source: &str, span: Span) -> Self {
        let start = span.start.min(source.len());
        let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = source[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(source.len());

        self.line = source[..start].matches('\n').count() + 1;
        self.column = source[line_start..start].chars().count() + 1;
        self.snippet = source[line_start..line_end].to_string();
        self.length = span.len().min(line_end - start).max(1);
        self
    }

    /// Set the label (caret description)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a help message
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Format as human-readable string
    pub fn to_human_string(&self) -> String {
        let mut output = String::new();

        // error[EB1001]: unexpected token
        output.push_str(&format!(
            "error[{}]: {}\n",
            self.code, self.message
        ));
        output.push_str(&format!(
            "  --> {}:{}:{}\n",
            self.file, self.line, self.column
        ));

        if !self.snippet.is_empty() {
            output.push_str("   |\n");
            output.push_str(&format!("{:>2} | {}\n", self.line, self.snippet));

            if self.length > 0 {
                let padding = " ".repeat(self.column.saturating_sub(1));
                let carets = "^".repeat(self.length);
                output.push_str(&format!("   | {}{}", padding, carets));

                if !self.label.is_empty() {
                    output.push_str(&format!(" {}", self.label));
                }
                output.push('\n');
            }
        }

        for note in &self.notes {
            output.push_str(&format!("   = note: {}\n", note));
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
        write!(
            f,
            "error[{}] {}:{}:{}: {}",
            self.code, self.file, self.line, self.column, self.message
        )
    }
}

/// Error code registry
pub mod error_codes {
    // EB1xxx - Syntax errors in builtin source
    pub const SYNTAX_ERROR: &str = "EB1000";
    pub const UNEXPECTED_TOKEN: &str = "EB1001";
    pub const UNTERMINATED_STRING: &str = "EB1002";
    pub const UNTERMINATED_COMMENT: &str = "EB1003";
    pub const UNBALANCED_BRACES: &str = "EB1004";
    pub const DUPLICATE_PARAMETER: &str = "EB1005";
    pub const TRAILING_INPUT: &str = "EB1006";

    // EB2xxx - Builtin contract violations
    pub const ARGUMENT_COUNT_MISMATCH: &str = "EB2001";
    pub const SOURCE_LENGTH_MISMATCH: &str = "EB2002";

    // EB9xxx - Internal errors
    pub const INTERNAL_ERROR: &str = "EB9995";
    pub const GENERIC_ERROR: &str = "EB9999";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_located_in_second_line() {
        let source = "(function (a) {\n  return a +;\n})";
        let offset = source.find(';').unwrap();
        let diag = Diagnostic::error_with_code(
            error_codes::UNEXPECTED_TOKEN,
            "unexpected ';'",
            Span::new(offset, offset + 1),
        )
        .located_in(source, Span::new(offset, offset + 1));

        assert_eq!(diag.line, 2);
        assert_eq!(diag.column, 13);
        assert_eq!(diag.snippet, "  return a +;");
    }

    #[test]
    fn test_human_string_has_caret_and_label() {
        let source = "(function (a, a) {})";
        let span = Span::new(14, 15);
        let diag = Diagnostic::error_with_code(
            error_codes::DUPLICATE_PARAMETER,
            "duplicate parameter 'a'",
            span,
        )
        .with_file("consoleObjectWriteCode")
        .located_in(source, span)
        .with_label("declared twice")
        .with_help("rename one of the parameters");

        let caret_line = format!("   | {}^ declared twice", " ".repeat(14));
        let expected = [
            "error[EB1005]: duplicate parameter 'a'",
            "  --> consoleObjectWriteCode:1:15",
            "   |",
            " 1 | (function (a, a) {})",
            caret_line.as_str(),
            "   = help: rename one of the parameters",
        ];
        assert_eq!(diag.to_human_string(), format!("{}\n", expected.join("\n")));
    }

    #[test]
    fn test_display_is_one_line_error() {
        let diag =
            Diagnostic::error_with_code(error_codes::TRAILING_INPUT, "extra input", Span::new(4, 9))
                .with_file("consoleObjectWriteCode");
        assert_eq!(
            diag.to_string(),
            "error[EB1006] consoleObjectWriteCode:1:5: extra input"
        );
    }

    #[test]
    fn test_json_skips_empty_optionals() {
        let diag = Diagnostic::error("boom", Span::dummy());
        let json = diag.to_json_string().unwrap();
        assert!(json.contains("\"code\": \"EB9999\""));
        assert!(!json.contains("help"));
    }
}
