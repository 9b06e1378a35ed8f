//! Structured diagnostics for marketplace validation.
//!
//! Every check returns typed diagnostics carrying a stable code, a severity,
//! and an optional fix suggestion. A [`Report`] collects them for one run.

use std::fmt;

use serde::Serialize;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A rule violation that causes validation failure.
    Error,
    /// An advisory issue that does not cause failure.
    Warning,
}

/// A structured diagnostic message from validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Stable code (e.g., `"M001"`, `"W001"`).
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Manifest field that caused the diagnostic (e.g., `"logo"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    /// Suggested fix (actionable text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with the given severity, code, and message.
    #[must_use]
    pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            field: None,
            suggestion: None,
        }
    }

    /// Shorthand for an error diagnostic.
    #[must_use]
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Shorthand for a warning diagnostic.
    #[must_use]
    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Set the field that caused this diagnostic.
    #[must_use]
    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    /// Set a suggested fix for this diagnostic.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Returns `true` if this diagnostic is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns `true` if this diagnostic is a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Display is the bare message; the report groups by severity.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// All diagnostics produced by one validation run, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single diagnostic.
    pub fn push(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    /// Append every diagnostic returned by a check.
    pub fn merge(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diags);
    }

    /// All diagnostics in emission order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Error diagnostics in emission order.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Warning diagnostics in emission order.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// Returns `true` if any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Process exit code for this report: `1` with errors, else `0`.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_errors())
    }
}

impl Extend<Diagnostic> for Report {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.merge(iter);
    }
}

// ── Diagnostic codes ────────────────────────────────────────────────────

// Manifest loading (L001–L002)

/// Manifest file is missing or unreadable.
pub const L001: &str = "L001";
/// Manifest file contains invalid JSON.
pub const L002: &str = "L002";

// Marketplace root fields (M001–M005)

/// Marketplace `name` is not lowercase kebab-case.
pub const M001: &str = "M001";
/// Marketplace `owner.name` is missing or empty.
pub const M002: &str = "M002";
/// Marketplace `plugins` is not a non-empty array.
pub const M003: &str = "M003";
/// `metadata.pluginRoot` is not a safe relative path.
pub const M004: &str = "M004";
/// `metadata.pluginRoot` directory is missing or not a directory.
pub const M005: &str = "M005";

// Marketplace plugin entries (N001–N006)

/// Plugin entry is not an object.
pub const N001: &str = "N001";
/// Plugin entry name does not match the naming pattern.
pub const N002: &str = "N002";
/// Plugin entry name is listed more than once.
pub const N003: &str = "N003";
/// Plugin entry source is not a string path.
pub const N004: &str = "N004";
/// Plugin entry source is not a safe relative path.
pub const N005: &str = "N005";
/// Plugin directory is missing or not a directory.
pub const N006: &str = "N006";

// Plugin manifest (P001–P004)

/// `plugin.json` name does not match the naming pattern.
pub const P001: &str = "P001";
/// `plugin.json` name differs from the marketplace entry name.
pub const P002: &str = "P002";
/// Referenced path is absolute or escapes the plugin directory.
pub const P003: &str = "P003";
/// Referenced path does not exist.
pub const P004: &str = "P004";

// Component files (F001–F004)

/// Component file could not be read.
pub const F001: &str = "F001";
/// Component file has no frontmatter block.
pub const F002: &str = "F002";
/// Component frontmatter is missing a required key.
pub const F003: &str = "F003";
/// Component directory could not be listed.
pub const F004: &str = "F004";

// Companion files (W001–W002)

/// `hooks/hooks.json` not found.
pub const W001: &str = "W001";
/// `mcp.json` not found.
pub const W002: &str = "W002";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_bare_message() {
        let d = Diagnostic::warning(W001, "no hooks/hooks.json file found");
        assert_eq!(d.to_string(), "no hooks/hooks.json file found");
    }

    #[test]
    fn severity_helpers() {
        let e = Diagnostic::error(M001, "test");
        assert!(e.is_error());
        assert!(!e.is_warning());
        let w = Diagnostic::warning(W002, "test");
        assert!(w.is_warning());
        assert!(!w.is_error());
    }

    #[test]
    fn builder_pattern_chains() {
        let d = Diagnostic::error(P003, "bad path")
            .with_field("logo")
            .with_suggestion("Use a relative path");
        assert_eq!(d.code, P003);
        assert_eq!(d.field, Some("logo"));
        assert_eq!(d.suggestion.as_deref(), Some("Use a relative path"));
    }

    #[test]
    fn report_splits_by_severity() {
        let mut report = Report::new();
        report.push(Diagnostic::warning(W001, "w"));
        report.push(Diagnostic::error(N003, "e1"));
        report.merge(vec![Diagnostic::error(N002, "e2")]);
        assert_eq!(report.warnings().count(), 1);
        let errors: Vec<_> = report.errors().map(|d| d.message.as_str()).collect();
        assert_eq!(errors, ["e1", "e2"]);
        assert!(report.has_errors());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn warnings_only_exit_zero() {
        let mut report = Report::new();
        report.push(Diagnostic::warning(W002, "w"));
        assert!(!report.has_errors());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn serialize_json_omits_none_fields() {
        let d = Diagnostic::error(L001, "missing");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["code"], "L001");
        assert!(json.get("field").is_none());
        assert!(json.get("suggestion").is_none());
    }

    #[test]
    fn codes_are_unique() {
        let codes = [
            L001, L002, M001, M002, M003, M004, M005, N001, N002, N003, N004, N005, N006, P001,
            P002, P003, P004, F001, F002, F003, F004, W001, W002,
        ];
        let mut seen = std::collections::HashSet::new();
        for code in &codes {
            assert!(seen.insert(code), "duplicate diagnostic code: {code}");
        }
    }
}
