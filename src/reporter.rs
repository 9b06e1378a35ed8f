//! Rendering a [`Report`] for the terminal or as JSON.

use std::io::{self, Write};

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Report};
use crate::errors::Result;

/// Write the text report.
///
/// Warnings go to `out` as a `Warnings:` block followed by a blank line.
/// Errors go to `err` under `Validation failed:`; without errors a single
/// `Validation passed.` line is written to `out`.
pub fn write_text(report: &Report, out: &mut dyn Write, err: &mut dyn Write) -> io::Result<()> {
    let warnings: Vec<&Diagnostic> = report.warnings().collect();
    if !warnings.is_empty() {
        writeln!(out, "Warnings:")?;
        for warning in &warnings {
            writeln!(out, "- {warning}")?;
        }
        writeln!(out)?;
    }

    if report.has_errors() {
        writeln!(err, "Validation failed:")?;
        for error in report.errors() {
            writeln!(err, "- {error}")?;
        }
        return Ok(());
    }

    writeln!(out, "Validation passed.")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    passed: bool,
    warnings: Vec<&'a Diagnostic>,
    errors: Vec<&'a Diagnostic>,
}

/// Render the report as a pretty-printed JSON document.
pub fn to_json(report: &Report) -> Result<String> {
    let doc = JsonReport {
        passed: !report.has_errors(),
        warnings: report.warnings().collect(),
        errors: report.errors().collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}
