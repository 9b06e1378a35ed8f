//! Manifest loading: read a JSON file and report why it could not be used.

use std::path::Path;

use serde_json::Value;

use crate::diagnostics::{Diagnostic, L001, L002};
use crate::errors::{MarketcheckError, Result};
use crate::fs_util::FileSystem;

/// Read and parse a JSON file without interpreting its shape.
pub fn read_json(fs: &dyn FileSystem, path: &Path) -> Result<Value> {
    let raw = fs
        .read_to_string(path)
        .map_err(|_| MarketcheckError::Missing {
            path: path.to_path_buf(),
        })?;
    serde_json::from_str(&raw).map_err(|source| MarketcheckError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a manifest, turning failures into a diagnostic naming its `role`
/// (e.g. `"Marketplace manifest"`).
pub fn load_manifest(
    fs: &dyn FileSystem,
    path: &Path,
    role: &str,
) -> std::result::Result<Value, Diagnostic> {
    tracing::debug!(path = %path.display(), role, "loading manifest");
    read_json(fs, path).map_err(|e| match e {
        MarketcheckError::Malformed { path, source } => Diagnostic::error(
            L002,
            format!("{role} contains invalid JSON ({}): {source}", path.display()),
        ),
        MarketcheckError::Missing { path } => {
            Diagnostic::error(L001, format!("{role} is missing: {}", path.display()))
        }
        other => Diagnostic::error(L001, format!("{role} could not be read: {other}")),
    })
}
