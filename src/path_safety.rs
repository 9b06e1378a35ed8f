//! Lexical safety classification for declared paths.
//!
//! A declared path is safe when it is an HTTP(S) URL, or a relative path
//! that cannot climb above the directory it is resolved against. The check
//! never touches the filesystem, so symlinks inside the tree are not
//! detected.

use std::sync::LazyLock;

use regex::Regex;

/// Drive-letter prefix such as `C:`, `C:\` or `c:/`.
static DRIVE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:").expect("drive prefix regex"));

/// Classification of a safe path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafePath {
    /// An `http://` or `https://` reference, never resolved locally.
    External,
    /// A relative path in normalized form (forward slashes, no `.`/`..`).
    Relative(String),
}

/// Why a path was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafePath {
    /// The value is empty.
    Empty,
    /// The value is an absolute filesystem path.
    Absolute,
    /// The value climbs above its base directory.
    Traversal,
}

/// Returns `true` for `http://` and `https://` values.
#[must_use]
pub fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Returns `true` for POSIX, UNC and drive-letter absolute forms.
#[must_use]
pub fn is_absolute(value: &str) -> bool {
    value.starts_with('/') || value.starts_with('\\') || DRIVE_PREFIX_RE.is_match(value)
}

/// Normalize separators to `/` and fold `.`/`..` segments lexically.
///
/// Leading `..` segments that cannot be folded are kept. An input that
/// folds to nothing yields `"."`.
#[must_use]
pub fn normalize(value: &str) -> String {
    let unified = value.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Classify a declared path.
pub fn classify(value: &str) -> Result<SafePath, UnsafePath> {
    if value.is_empty() {
        return Err(UnsafePath::Empty);
    }
    if is_url(value) {
        return Ok(SafePath::External);
    }
    if is_absolute(value) {
        return Err(UnsafePath::Absolute);
    }
    let normalized = normalize(value);
    if normalized == ".." || normalized.starts_with("../") {
        return Err(UnsafePath::Traversal);
    }
    Ok(SafePath::Relative(normalized))
}

/// Returns `true` if [`classify`] accepts the value.
#[must_use]
pub fn is_safe(value: &str) -> bool {
    classify(value).is_ok()
}
