//! Plugin manifest (`.cursor-plugin/plugin.json`) view and referenced-path
//! validation.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::diagnostics::{Diagnostic, P003, P004};
use crate::fs_util::FileSystem;
use crate::path_safety::{self, SafePath};

/// Manifest fields whose values reference files inside the plugin.
pub const PATH_FIELDS: [&str; 7] = [
    "logo",
    "rules",
    "skills",
    "agents",
    "commands",
    "hooks",
    "mcpServers",
];

/// A manifest value that may reference paths.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PathField {
    /// A single path string.
    Single(String),
    /// An array whose elements are themselves path fields.
    Sequence(Vec<PathField>),
    /// An object exposing `path` and/or `file` properties.
    Keyed(KeyedPaths),
    /// Anything else (numbers, booleans, null); contributes no paths.
    Other(Value),
}

/// Object form of a path field. Only string-valued properties count.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyedPaths {
    #[serde(default)]
    pub path: Option<Value>,
    #[serde(default)]
    pub file: Option<Value>,
}

impl PathField {
    /// Collect every path string in this value, depth first.
    ///
    /// Objects contribute `path` then `file`; their other properties are
    /// not searched.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            PathField::Single(s) => out.push(s),
            PathField::Sequence(items) => {
                for item in items {
                    item.collect(out);
                }
            }
            PathField::Keyed(keyed) => {
                out.extend(keyed.path.as_ref().and_then(Value::as_str));
                out.extend(keyed.file.as_ref().and_then(Value::as_str));
            }
            PathField::Other(_) => {}
        }
    }
}

/// Typed view of `plugin.json`. Unknown fields are ignored; `name` stays
/// untyped so wrong types can be reported instead of failing the parse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PluginManifest {
    pub name: Option<Value>,
    pub logo: Option<PathField>,
    pub rules: Option<PathField>,
    pub skills: Option<PathField>,
    pub agents: Option<PathField>,
    pub commands: Option<PathField>,
    pub hooks: Option<PathField>,
    #[serde(rename = "mcpServers")]
    pub mcp_servers: Option<PathField>,
}

impl PluginManifest {
    /// Build the view from a parsed manifest. Non-object manifests yield an
    /// empty view.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// The `name` field, when it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }

    /// Path-bearing fields paired with their manifest key, in
    /// [`PATH_FIELDS`] order.
    #[must_use]
    pub fn path_fields(&self) -> [(&'static str, Option<&PathField>); 7] {
        [
            (PATH_FIELDS[0], self.logo.as_ref()),
            (PATH_FIELDS[1], self.rules.as_ref()),
            (PATH_FIELDS[2], self.skills.as_ref()),
            (PATH_FIELDS[3], self.agents.as_ref()),
            (PATH_FIELDS[4], self.commands.as_ref()),
            (PATH_FIELDS[5], self.hooks.as_ref()),
            (PATH_FIELDS[6], self.mcp_servers.as_ref()),
        ]
    }
}

/// Check every path referenced by the manifest's path fields.
///
/// URLs are accepted as-is. Unsafe paths are reported without an existence
/// check; safe paths must exist (file or directory) under `plugin_dir`.
#[must_use]
pub fn validate_references(
    fs: &dyn FileSystem,
    plugin_dir: &Path,
    manifest: &PluginManifest,
    plugin_name: &str,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    for (field, value) in manifest.path_fields() {
        let Some(value) = value else { continue };
        for path in value.paths() {
            match path_safety::classify(path) {
                Ok(SafePath::External) => {}
                Ok(SafePath::Relative(normalized)) => {
                    if !fs.exists(&plugin_dir.join(&normalized)) {
                        diags.push(
                            Diagnostic::error(
                                P004,
                                format!(
                                    "{plugin_name}: field \"{field}\" references missing path \"{path}\"."
                                ),
                            )
                            .with_field(field),
                        );
                    }
                }
                Err(_) => {
                    diags.push(
                        Diagnostic::error(
                            P003,
                            format!(
                                "{plugin_name}: field \"{field}\" has invalid path \"{path}\". \
                                 Use a relative path without \"..\" or absolute prefixes."
                            ),
                        )
                        .with_field(field),
                    );
                }
            }
        }
    }

    diags
}
