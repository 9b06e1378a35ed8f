//! Per-plugin validation: marketplace entry, manifest, referenced paths,
//! component frontmatter and companion files.

pub mod component;
pub mod manifest;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::diagnostics::{Diagnostic, N001, N002, N003, N004, N005, N006, P001, P002, W001, W002};
use crate::fs_util::{EntryKind, FileSystem};
use crate::loader::load_manifest;
use crate::marketplace::{is_valid_plugin_name, plugin_manifest_path, resolve_source};
use crate::path_safety::{self, SafePath};

pub use component::{validate_component_file, validate_components, ComponentKind};
pub use manifest::{validate_references, PathField, PluginManifest, PATH_FIELDS};

/// Validate one entry of the marketplace `plugins` array.
///
/// `seen` holds names of earlier entries; every repeat of a name is
/// reported once. Entries with an invalid name, source or directory stop
/// after the failing check.
#[must_use]
pub fn validate_entry(
    fs: &dyn FileSystem,
    index: usize,
    entry: &Value,
    plugin_root: Option<&str>,
    seen: &mut HashSet<String>,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let label = format!("plugins[{index}]");

    let Some(entry) = entry.as_object() else {
        diags.push(Diagnostic::error(N001, format!("{label} must be an object.")));
        return diags;
    };

    let name = match entry.get("name").and_then(Value::as_str) {
        Some(name) if is_valid_plugin_name(name) => name,
        _ => {
            diags.push(
                Diagnostic::error(
                    N002,
                    format!(
                        "{label}.name must be lowercase and use only alphanumerics, hyphens, and periods."
                    ),
                )
                .with_field("name"),
            );
            return diags;
        }
    };

    if !seen.insert(name.to_string()) {
        diags.push(Diagnostic::error(
            N003,
            format!("Duplicate plugin name in marketplace manifest: \"{name}\""),
        ));
    }

    let source = match entry.get("source").and_then(Value::as_str) {
        Some(source) if !source.is_empty() => source,
        _ => {
            diags.push(
                Diagnostic::error(N004, format!("{label}.source must be a string path."))
                    .with_field("source"),
            );
            return diags;
        }
    };

    let source_path = resolve_source(source, plugin_root);
    let plugin_dir = match path_safety::classify(&source_path) {
        Ok(SafePath::Relative(normalized)) => PathBuf::from(normalized),
        // A URL is still looked up as a local directory and reported missing.
        Ok(SafePath::External) => PathBuf::from(&source_path),
        Err(_) => {
            diags.push(
                Diagnostic::error(
                    N005,
                    format!("{label}.source is not a safe relative path: \"{source_path}\""),
                )
                .with_field("source"),
            );
            return diags;
        }
    };

    match fs.entry_kind(&plugin_dir) {
        Some(EntryKind::Dir) => {}
        Some(EntryKind::File) => {
            diags.push(Diagnostic::error(
                N006,
                format!(
                    "{label}.source exists but is not a directory: {}",
                    plugin_dir.display()
                ),
            ));
            return diags;
        }
        None => {
            diags.push(Diagnostic::error(
                N006,
                format!("{label}.source directory is missing: {}", plugin_dir.display()),
            ));
            return diags;
        }
    }

    diags.extend(validate_plugin(fs, &plugin_dir, name));
    diags
}

/// Validate a plugin directory for the marketplace entry `name`.
///
/// A missing or malformed `plugin.json` skips the manifest checks only;
/// component and companion checks still run.
#[must_use]
pub fn validate_plugin(fs: &dyn FileSystem, plugin_dir: &Path, name: &str) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    tracing::debug!(plugin = name, dir = %plugin_dir.display(), "validating plugin");

    let manifest_path = plugin_manifest_path(plugin_dir);
    match load_manifest(fs, &manifest_path, &format!("{name} plugin manifest")) {
        Ok(raw) => {
            let manifest = PluginManifest::from_value(&raw);
            diags.extend(check_manifest_name(&manifest, name));
            diags.extend(validate_references(fs, plugin_dir, &manifest, name));
        }
        Err(diag) => diags.push(diag),
    }

    diags.extend(validate_components(fs, plugin_dir, name));
    diags.extend(check_companions(fs, plugin_dir, name));
    diags
}

/// Check the manifest `name` against the naming pattern and the entry name.
#[must_use]
pub fn check_manifest_name(manifest: &PluginManifest, entry_name: &str) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    let declared = manifest.name();
    if !declared.is_some_and(is_valid_plugin_name) {
        diags.push(
            Diagnostic::error(
                P001,
                format!(
                    "{entry_name}: \"name\" in plugin.json must be lowercase and use only alphanumerics, hyphens, and periods."
                ),
            )
            .with_field("name"),
        );
    }

    let mismatch = match manifest.name.as_ref() {
        Some(Value::String(s)) => (!s.is_empty() && s != entry_name).then(|| s.clone()),
        Some(Value::Number(n)) => (n.as_f64() != Some(0.0)).then(|| n.to_string()),
        Some(Value::Bool(true)) => Some("true".to_string()),
        Some(other @ (Value::Array(_) | Value::Object(_))) => Some(other.to_string()),
        Some(Value::Bool(false) | Value::Null) | None => None,
    };
    if let Some(declared) = mismatch {
        diags.push(
            Diagnostic::error(
                P002,
                format!(
                    "{entry_name}: marketplace entry name does not match plugin.json name (\"{declared}\")."
                ),
            )
            .with_field("name")
            .with_suggestion(format!("Rename one side so both read \"{entry_name}\"")),
        );
    }

    diags
}

/// Warn about absent optional companion files.
#[must_use]
pub fn check_companions(fs: &dyn FileSystem, plugin_dir: &Path, name: &str) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    if !fs.exists(&plugin_dir.join("hooks").join("hooks.json")) {
        diags.push(Diagnostic::warning(
            W001,
            format!("{name}: no hooks/hooks.json file found (only needed when using hooks)."),
        ));
    }

    if !fs.exists(&plugin_dir.join("mcp.json")) {
        diags.push(Diagnostic::warning(
            W002,
            format!("{name}: no mcp.json file found (only needed when using MCP servers)."),
        ));
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{F002, L001, L002, P004};
    use crate::fs_util::MemoryFileSystem;
    use serde_json::json;

    fn codes(diags: &[Diagnostic]) -> Vec<&'static str> {
        diags.iter().map(|d| d.code).collect()
    }

    fn conformant(dir: &str, name: &str) -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file(
                format!("{dir}/.cursor-plugin/plugin.json"),
                format!(r#"{{"name": "{name}"}}"#),
            )
            .with_file(format!("{dir}/hooks/hooks.json"), "{}")
            .with_file(format!("{dir}/mcp.json"), "{}")
    }

    #[test]
    fn conformant_entry_has_no_diagnostics() {
        let fs = conformant("plugins/demo", "demo");
        let mut seen = HashSet::new();
        let entry = json!({"name": "demo", "source": "demo"});
        let diags = validate_entry(&fs, 0, &entry, Some("plugins"), &mut seen);
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn non_object_entry_is_n001() {
        let fs = MemoryFileSystem::new();
        let diags = validate_entry(&fs, 2, &json!("demo"), None, &mut HashSet::new());
        assert_eq!(diags[0].message, "plugins[2] must be an object.");
    }

    #[test]
    fn bad_name_stops_entry() {
        let fs = MemoryFileSystem::new();
        let mut seen = HashSet::new();
        let entry = json!({"name": "Demo", "source": "../escape"});
        let diags = validate_entry(&fs, 0, &entry, None, &mut seen);
        assert_eq!(codes(&diags), [N002]);
        assert!(seen.is_empty());
    }

    #[test]
    fn duplicate_reported_per_repeat() {
        let fs = conformant("demo", "demo");
        let mut seen = HashSet::new();
        let entry = json!({"name": "demo", "source": "demo"});
        let mut all = Vec::new();
        for i in 0..3 {
            all.extend(validate_entry(&fs, i, &entry, None, &mut seen));
        }
        assert_eq!(codes(&all), [N003, N003]);
    }

    #[test]
    fn source_must_be_string() {
        let fs = MemoryFileSystem::new();
        for source in [json!(null), json!(""), json!(5)] {
            let entry = json!({"name": "demo", "source": source});
            let diags = validate_entry(&fs, 0, &entry, None, &mut HashSet::new());
            assert_eq!(diags[0].message, "plugins[0].source must be a string path.");
        }
    }

    #[test]
    fn unsafe_source_is_n005() {
        let fs = MemoryFileSystem::new();
        let entry = json!({"name": "demo", "source": "../../elsewhere"});
        let diags = validate_entry(&fs, 0, &entry, Some("plugins"), &mut HashSet::new());
        assert_eq!(codes(&diags), [N005]);
        assert!(diags[0].message.contains("\"plugins/../../elsewhere\""));
    }

    #[test]
    fn missing_plugin_dir_is_n006() {
        let fs = MemoryFileSystem::new().with_file("plugins/file", "");
        let entry = json!({"name": "demo", "source": "plugins/demo"});
        let diags = validate_entry(&fs, 0, &entry, None, &mut HashSet::new());
        assert_eq!(diags[0].message, "plugins[0].source directory is missing: plugins/demo");

        let entry = json!({"name": "demo", "source": "plugins/file"});
        let diags = validate_entry(&fs, 0, &entry, None, &mut HashSet::new());
        assert!(diags[0].message.contains("exists but is not a directory"));
    }

    #[test]
    fn url_source_is_a_missing_directory() {
        let fs = MemoryFileSystem::new();
        let entry = json!({"name": "remote", "source": "https://example.com/remote"});
        let diags = validate_entry(&fs, 0, &entry, None, &mut HashSet::new());
        assert_eq!(codes(&diags), [N006]);
        assert_eq!(
            diags[0].message,
            "plugins[0].source directory is missing: https://example.com/remote"
        );

        let diags = validate_entry(&fs, 0, &entry, Some("plugins"), &mut HashSet::new());
        assert_eq!(codes(&diags), [N006]);
        assert!(diags[0].message.starts_with("plugins[0].source directory is missing"));
    }

    #[test]
    fn name_mismatch_is_p002() {
        let fs = conformant("demo", "other");
        let diags = validate_plugin(&fs, Path::new("demo"), "demo");
        assert_eq!(codes(&diags), [P002]);
        assert_eq!(
            diags[0].message,
            "demo: marketplace entry name does not match plugin.json name (\"other\")."
        );
    }

    #[test]
    fn invalid_manifest_name_is_p001() {
        let manifest = PluginManifest::from_value(&json!({"name": "Demo"}));
        assert_eq!(codes(&check_manifest_name(&manifest, "demo")), [P001, P002]);
        let manifest = PluginManifest::from_value(&json!({}));
        assert_eq!(codes(&check_manifest_name(&manifest, "demo")), [P001]);
    }

    #[test]
    fn non_string_manifest_name_also_mismatches() {
        let manifest = PluginManifest::from_value(&json!({"name": 5}));
        let diags = check_manifest_name(&manifest, "demo");
        assert_eq!(codes(&diags), [P001, P002]);
        assert_eq!(
            diags[1].message,
            "demo: marketplace entry name does not match plugin.json name (\"5\")."
        );

        for falsy in [json!(0), json!(false), json!(""), json!(null)] {
            let manifest = PluginManifest::from_value(&json!({"name": falsy}));
            assert_eq!(codes(&check_manifest_name(&manifest, "demo")), [P001]);
        }
    }

    #[test]
    fn missing_manifest_still_walks_components() {
        let fs = MemoryFileSystem::new()
            .with_file("demo/rules/a.md", "no frontmatter")
            .with_file("demo/hooks/hooks.json", "{}")
            .with_file("demo/mcp.json", "{}");
        let diags = validate_plugin(&fs, Path::new("demo"), "demo");
        assert_eq!(codes(&diags), [L001, F002]);
        assert_eq!(
            diags[0].message,
            "demo plugin manifest is missing: demo/.cursor-plugin/plugin.json"
        );
    }

    #[test]
    fn malformed_manifest_skips_reference_checks() {
        let fs = MemoryFileSystem::new()
            .with_file("demo/.cursor-plugin/plugin.json", r#"{"name": "demo", "logo": "x.png""#)
            .with_file("demo/hooks/hooks.json", "{}")
            .with_file("demo/mcp.json", "{}");
        let diags = validate_plugin(&fs, Path::new("demo"), "demo");
        assert_eq!(codes(&diags), [L002]);
    }

    #[test]
    fn referenced_paths_checked_against_plugin_dir() {
        let fs = conformant("demo", "demo").with_file(
            "demo/.cursor-plugin/plugin.json",
            r#"{"name": "demo", "logo": "assets/logo.png"}"#,
        );
        let diags = validate_plugin(&fs, Path::new("demo"), "demo");
        assert_eq!(codes(&diags), [P004]);
    }

    #[test]
    fn companions_missing_are_warnings() {
        let fs = MemoryFileSystem::new().with_dir("demo");
        let diags = check_companions(&fs, Path::new("demo"), "demo");
        assert_eq!(codes(&diags), [W001, W002]);
        assert!(diags.iter().all(Diagnostic::is_warning));
        assert_eq!(
            diags[0].message,
            "demo: no hooks/hooks.json file found (only needed when using hooks)."
        );
    }
}
