//! Marketplace manifest (`.cursor-plugin/marketplace.json`) root checks.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::diagnostics::{Diagnostic, M001, M002, M003, M004, M005};
use crate::fs_util::{EntryKind, FileSystem};
use crate::path_safety;

/// Directory holding marketplace and plugin manifests.
pub const MANIFEST_DIR: &str = ".cursor-plugin";

/// Root manifest file name.
pub const MARKETPLACE_FILE: &str = "marketplace.json";

/// Per-plugin manifest file name.
pub const PLUGIN_FILE: &str = "plugin.json";

/// Plugin names: lowercase alphanumerics, hyphens and periods, starting and
/// ending with an alphanumeric.
static PLUGIN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?$").expect("plugin name regex")
});

/// Marketplace names: lowercase kebab-case.
static MARKETPLACE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$").expect("marketplace name regex")
});

/// Returns `true` if `name` is a valid plugin name.
#[must_use]
pub fn is_valid_plugin_name(name: &str) -> bool {
    PLUGIN_NAME_RE.is_match(name)
}

/// Returns `true` if `name` is a valid marketplace name.
#[must_use]
pub fn is_valid_marketplace_name(name: &str) -> bool {
    MARKETPLACE_NAME_RE.is_match(name)
}

/// Path of the root manifest, relative to the repository root.
#[must_use]
pub fn marketplace_manifest_path() -> PathBuf {
    Path::new(MANIFEST_DIR).join(MARKETPLACE_FILE)
}

/// Path of a plugin's manifest, relative to the repository root.
#[must_use]
pub fn plugin_manifest_path(plugin_dir: &Path) -> PathBuf {
    plugin_dir.join(MANIFEST_DIR).join(PLUGIN_FILE)
}

/// Check the marketplace `name` and `owner.name` fields.
#[must_use]
pub fn check_identity(manifest: &Value) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    let name_ok = manifest
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(is_valid_marketplace_name);
    if !name_ok {
        diags.push(
            Diagnostic::error(
                M001,
                "Marketplace \"name\" must be lowercase kebab-case and start/end with an alphanumeric character.",
            )
            .with_field("name")
            .with_suggestion("Use lowercase letters, digits, and hyphens (e.g., \"my-marketplace\")"),
        );
    }

    let owner_ok = manifest
        .pointer("/owner/name")
        .and_then(Value::as_str)
        .is_some_and(|n| !n.is_empty());
    if !owner_ok {
        diags.push(
            Diagnostic::error(M002, "Marketplace \"owner.name\" is required.").with_field("owner"),
        );
    }

    diags
}

/// The `plugins` entries, or the diagnostic explaining why there are none.
pub fn plugin_entries(manifest: &Value) -> Result<&[Value], Diagnostic> {
    match manifest.get("plugins").and_then(Value::as_array) {
        Some(plugins) if !plugins.is_empty() => Ok(plugins.as_slice()),
        _ => Err(
            Diagnostic::error(M003, "Marketplace \"plugins\" must be a non-empty array.")
                .with_field("plugins"),
        ),
    }
}

/// Check `metadata.pluginRoot`, if declared.
///
/// Returns the root to prefix plugin sources with. A declared root that is
/// not a safe relative path is reported and not applied; a safe root whose
/// directory is missing is reported and still applied.
pub fn check_plugin_root(
    fs: &dyn FileSystem,
    manifest: &Value,
) -> (Option<String>, Vec<Diagnostic>) {
    let mut diags = Vec::new();

    let Some(declared) = manifest.pointer("/metadata/pluginRoot") else {
        return (None, diags);
    };

    let root = match declared.as_str() {
        Some(root) if path_safety::is_safe(root) => root,
        _ => {
            diags.push(
                Diagnostic::error(
                    M004,
                    "Marketplace \"metadata.pluginRoot\" must be a safe relative path.",
                )
                .with_field("metadata"),
            );
            return (None, diags);
        }
    };

    let dir = Path::new(root);
    match fs.entry_kind(dir) {
        Some(EntryKind::Dir) => {}
        Some(EntryKind::File) => diags.push(Diagnostic::error(
            M005,
            format!(
                "Marketplace \"metadata.pluginRoot\" exists but is not a directory: {}",
                dir.display()
            ),
        )),
        None => diags.push(Diagnostic::error(
            M005,
            format!(
                "Marketplace \"metadata.pluginRoot\" directory is missing: {}",
                dir.display()
            ),
        )),
    }

    (Some(root.to_string()), diags)
}

/// Join a plugin `source` onto `plugin_root` unless it is already prefixed.
///
/// Separators are normalized to `/`. A source counts as prefixed only when
/// it equals the root or continues it with a full `/` segment, so
/// `plugins-extra/x` under root `plugins` becomes `plugins/plugins-extra/x`.
#[must_use]
pub fn resolve_source(source: &str, plugin_root: Option<&str>) -> String {
    let source = source.replace('\\', "/");
    let Some(root) = plugin_root else {
        return source;
    };
    let root = root.replace('\\', "/");
    let root = root.trim_end_matches('/');
    if source == root || source.starts_with(&format!("{root}/")) {
        source
    } else {
        format!("{root}/{source}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_util::MemoryFileSystem;
    use serde_json::json;

    #[test]
    fn plugin_name_pattern() {
        for ok in ["a", "demo", "my-plugin", "v1.2", "a.b-c9"] {
            assert!(is_valid_plugin_name(ok), "{ok} should be valid");
        }
        for bad in ["", "-a", "a-", ".a", "a.", "My-Plugin", "a_b", "a b"] {
            assert!(!is_valid_plugin_name(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn marketplace_name_rejects_periods() {
        assert!(is_valid_marketplace_name("my-market"));
        assert!(!is_valid_marketplace_name("my.market"));
    }

    #[test]
    fn identity_ok() {
        let m = json!({"name": "market", "owner": {"name": "Team"}});
        assert!(check_identity(&m).is_empty());
    }

    #[test]
    fn identity_errors() {
        let m = json!({"name": "Market", "owner": {"name": ""}});
        let codes: Vec<_> = check_identity(&m).iter().map(|d| d.code).collect();
        assert_eq!(codes, [M001, M002]);
        let codes: Vec<_> = check_identity(&json!({})).iter().map(|d| d.code).collect();
        assert_eq!(codes, [M001, M002]);
    }

    #[test]
    fn plugins_must_be_non_empty_array() {
        assert!(plugin_entries(&json!({"plugins": []})).is_err());
        assert!(plugin_entries(&json!({"plugins": {}})).is_err());
        assert!(plugin_entries(&json!({})).is_err());
        let err = plugin_entries(&json!({})).unwrap_err();
        assert_eq!(err.message, "Marketplace \"plugins\" must be a non-empty array.");
        assert_eq!(plugin_entries(&json!({"plugins": [1]})).unwrap().len(), 1);
    }

    #[test]
    fn plugin_root_absent_is_silent() {
        let fs = MemoryFileSystem::new();
        let (root, diags) = check_plugin_root(&fs, &json!({"metadata": {}}));
        assert!(root.is_none());
        assert!(diags.is_empty());
    }

    #[test]
    fn plugin_root_unsafe_is_m004_and_not_applied() {
        let fs = MemoryFileSystem::new();
        for bad in [json!("../up"), json!("/abs"), json!(""), json!(3), json!(null)] {
            let (root, diags) = check_plugin_root(&fs, &json!({"metadata": {"pluginRoot": bad}}));
            assert!(root.is_none());
            assert_eq!(diags.len(), 1);
            assert_eq!(diags[0].code, M004);
        }
    }

    #[test]
    fn plugin_root_missing_dir_is_m005_but_applied() {
        let fs = MemoryFileSystem::new().with_file("plugins", "a file");
        let (root, diags) =
            check_plugin_root(&fs, &json!({"metadata": {"pluginRoot": "plugins"}}));
        assert_eq!(root.as_deref(), Some("plugins"));
        assert_eq!(diags[0].code, M005);
        assert!(diags[0].message.contains("not a directory"));

        let fs = MemoryFileSystem::new();
        let (_, diags) = check_plugin_root(&fs, &json!({"metadata": {"pluginRoot": "plugins"}}));
        assert!(diags[0].message.contains("directory is missing: plugins"));
    }

    #[test]
    fn resolve_source_prefixes_once() {
        assert_eq!(resolve_source("a", None), "a");
        assert_eq!(resolve_source("a", Some("plugins")), "plugins/a");
        assert_eq!(resolve_source("plugins/a", Some("plugins/")), "plugins/a");
        assert_eq!(resolve_source("plugins", Some("plugins")), "plugins");
        assert_eq!(resolve_source("sub\\a", Some("plugins\\")), "plugins/sub/a");
    }

    #[test]
    fn resolve_source_partial_overlap_is_prefixed() {
        assert_eq!(
            resolve_source("plugins-extra/x", Some("plugins")),
            "plugins/plugins-extra/x"
        );
    }
}
