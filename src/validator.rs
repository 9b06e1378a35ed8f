//! Marketplace validation entry point.

use std::collections::HashSet;
use std::path::Path;

use crate::diagnostics::Report;
use crate::fs_util::{FileSystem, OsFileSystem};
use crate::loader::load_manifest;
use crate::marketplace::{
    check_identity, check_plugin_root, marketplace_manifest_path, plugin_entries,
};
use crate::plugin::validate_entry;

/// Validate the marketplace tree exposed by `fs`.
///
/// Plugins are checked in manifest order and a failing plugin never stops
/// the ones after it. A missing or malformed root manifest, or a missing
/// `plugins` array, ends the run early.
#[must_use]
pub fn validate_marketplace(fs: &dyn FileSystem) -> Report {
    let mut report = Report::new();

    let manifest = match load_manifest(fs, &marketplace_manifest_path(), "Marketplace manifest") {
        Ok(manifest) => manifest,
        Err(diag) => {
            report.push(diag);
            return report;
        }
    };

    report.merge(check_identity(&manifest));

    let plugins = match plugin_entries(&manifest) {
        Ok(plugins) => plugins,
        Err(diag) => {
            report.push(diag);
            return report;
        }
    };

    let (plugin_root, diags) = check_plugin_root(fs, &manifest);
    report.merge(diags);

    let mut seen = HashSet::new();
    for (index, entry) in plugins.iter().enumerate() {
        report.merge(validate_entry(
            fs,
            index,
            entry,
            plugin_root.as_deref(),
            &mut seen,
        ));
    }

    tracing::debug!(
        plugins = plugins.len(),
        diagnostics = report.diagnostics().len(),
        "marketplace validation finished"
    );
    report
}

/// Validate the marketplace repository rooted at `root` on disk.
#[must_use]
pub fn validate_repository(root: &Path) -> Report {
    validate_marketplace(&OsFileSystem::new(root))
}
