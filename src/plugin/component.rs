//! Component file (rules, skills, agents, commands) frontmatter validation.

use std::fmt;
use std::path::Path;

use crate::diagnostics::{Diagnostic, F001, F002, F003, F004};
use crate::fs_util::FileSystem;
use crate::parser::{has_value, parse_frontmatter};

/// Markdown extensions accepted for rules, agents and commands.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdc", "markdown"];

/// Basename that marks a skill definition.
const SKILL_FILE: &str = "SKILL.md";

/// A kind of frontmatter-bearing plugin component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Markdown rule under `rules/`.
    Rule,
    /// `SKILL.md` file under `skills/`.
    Skill,
    /// Markdown agent definition under `agents/`.
    Agent,
    /// Markdown or text command under `commands/`.
    Command,
}

impl ComponentKind {
    /// All kinds, in validation order.
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Rule,
        ComponentKind::Skill,
        ComponentKind::Agent,
        ComponentKind::Command,
    ];

    /// Directory under the plugin root holding this kind.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            ComponentKind::Rule => "rules",
            ComponentKind::Skill => "skills",
            ComponentKind::Agent => "agents",
            ComponentKind::Command => "commands",
        }
    }

    /// Frontmatter keys that must be present and non-empty.
    #[must_use]
    pub fn required_keys(self) -> &'static [&'static str] {
        match self {
            ComponentKind::Rule => &["description"],
            ComponentKind::Skill | ComponentKind::Agent | ComponentKind::Command => {
                &["name", "description"]
            }
        }
    }

    /// Returns `true` if `path` is a file of this kind.
    #[must_use]
    pub fn selects(self, path: &Path) -> bool {
        if self == ComponentKind::Skill {
            return path.file_name().is_some_and(|n| n == SKILL_FILE);
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        MARKDOWN_EXTENSIONS.contains(&ext.as_str())
            || (self == ComponentKind::Command && ext == "txt")
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentKind::Rule => "rule",
            ComponentKind::Skill => "skill",
            ComponentKind::Agent => "agent",
            ComponentKind::Command => "command",
        };
        f.write_str(label)
    }
}

/// Validate the frontmatter of every component file under `plugin_dir`.
///
/// Component directories that do not exist are skipped. Every selected
/// file is checked even after earlier failures, and each entry the walk
/// could not read gets its own error.
#[must_use]
pub fn validate_components(
    fs: &dyn FileSystem,
    plugin_dir: &Path,
    plugin_name: &str,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    for kind in ComponentKind::ALL {
        let dir = plugin_dir.join(kind.dir_name());
        if !fs.exists(&dir) {
            continue;
        }

        let walk = match fs.walk_files(&dir) {
            Ok(walk) => walk,
            Err(e) => {
                diags.push(Diagnostic::error(
                    F004,
                    format!(
                        "{plugin_name}: cannot list {kind} directory {}: {e}",
                        dir.display()
                    ),
                ));
                continue;
            }
        };
        tracing::trace!(
            plugin = plugin_name,
            %kind,
            count = walk.files.len(),
            failed = walk.failures.len(),
            "walked component directory"
        );

        for (path, e) in &walk.failures {
            diags.push(Diagnostic::error(
                F004,
                format!(
                    "{plugin_name}: cannot list {kind} directory {}: {e}",
                    path.display()
                ),
            ));
        }

        for file in walk.files.iter().filter(|f| kind.selects(f)) {
            diags.extend(validate_component_file(fs, file, kind, plugin_name));
        }
    }

    diags
}

/// Validate a single component file's frontmatter.
#[must_use]
pub fn validate_component_file(
    fs: &dyn FileSystem,
    file: &Path,
    kind: ComponentKind,
    plugin_name: &str,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let shown = file.display();

    let content = match fs.read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            diags.push(Diagnostic::error(
                F001,
                format!("{plugin_name}: cannot read {kind} file {shown}: {e}"),
            ));
            return diags;
        }
    };

    let Some(frontmatter) = parse_frontmatter(&content) else {
        diags.push(
            Diagnostic::error(
                F002,
                format!("{plugin_name}: {kind} file missing YAML frontmatter: {shown}"),
            )
            .with_suggestion("Start the file with a `---` block of `key: value` lines"),
        );
        return diags;
    };

    for key in kind.required_keys() {
        if !has_value(&frontmatter, key) {
            diags.push(Diagnostic::error(
                F003,
                format!("{plugin_name}: {kind} file missing \"{key}\" in frontmatter: {shown}"),
            ));
        }
    }

    diags
}
