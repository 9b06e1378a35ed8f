//! Restricted frontmatter parser for component files.
//!
//! Only flat `key: value` lines are understood. Nested YAML, lists and
//! quoting are not interpreted; values are kept verbatim after trimming.

use std::collections::BTreeMap;

/// Delimiter line that opens and closes a frontmatter block.
pub const DELIMITER: &str = "---";

/// Flat frontmatter mapping.
pub type Frontmatter = BTreeMap<String, String>;

/// Extract the frontmatter block at the start of `content`.
///
/// Returns `None` when the text does not open with a `---` line or no later
/// `---` line followed by a newline closes the block. The closing line must
/// come after the opening one, so `---\n---\n` holds no block.
#[must_use]
pub fn parse_frontmatter(content: &str) -> Option<Frontmatter> {
    let normalized = content.replace("\r\n", "\n");
    let rest = normalized.strip_prefix(&format!("{DELIMITER}\n"))?;
    let close = rest.find(&format!("\n{DELIMITER}\n"))?;

    let mut fields = Frontmatter::new();
    for line in rest[..close].split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        fields.insert(key.trim().to_string(), value.trim().to_string());
    }

    Some(fields)
}

/// Returns `true` if `key` is present with a non-empty value.
#[must_use]
pub fn has_value(frontmatter: &Frontmatter, key: &str) -> bool {
    frontmatter.get(key).is_some_and(|v| !v.is_empty())
}
