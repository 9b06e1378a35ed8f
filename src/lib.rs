pub mod diagnostics;
pub mod errors;
pub mod fs_util;
pub mod loader;
pub mod marketplace;
pub mod parser;
pub mod path_safety;
pub mod plugin;
pub mod reporter;
pub mod validator;

// Re-export key types at crate root for convenience.
pub use diagnostics::{Diagnostic, Report, Severity};
pub use errors::{MarketcheckError, Result};
pub use fs_util::{FileSystem, MemoryFileSystem, OsFileSystem, Walk};
pub use parser::{parse_frontmatter, Frontmatter};
pub use path_safety::{classify, SafePath, UnsafePath};
pub use plugin::{
    validate_components, validate_references, ComponentKind, PathField, PluginManifest,
};
pub use validator::{validate_marketplace, validate_repository};
