//! Optional free-text context documents folded into the prompt verbatim.

use std::fs;
use std::path::Path;

/// Global (per-user) and local (per-project) context blobs. Absence of either
/// file is normal and not an error.
#[derive(Debug, Clone, Default)]
pub struct ContextDocs {
    pub global: Option<String>,
    pub local: Option<String>,
}

impl ContextDocs {
    pub fn load(config_dir: &Path, cwd: &Path) -> Self {
        Self {
            global: read_optional(&config_dir.join("context.md")),
            local: read_optional(&cwd.join(".nlsh-context")),
        }
    }
}

fn read_optional(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}
