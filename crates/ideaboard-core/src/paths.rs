use crate::error::{BoardError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Data layout constants
// ---------------------------------------------------------------------------

pub const IDEAS_DIR: &str = "ideas";
pub const SPRINTS_FILE: &str = "sprints.json";
pub const NOTIFICATIONS_FILE: &str = "notifications.jsonl";
pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_ROOT_DIR: &str = ".ideaboard";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn ideas_dir(root: &Path) -> PathBuf {
    root.join(IDEAS_DIR)
}

pub fn idea_file(root: &Path, id: &str) -> PathBuf {
    ideas_dir(root).join(format!("{id}.md"))
}

pub fn sprints_path(root: &Path) -> PathBuf {
    root.join(SPRINTS_FILE)
}

pub fn notifications_path(root: &Path) -> PathBuf {
    root.join(NOTIFICATIONS_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Default data root: `~/.ideaboard`.
pub fn default_root() -> Result<PathBuf> {
    let mut home = home::home_dir().ok_or(BoardError::HomeNotFound)?;
    home.push(DEFAULT_ROOT_DIR);
    Ok(home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/board");
        assert_eq!(
            idea_file(root, "IDEA-001"),
            PathBuf::from("/tmp/board/ideas/IDEA-001.md")
        );
        assert_eq!(sprints_path(root), PathBuf::from("/tmp/board/sprints.json"));
        assert_eq!(
            notifications_path(root),
            PathBuf::from("/tmp/board/notifications.jsonl")
        );
        assert_eq!(config_path(root), PathBuf::from("/tmp/board/config.json"));
    }
}
