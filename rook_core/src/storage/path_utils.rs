// rook_core/src/storage/path_utils.rs
use crate::constants::*;
use directories_next::ProjectDirs;
use std::path::{Path, PathBuf};

/// Per-user data directory (log files live under it). Falls back to the
/// working directory when the platform offers no home.
pub fn app_dir() -> PathBuf {
    match ProjectDirs::from("com", "rook", "rook") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => PathBuf::from("."),
    }
}

/// Folder holding component definition files.
pub fn component_types_dir(resource_root: &Path) -> PathBuf {
    resource_root.join(COMPONENT_TYPES_DIR)
}

/// Folder holding scene files.
pub fn scenes_dir(resource_root: &Path) -> PathBuf {
    resource_root.join(SCENES_DIR)
}

/// Folder holding actor template files.
pub fn templates_dir(resource_root: &Path) -> PathBuf {
    resource_root.join(TEMPLATES_DIR)
}

/// Path of a scene file by name.
pub fn scene_path(resource_root: &Path, name: &str) -> PathBuf {
    scenes_dir(resource_root).join(format!("{name}.{SCENE_EXT}"))
}
