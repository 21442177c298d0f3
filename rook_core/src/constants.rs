// rook_core/src/constants.rs

/// Required config file at the root of the resources tree.
pub const GAME_CONFIG: &str = "game.config";

/// Folder (under the resources root) holding component definitions.
pub const COMPONENT_TYPES_DIR: &str = "component_types";
/// Folder holding scene files.
pub const SCENES_DIR: &str = "scenes";
/// Folder holding actor template files.
pub const TEMPLATES_DIR: &str = "actor_templates";

pub const COMPONENT_EXT: &str = "json";
pub const SCENE_EXT: &str = "scene";
pub const TEMPLATE_EXT: &str = "template";

/// The one component type backed by native state instead of script fields.
pub const RIGIDBODY_TYPE: &str = "Rigidbody";

/// Keys runtime-added components are given: "r0", "r1", ... per type.
pub const RUNTIME_KEY_PREFIX: &str = "r";
