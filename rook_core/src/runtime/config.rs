// rook_core/src/runtime/config.rs
use crate::constants::GAME_CONFIG;
use crate::error::EngineError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// `resources/game.config`: the few members the runtime cares about.
/// Unknown members are ignored so games can keep their own settings in the
/// same file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub game_title: String,
    pub initial_scene: Option<String>,
}

impl GameConfig {
    /// Loads the config from the resources root. The root directory and
    /// the config file are both required.
    pub fn load(resource_root: &Path) -> Result<GameConfig, EngineError> {
        if !resource_root.exists() {
            return Err(EngineError::MissingResources(
                resource_root.display().to_string(),
            ));
        }

        let path = resource_root.join(GAME_CONFIG);
        if !path.exists() {
            return Err(EngineError::MissingConfig(path.display().to_string()));
        }

        let text = fs::read_to_string(&path).map_err(|e| EngineError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        serde_json::from_str(&text).map_err(|e| EngineError::Json {
            path: path.display().to_string(),
            source: e,
        })
    }
}
