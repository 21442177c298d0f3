// rook_core/src/error.rs
use thiserror::Error;

/// Fatal authoring and load failures. These represent broken content, not
/// recoverable runtime states; callers are expected to surface the
/// diagnostic and terminate.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("error: resources directory {0} is missing")]
    MissingResources(String),

    #[error("error: {0} is missing")]
    MissingConfig(String),

    #[error("error: scene {0} is missing")]
    MissingScene(String),

    #[error("error: template {0} is missing")]
    MissingTemplate(String),

    #[error("error: failed to locate component {0}")]
    MissingComponent(String),

    #[error("error: failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error: failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("error: component {type_name} is malformed: {message}")]
    MalformedComponent { type_name: String, message: String },

    #[error("error: template {name} is malformed: {message}")]
    MalformedTemplate { name: String, message: String },

    #[error("error: scene {name} is malformed: {message}")]
    MalformedScene { name: String, message: String },
}
