pub mod actor;
pub mod constants;
pub mod error;
pub mod logging;
pub mod physics;
pub mod runtime;
pub mod scene;
pub mod scripting;
pub mod storage;
