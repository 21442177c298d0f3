pub mod json;
pub mod path_utils;
