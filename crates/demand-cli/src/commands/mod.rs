pub mod completions;
pub mod config;
pub mod labels;
pub mod submit;
