pub mod config;
pub mod extract;
pub mod fields;
pub mod filesystem;
pub mod inject;
pub mod literal;
pub mod runtime;
pub mod style;
