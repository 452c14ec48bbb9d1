//! Rendering of resolved plugins

pub mod reports;

pub use reports::render;
