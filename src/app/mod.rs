//! Application layer tying CLI, configuration and the resolver together

pub mod execution;
pub mod initialization;

pub use execution::{build_platform_support, build_target, load_plugin, run_resolve};
pub use initialization::{configure_logging, load_configuration};
