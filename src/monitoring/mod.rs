//! Monitoring console plugin resolution
//!
//! Validation, version gating, feature resolution and manifest building for
//! the monitoring UI plugin.

pub mod compatibility;
pub mod config;
pub mod error;
pub mod features;
pub mod manifest;
pub mod resolver;
pub mod service;
pub mod validator;

pub use compatibility::{is_compatible, CompatibilityEntry, CompatibilityMatrix, DependencyGate};
pub use config::{MonitoringConfiguration, NormalizedMonitoring, ResolverDefaults, UIPlugin};
pub use error::{ResolveError, ResolveResult};
pub use features::{Feature, FeatureSet};
pub use manifest::{PluginManifest, PluginTarget};
pub use resolver::{resolve, MonitoringResolver, PlatformSupport, ResolvedPlugin};
pub use service::ServiceDescriptor;
pub use validator::{validate, Validation};
