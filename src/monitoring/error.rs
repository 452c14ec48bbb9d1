//! Resolver Error Types
//!
//! Terminal failures of a resolution pass. None of them is ever returned
//! alongside a partial manifest.

use thiserror::Error;

/// Result type for resolver operations
pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The UIPlugin resource has no monitoring block at all
    #[error("monitoring configuration can not be empty for plugin type {plugin_type}")]
    MissingConfiguration { plugin_type: String },

    /// No sub-feature was requested
    #[error("monitoring configurations did not enable any features")]
    NoIntent,

    /// Every requested feature has an incomplete configuration
    #[error("{diagnostic}")]
    InvalidConfiguration { diagnostic: String },

    /// The compatibility matrix supports none of the requested features
    #[error("monitoring feature flags were not set, check cluster compatibility")]
    FeatureFlagsNotSet,

    /// Supported features were requested but none survived validation and the version gate
    #[error(
        "monitoring configurations are incompatible with feature flags, check cluster compatibility"
    )]
    Incompatible,
}

impl ResolveError {
    pub fn missing_configuration<S: Into<String>>(plugin_type: S) -> Self {
        Self::MissingConfiguration { plugin_type: plugin_type.into() }
    }

    pub fn invalid_configuration<S: Into<String>>(diagnostic: S) -> Self {
        Self::InvalidConfiguration { diagnostic: diagnostic.into() }
    }

    /// Nothing was asked for
    pub fn is_no_intent(&self) -> bool {
        matches!(self, ResolveError::NoIntent | ResolveError::MissingConfiguration { .. })
    }

    /// The user's configuration is incomplete
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ResolveError::InvalidConfiguration { .. })
    }

    /// The platform or a dependency prevents activation
    pub fn is_compatibility_error(&self) -> bool {
        matches!(self, ResolveError::FeatureFlagsNotSet | ResolveError::Incompatible)
    }
}
