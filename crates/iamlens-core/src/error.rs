//! Error types shared by every iamlens frontend

use thiserror::Error;

/// Result type for iamlens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Everything that can abort a lookup session.
///
/// None of these are retried. An empty result set is not an error; it is
/// reported through [`crate::session::Outcome::notice`].
#[derive(Error, Debug)]
pub enum LensError {
    /// An interactive prompt is needed but there is no terminal to draw it on
    #[error("Interactive selector unavailable: {0}")]
    DependencyMissing(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to parse document from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Service not found in catalog: {0}")]
    ServiceNotFound(String),

    /// The operator cancelled a prompt
    #[error("No {0} selected")]
    NoSelection(&'static str),

    #[error("Service '{0}' defines no resource types")]
    NoResourceTypes(String),

    #[error("Service '{service}' has no resource type named '{resource}'")]
    UnknownResource { service: String, resource: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}
