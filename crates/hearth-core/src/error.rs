use thiserror::Error;

/// Error type for the domain layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The entity's domain prefix has no registered device capability.
    #[error("unsupported device domain: {domain}")]
    UnsupportedDomain { domain: String },

    /// An underlying API call failed.
    #[error(transparent)]
    Api(#[from] hearth_api::Error),
}
