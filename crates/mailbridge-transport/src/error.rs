//! Error types for transport resolution.

/// Boxed error returned by transport factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Registry error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No factory registered under the name.
    #[error("Transport not registered: {0}")]
    UnknownTransport(String),

    /// No default transport configured.
    #[error("No default transport configured")]
    NoDefault,

    /// The factory failed to construct the transport.
    #[error("Failed to construct transport {name}: {source}")]
    Construction {
        /// Registered transport name.
        name: String,
        /// Error returned by the factory.
        source: BoxError,
    },
}
