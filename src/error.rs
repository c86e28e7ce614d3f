use thiserror::Error;

/// Failures talking to the catalog actor. Unknown ids and exhausted stock are
/// not errors: those operations are no-ops or report `false`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("Gateway task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Service shutdown error: {0}")]
    Shutdown(String),
}
