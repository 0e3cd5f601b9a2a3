use thiserror::Error;

/// Result type used across the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Canonical error representation shared by the e2e crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("{0}")]
    General(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Deserialization(err.to_string())
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::General(err.to_string())
    }
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable is missing: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {key}: {value}")]
    InvalidEnvVar { key: String, value: String },

    #[error("error when parsing openshift job spec data: {source}")]
    InvalidJobSpec {
        #[source]
        source: serde_json::Error,
    },
}

impl From<ConfigError> for CoreError {
    fn from(value: ConfigError) -> Self {
        CoreError::Config(value.to_string())
    }
}
