use thiserror::Error;

#[derive(Error, Debug)]
pub enum DdaError {
    #[error("Unknown difficulty profile: {0}")]
    UnknownProfile(String),

    #[error("Profile '{profile}' is missing factor '{factor}'")]
    MissingFactor { profile: String, factor: String },

    #[error("Unknown difficulty factor: {0}")]
    UnknownFactor(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DdaError>;
