use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Signal cycles missing: need one A and one B cycle, found {configured}")]
    MissingCycles { configured: usize },

    #[error("Invalid action: {0}")]
    InvalidAction(u8),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SignalError>;
