use thiserror::Error;

use crate::core::types::{CharacterId, LocationId};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),

    #[error("Location not found: {0}")]
    LocationNotFound(LocationId),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Invalid medical record: {0}")]
    InvalidRecord(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
