use thiserror::Error;

#[derive(Error, Debug)]
pub enum BocchiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request has no body")]
    MissingBody,

    #[error("Request body is JSON null")]
    NullBody,

    #[error("Request body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, BocchiError>;
