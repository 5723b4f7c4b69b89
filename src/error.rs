use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfoApiError {
    #[error("Info name must not be empty")]
    EmptyName,
    #[error("Malformed info name: {0:?}")]
    MalformedName(String),
    #[error("Metadata {key:?} cannot be set on {name:?} after it has been used")]
    MetadataSealed { name: String, key: String },
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, InfoApiError>;

// Helper conversions
impl From<config::ConfigError> for InfoApiError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
