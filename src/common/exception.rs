use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),
    #[error("failed to read cache config: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("failed to parse cache config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("invalid command: {0}")]
    Command(String),
}
