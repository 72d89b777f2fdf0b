use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Schema(#[from] rowforge_core::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("value list error: {0}")]
    ValueList(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
