use thiserror::Error;

/// Library error type for gallery-engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog contains no images.
    #[error("catalog contains no images")]
    EmptyCatalog,

    /// Two catalog entries share the same `src` path.
    #[error("duplicate image src in catalog: {0}")]
    DuplicateSrc(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde catalog or configuration error.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
