use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("css minify error: {0}")]
    CssMinify(String),

    #[error("{role} directory does not exist: {path}")]
    MissingDirectory { role: &'static str, path: String },

    #[error("invalid versioning value '{0}': expected 'md5', 'content' or 'git'")]
    InvalidVersioning(String),

    #[error("non-existent path '{include}' referenced from '{manifest}'")]
    MissingIncludePath { manifest: String, include: String },

    #[error("invalid artifact name '{0}': versioned files must contain '.min.'")]
    InvalidFilename(String),

    #[error("output file already exists: {0}")]
    OutputCollision(String),

    #[error("{count} reduction error(s) in '{path}'")]
    Reduction { path: String, count: usize },

    #[error("invalid config: {0}")]
    Config(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
