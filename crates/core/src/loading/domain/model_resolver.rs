use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download failed for {url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("model file not found: {0}")]
    NotFound(String),
}

/// Locates a model file on disk, fetching it if necessary.
pub trait ModelResolver: Send {
    fn resolve(&self, file_name: &str) -> Result<PathBuf, ModelResolveError>;
}
