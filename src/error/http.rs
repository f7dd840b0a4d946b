use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to read cacert '{path}': {source}")]
    ReadCacert {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid cacert: {source}")]
    InvalidCacert {
        #[source]
        source: reqwest::Error,
    },
}
