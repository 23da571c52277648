//! Errors raised while loading screening results

use thiserror::Error;

/// Anything that keeps a load from producing text to parse
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server answered with a non-success status
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Loader thread went away without reporting
    #[error("load was interrupted")]
    Interrupted,
}

pub type LoadResult<T> = Result<T, LoadError>;
