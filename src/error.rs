//! Error types for the deckify library.

use std::io;
use thiserror::Error;

/// Result type alias for deckify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during outline planning or deck building.
///
/// The heuristic outline strategy is total over its input domain and never
/// produces an error; everything here belongs to the remote strategy or to
/// template/package handling.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing the ZIP package.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the template.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required package component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error while assembling the output deck.
    #[error("Render error: {0}")]
    Render(String),

    /// The remote strategy was asked for a provider it does not know.
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The remote strategy is missing required configuration.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// The remote call failed in transit (network failure or non-2xx status).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote response was not the strict JSON outline we asked for.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors carry URLs but never credentials; safe to stringify.
        Error::Transport(err.to_string())
    }
}
