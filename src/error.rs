use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, transforming or writing dataset files.
#[derive(Debug, Error)]
pub enum VocError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse XML annotation {path}: {source}")]
    XmlParse {
        path: PathBuf,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("failed to serialize XML annotation: {0}")]
    XmlWrite(#[from] quick_xml::DeError),

    #[error("failed to parse JSON file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("no annotation file found for image {0}")]
    MissingAnnotation(PathBuf),

    #[error("search failed: {0}")]
    Search(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, VocError>;
