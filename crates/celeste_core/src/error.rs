use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing level data and tilesets
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TSX: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("TSX file has no <image> element: {0}")]
    MissingImage(PathBuf),

    #[error("No tiles could be loaded from the TSX, the tile directory or the atlas")]
    EmptyPalette,
}
