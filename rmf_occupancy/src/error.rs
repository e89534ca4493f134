//! Error types for rmf_occupancy

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a grid or drawing samples from it.
///
/// Collision queries never fail: off-grid or unknown cells resolve to the
/// unknown classification instead.
#[derive(Error, Debug)]
pub enum OccupancyError {
    #[error("{} is not a grayscale image (decoded as {})", .path.display(), .color)]
    NotGrayscale { path: PathBuf, color: String },

    #[error("failed to decode map image: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("buffer holds {actual} cells but a {width}x{height} grid needs {expected}")]
    BufferSizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("resolution must be positive and finite, got {0}")]
    InvalidResolution(f64),

    #[error("cell {index} holds {value}, expected -1 or a percentage in 0..=100")]
    InvalidCellValue { index: usize, value: i16 },

    #[error("object radius {radius} and margin {epsilon} must be finite and non-negative")]
    InvalidObjectRadius { radius: f64, epsilon: f64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("map metadata error: {0}")]
    MapMetadata(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] yaml_rust::ScanError),

    #[error("no free state found after {attempts} attempts")]
    NoFreeState { attempts: usize },
}

pub type Result<T> = std::result::Result<T, OccupancyError>;
