use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = MosaicError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum MosaicError {
    #[error("could not read icon directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not inspect {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("could not save image {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("icon {} is {width}x{height}, icons must be {expected}x{expected}", .path.display())]
    IconSize {
        path: PathBuf,
        width: u32,
        height: u32,
        expected: u32,
    },
    #[error("empty averaging region at ({x}, {y})")]
    EmptyRegion { x: u32, y: u32 },
    #[error("region {width}x{height} at ({x}, {y}) lies outside the image")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("no icons available from {}", .path.display())]
    EmptyCatalog { path: PathBuf },
    #[error("icon {name} appears more than once in the catalog")]
    DuplicateIcon { name: String },
    #[error("icon {name} is not part of the catalog")]
    MissingIcon { name: String },
    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("could not write placement plan {}: {source}", .path.display())]
    WritePlan {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize placement plan: {0}")]
    SerializePlan(#[from] serde_json::Error),
}
