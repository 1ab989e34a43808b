use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpritePrepError {
    #[error("Failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to save image '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("No files matching '{pattern}' found in '{dir}'")]
    NoImages { dir: PathBuf, pattern: String },

    #[error("Frame {index} is out of range for a {columns}x{rows} sheet")]
    InvalidFrame { index: u32, columns: u32, rows: u32 },

    #[error("Cannot split a {width}x{height} sheet into {columns}x{rows} frames")]
    InvalidGrid {
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
    },

    #[error("Canvas {width}x{height} exceeds the {limit} byte allocation limit")]
    CanvasTooLarge { width: u32, height: u32, limit: u64 },

    #[error("Output name prefix must not be empty")]
    EmptyPrefix,

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove old output '{path}': {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to compress PNG '{path}': {message}")]
    PngCompress { path: PathBuf, message: String },

    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),
}
