use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::cli::CompressionLevel;
use crate::error::SpritePrepError;

/// Save an image as PNG, optionally with compression.
///
/// Missing parent directories are created.
pub fn save_png(
    image: &RgbaImage,
    path: &Path,
    compress: Option<CompressionLevel>,
) -> Result<(), SpritePrepError> {
    let png_data = encode_png(image, path, compress)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| SpritePrepError::OutputWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, png_data).map_err(|e| SpritePrepError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Encode to PNG in memory; `path` is only used for error messages
fn encode_png(
    image: &RgbaImage,
    path: &Path,
    compress: Option<CompressionLevel>,
) -> Result<Vec<u8>, SpritePrepError> {
    let mut png_data = Cursor::new(Vec::new());
    image
        .write_to(&mut png_data, ImageFormat::Png)
        .map_err(|e| SpritePrepError::ImageSave {
            path: path.to_path_buf(),
            source: e,
        })?;

    let Some(level) = compress else {
        return Ok(png_data.into_inner());
    };

    // Compress with oxipng
    let opts = match level {
        CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
        CompressionLevel::Max => oxipng::Options::max_compression(),
    };
    oxipng::optimize_from_memory(&png_data.into_inner(), &opts).map_err(|e| {
        SpritePrepError::PngCompress {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })
}
