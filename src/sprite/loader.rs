use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{ImageReader, RgbaImage};
use log::warn;
use rayon::prelude::*;

use crate::error::SpritePrepError;

/// Default pattern for sprite files
pub const DEFAULT_PATTERN: &str = "*.png";

/// A directory plus a filename glob selecting the sprites of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    pub dir: PathBuf,
    pub pattern: String,
}

impl FileSet {
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    /// List matching files sorted by filename.
    ///
    /// Only the filename is matched, never the directory part, and
    /// subdirectories are not descended into.
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(SpritePrepError::InputNotFound(self.dir.clone()).into());
        }

        let pattern = glob::Pattern::new(&self.pattern)
            .with_context(|| format!("invalid file pattern: {}", self.pattern))?;

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read directory: {}", self.dir.display()))?
        {
            let path = entry
                .with_context(|| format!("failed to read entry in: {}", self.dir.display()))?
                .path();
            let Some(name) = path.file_name() else {
                continue;
            };
            let Some(name) = name.to_str() else {
                warn!("Ignoring non UTF-8 filename: {}", path.display());
                continue;
            };
            if pattern.matches(name) && path.is_file() {
                paths.push(path);
            }
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }
}

/// Decode an image file and convert it to RGBA8
pub fn load_rgba(path: &Path) -> Result<RgbaImage, SpritePrepError> {
    let img = ImageReader::open(path)
        .map_err(|e| SpritePrepError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .with_guessed_format()
        .map_err(|e| SpritePrepError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .decode()
        .map_err(|e| SpritePrepError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?
        .into_rgba8();

    Ok(img)
}

/// Read the dimensions of every file from its header, in input order
pub fn measure(paths: &[PathBuf]) -> Vec<Result<(u32, u32), SpritePrepError>> {
    paths
        .par_iter()
        .map(|path| {
            image::image_dimensions(path).map_err(|e| SpritePrepError::ImageLoad {
                path: path.clone(),
                source: e,
            })
        })
        .collect()
}

/// Largest width and largest height over a batch (independently)
pub fn batch_max(dimensions: impl IntoIterator<Item = (u32, u32)>) -> (u32, u32) {
    dimensions
        .into_iter()
        .fold((0, 0), |(mw, mh), (w, h)| (mw.max(w), mh.max(h)))
}

/// File name for log lines
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_collect_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "goblin_walk_0002.png", 2, 2);
        write_png(dir.path(), "goblin_walk_0001.png", 2, 2);
        write_png(dir.path(), "knight_idle.png", 2, 2);
        std::fs::write(dir.path().join("goblin_notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("goblin_dir.png")).unwrap();

        let files = FileSet::new(dir.path(), "goblin_*.png").collect().unwrap();
        let names: Vec<_> = files.iter().map(|p| display_name(p)).collect();

        assert_eq!(names, ["goblin_walk_0001.png", "goblin_walk_0002.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_ignores_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "goblin_ok.png", 2, 2);
        let raw = dir.path().join(OsStr::from_bytes(b"goblin_\xff.png"));
        std::fs::write(&raw, b"x").unwrap();

        let files = FileSet::new(dir.path(), "goblin_*.png").collect().unwrap();
        assert_eq!(files, [dir.path().join("goblin_ok.png")]);
    }

    #[test]
    fn test_collect_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSet::new(dir.path().join("nope"), DEFAULT_PATTERN).collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_measure_and_batch_max() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 30, 12);
        let b = write_png(dir.path(), "b.png", 18, 40);
        let bad = dir.path().join("c.png");
        std::fs::write(&bad, b"not a png").unwrap();

        let dims = measure(&[a, b, bad]);
        assert_eq!(dims[0].as_ref().ok(), Some(&(30, 12)));
        assert_eq!(dims[1].as_ref().ok(), Some(&(18, 40)));
        assert!(dims[2].is_err());

        let max = batch_max(dims.into_iter().filter_map(Result::ok));
        assert_eq!(max, (30, 40));
    }

    #[test]
    fn test_load_rgba_converts_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([5, 6, 7]))
            .save(&path)
            .unwrap();

        let img = load_rgba(&path).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(*img.get_pixel(0, 0), Rgba([5, 6, 7, 255]));
    }
}
