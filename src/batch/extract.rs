use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::RgbaImage;
use log::{debug, info};
use rayon::prelude::*;
use serde::Deserialize;

use super::ops::{ProcessOptions, settle};
use super::{BatchReport, FileOutcome};
use crate::cli::FrameRange;
use crate::error::SpritePrepError;
use crate::output::save_png;
use crate::sprite::{
    CanvasSize, FileSet, Placement, batch_max, display_name, load_rgba, place_on_canvas,
    trim_sprite,
};

/// Which frames of a sorted source folder go into the animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSelection {
    #[default]
    All,
    /// The first N frames
    First(usize),
    /// Frames whose leading filename digits fall in the range
    Range(FrameRange),
}

impl FrameSelection {
    /// Filter an already sorted list of frame paths
    pub fn apply(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        match *self {
            FrameSelection::All => paths,
            FrameSelection::First(n) => paths.into_iter().take(n).collect(),
            FrameSelection::Range(range) => paths
                .into_iter()
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .and_then(leading_number)
                        .is_some_and(|n| n >= range.start && n <= range.end)
                })
                .collect(),
        }
    }
}

/// Decimal number at the start of a filename (`0105.png` -> 105)
fn leading_number(name: &str) -> Option<u32> {
    let end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    name[..end].parse().ok()
}

/// Settings for building a numbered animation out of a folder of frames
#[derive(Debug, Clone)]
pub struct ExtractJob {
    pub source: FileSet,
    pub dest_dir: PathBuf,
    pub selection: FrameSelection,
    /// Frames are written as `{name_prefix}{n:04}.png`, n starting at 1
    pub name_prefix: String,
    pub canvas: CanvasSize,
    pub placement: Placement,
    /// Delete existing `{name_prefix}*` files in `dest_dir` before writing
    pub clean: bool,
}

impl ExtractJob {
    /// Output path of the `position`-th selected frame (1-based)
    pub fn output_path(&self, position: usize) -> PathBuf {
        self.dest_dir
            .join(format!("{}{:04}.png", self.name_prefix, position))
    }
}

/// A selected frame after trimming, before placement
struct Trimmed {
    source: PathBuf,
    output: PathBuf,
    from: (u32, u32),
    image: RgbaImage,
}

/// Trim each selected frame and normalize it onto a uniform canvas.
///
/// Frame numbers follow the selection order; a frame skipped for having no
/// content leaves a gap in the numbering.
pub fn extract_frames(job: &ExtractJob, options: ProcessOptions) -> Result<BatchReport> {
    if job.name_prefix.is_empty() {
        return Err(SpritePrepError::EmptyPrefix.into());
    }

    let frames = job.selection.apply(job.source.collect()?);
    if frames.is_empty() {
        return Err(SpritePrepError::NoImages {
            dir: job.source.dir.clone(),
            pattern: job.source.pattern.clone(),
        }
        .into());
    }
    info!(
        "Extracting {} frames from {}",
        frames.len(),
        job.source.dir.display()
    );

    // Pass 1: decode and trim
    let trimmed: Vec<Result<Trimmed, FileOutcome>> = frames
        .par_iter()
        .enumerate()
        .map(|(i, path)| trim_frame(path, job.output_path(i + 1)))
        .collect();

    // Clean only after decoding; selected source frames are never removed
    if job.clean {
        remove_old_outputs(&job.dest_dir, &job.name_prefix, &frames)?;
    }

    let max = batch_max(
        trimmed
            .iter()
            .filter_map(|t| t.as_ref().ok())
            .map(|t| t.image.dimensions()),
    );
    let canvas = job.canvas.resolve(max);
    info!("Using uniform canvas: {}x{}", canvas.0, canvas.1);

    // Pass 2: place and save
    let outcomes: Vec<FileOutcome> = trimmed
        .into_par_iter()
        .map(|frame| match frame {
            Ok(frame) => {
                let source = frame.source.clone();
                settle(&source, place_frame(frame, canvas, job.placement, options))
            }
            Err(outcome) => outcome,
        })
        .collect();

    let mut report = BatchReport::new("extract");
    for outcome in outcomes {
        outcome.log("Created");
        report.push(outcome);
    }
    report.log_summary();
    Ok(report)
}

fn trim_frame(path: &Path, output: PathBuf) -> Result<Trimmed, FileOutcome> {
    let image = load_rgba(path).map_err(|e| FileOutcome::Failed {
        source: path.to_path_buf(),
        error: e.into(),
    })?;

    match trim_sprite(&image, 0) {
        Some((trimmed, _)) => Ok(Trimmed {
            source: path.to_path_buf(),
            output,
            from: image.dimensions(),
            image: trimmed,
        }),
        None => Err(FileOutcome::Skipped {
            source: path.to_path_buf(),
            reason: "no content".to_string(),
        }),
    }
}

fn place_frame(
    frame: Trimmed,
    canvas: (u32, u32),
    placement: Placement,
    options: ProcessOptions,
) -> Result<FileOutcome> {
    let placed = place_on_canvas(&frame.image, canvas, placement)?;
    save_png(&placed, &frame.output, options.compress)?;
    Ok(FileOutcome::Written {
        source: frame.source,
        output: frame.output,
        from: frame.from,
        to: canvas,
    })
}

/// Delete every file in `dir` whose name starts with `prefix`, except `keep`
fn remove_old_outputs(
    dir: &Path,
    prefix: &str,
    keep: &[PathBuf],
) -> Result<usize, SpritePrepError> {
    if prefix.is_empty() {
        return Err(SpritePrepError::EmptyPrefix);
    }
    if !dir.is_dir() {
        return Ok(0);
    }
    let keep: HashSet<PathBuf> = keep.iter().filter_map(|p| p.canonicalize().ok()).collect();

    let entries = std::fs::read_dir(dir).map_err(|e| SpritePrepError::Cleanup {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut removed = 0;
    for entry in entries {
        let path = entry
            .map_err(|e| SpritePrepError::Cleanup {
                path: dir.to_path_buf(),
                source: e,
            })?
            .path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix));
        if !matches || !path.is_file() {
            continue;
        }
        if path.canonicalize().is_ok_and(|p| keep.contains(&p)) {
            debug!("Keeping source frame {}", display_name(&path));
            continue;
        }
        std::fs::remove_file(&path).map_err(|e| SpritePrepError::Cleanup {
            path: path.clone(),
            source: e,
        })?;
        info!("Deleted old {}", display_name(&path));
        removed += 1;
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::DEFAULT_PATTERN;
    use image::Rgba;

    fn write_frame(dir: &Path, name: &str, content: Option<(u32, u32)>) {
        let img = RgbaImage::from_fn(40, 40, |x, y| match content {
            Some((w, h)) if x >= 3 && x < 3 + w && y >= 2 && y < 2 + h => {
                Rgba([90, 30, 10, 255])
            }
            _ => Rgba([0, 0, 0, 0]),
        });
        img.save(dir.join(name)).unwrap();
    }

    fn job(source: &Path, dest: &Path, selection: FrameSelection) -> ExtractJob {
        ExtractJob {
            source: FileSet::new(source, DEFAULT_PATTERN),
            dest_dir: dest.to_path_buf(),
            selection,
            name_prefix: "goblin_hurt_".to_string(),
            canvas: CanvasSize::Fixed(21, 21),
            placement: Placement::bottom(0),
            clean: false,
        }
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("0105.png"), Some(105));
        assert_eq!(leading_number("0100_atk.png"), Some(100));
        assert_eq!(leading_number("atk_0100.png"), None);
    }

    #[test]
    fn test_selection_range() {
        let paths: Vec<PathBuf> = ["0099.png", "0100.png", "0105.png", "0110.png", "0111.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let selected = FrameSelection::Range(FrameRange {
            start: 100,
            end: 110,
        })
        .apply(paths);

        assert_eq!(
            selected,
            [
                PathBuf::from("0100.png"),
                PathBuf::from("0105.png"),
                PathBuf::from("0110.png")
            ]
        );
    }

    #[test]
    fn test_selection_json() {
        let first: FrameSelection = serde_json::from_str(r#"{"first": 5}"#).unwrap();
        assert_eq!(first, FrameSelection::First(5));
        let all: FrameSelection = serde_json::from_str(r#""all""#).unwrap();
        assert_eq!(all, FrameSelection::All);
    }

    #[test]
    fn test_extract_first_frames() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        for i in 0..7 {
            write_frame(src.path(), &format!("{:04}.png", 100 + i), Some((5, 8)));
        }

        let report = extract_frames(
            &job(src.path(), dest.path(), FrameSelection::First(5)),
            ProcessOptions::default(),
        )
        .unwrap();

        assert_eq!(report.written(), 5);
        for n in 1..=5 {
            let out = image::open(dest.path().join(format!("goblin_hurt_{:04}.png", n)))
                .unwrap()
                .into_rgba8();
            assert_eq!(out.dimensions(), (21, 21));
            // x = (21 - 5) / 2 = 8, y = 21 - 8 = 13
            assert_eq!(out.get_pixel(8, 13)[3], 255);
            assert_eq!(out.get_pixel(7, 13)[3], 0);
            assert_eq!(out.get_pixel(12, 20)[3], 255);
        }
        assert!(!dest.path().join("goblin_hurt_0006.png").exists());
    }

    #[test]
    fn test_extract_skipped_frame_keeps_numbering() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write_frame(src.path(), "0100.png", Some((4, 4)));
        write_frame(src.path(), "0101.png", None);
        write_frame(src.path(), "0102.png", Some((4, 4)));

        let report = extract_frames(
            &job(src.path(), dest.path(), FrameSelection::All),
            ProcessOptions::default(),
        )
        .unwrap();

        assert_eq!(report.written(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(dest.path().join("goblin_hurt_0001.png").exists());
        assert!(!dest.path().join("goblin_hurt_0002.png").exists());
        assert!(dest.path().join("goblin_hurt_0003.png").exists());
    }

    #[test]
    fn test_extract_clean_removes_old_frames() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        for i in 0..3 {
            write_frame(src.path(), &format!("{:04}.png", 100 + i), Some((6, 6)));
        }
        for name in ["goblin_hurt_0001.png", "goblin_hurt_0009.png", "goblin_idle_0001.png"] {
            write_frame(dest.path(), name, Some((1, 1)));
        }

        let mut job = job(
            src.path(),
            dest.path(),
            FrameSelection::Range(FrameRange {
                start: 100,
                end: 101,
            }),
        );
        job.clean = true;
        let report = extract_frames(&job, ProcessOptions::default()).unwrap();

        assert_eq!(report.written(), 2);
        assert!(dest.path().join("goblin_hurt_0001.png").exists());
        assert!(dest.path().join("goblin_hurt_0002.png").exists());
        assert!(!dest.path().join("goblin_hurt_0009.png").exists());
        assert!(dest.path().join("goblin_idle_0001.png").exists());
    }

    #[test]
    fn test_extract_batch_max_canvas() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write_frame(src.path(), "0001.png", Some((6, 10)));
        write_frame(src.path(), "0002.png", Some((12, 4)));

        let mut job = job(src.path(), dest.path(), FrameSelection::All);
        job.canvas = CanvasSize::BatchMax {
            square: false,
            grow: 0,
        };
        extract_frames(&job, ProcessOptions::default()).unwrap();

        for n in 1..=2 {
            let size = image::image_dimensions(job.output_path(n)).unwrap();
            assert_eq!(size, (12, 10));
        }
    }

    #[test]
    fn test_extract_empty_selection_is_error() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write_frame(src.path(), "0001.png", Some((6, 10)));

        let result = extract_frames(
            &job(src.path(), dest.path(), FrameSelection::First(0)),
            ProcessOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_empty_prefix_is_rejected_before_cleaning() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write_frame(src.path(), "0001.png", Some((6, 10)));
        write_frame(dest.path(), "player_avatar.png", Some((4, 4)));
        std::fs::write(dest.path().join("strings.xml"), "<resources/>").unwrap();

        let mut job = job(src.path(), dest.path(), FrameSelection::All);
        job.name_prefix = String::new();
        job.clean = true;
        let err = extract_frames(&job, ProcessOptions::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SpritePrepError>(),
            Some(SpritePrepError::EmptyPrefix)
        ));
        assert!(dest.path().join("player_avatar.png").exists());
        assert!(dest.path().join("strings.xml").exists());
        assert!(!dest.path().join("0001.png").exists());
    }

    #[test]
    fn test_extract_clean_into_source_folder_keeps_frames() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            let name = format!("goblin_hurt_{:04}.png", 100 + i);
            write_frame(dir.path(), &name, Some((6, 6)));
        }
        std::fs::write(dir.path().join("goblin_hurt_backup.bin"), b"stale").unwrap();

        let mut job = job(dir.path(), dir.path(), FrameSelection::All);
        job.clean = true;
        let report = extract_frames(&job, ProcessOptions::default()).unwrap();

        assert_eq!(report.written(), 3);
        assert_eq!(report.failed(), 0);
        for i in 0..3 {
            assert!(dir.path().join(format!("goblin_hurt_{:04}.png", 100 + i)).exists());
            assert!(job.output_path(i + 1).exists());
        }
        assert!(!dir.path().join("goblin_hurt_backup.bin").exists());
    }
}
