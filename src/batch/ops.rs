use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;

use super::{BatchReport, FileOutcome};
use crate::cli::CompressionLevel;
use crate::error::SpritePrepError;
use crate::output::save_png;
use crate::sprite::{
    Bounds, CanvasSize, FileSet, Placement, SheetGrid, batch_max, crop_region, display_name,
    is_clipped, load_rgba, measure, place_on_canvas, slice_frame, trim_sprite,
};

/// Settings shared by every operation
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    pub compress: Option<CompressionLevel>,
}

/// Turn a per-file result into an outcome, so one bad file never stops a batch
pub(super) fn settle(source: &Path, result: Result<FileOutcome>) -> FileOutcome {
    result.unwrap_or_else(|error| FileOutcome::Failed {
        source: source.to_path_buf(),
        error,
    })
}

/// Destination of `source`: next to it (overwrite) or inside `output_dir`
fn output_path(source: &Path, output_dir: Option<&Path>) -> PathBuf {
    match (output_dir, source.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => source.to_path_buf(),
    }
}

fn finish(mut report: BatchReport, outcomes: Vec<FileOutcome>, verb: &str) -> BatchReport {
    for outcome in outcomes {
        outcome.log(verb);
        report.push(outcome);
    }
    report.log_summary();
    report
}

/// Copy a fixed rectangle of `input` into `output`
pub fn crop_region_file(
    input: &Path,
    output: &Path,
    region: Bounds,
    options: ProcessOptions,
) -> BatchReport {
    let outcome = settle(input, crop_region_one(input, output, region, options));
    finish(BatchReport::new("region"), vec![outcome], "Cropped")
}

fn crop_region_one(
    input: &Path,
    output: &Path,
    region: Bounds,
    options: ProcessOptions,
) -> Result<FileOutcome> {
    let image = load_rgba(input)?;
    let cropped = crop_region(&image, region)
        .with_context(|| format!("cannot crop {}", input.display()))?;
    save_png(&cropped, output, options.compress)?;
    Ok(FileOutcome::Written {
        source: input.to_path_buf(),
        output: output.to_path_buf(),
        from: image.dimensions(),
        to: cropped.dimensions(),
    })
}

/// Save frame `index` of the sprite sheet `input` to `output`
pub fn slice_frame_file(
    input: &Path,
    output: &Path,
    grid: SheetGrid,
    index: u32,
    options: ProcessOptions,
) -> BatchReport {
    let outcome = settle(input, slice_frame_one(input, output, grid, index, options));
    finish(BatchReport::new("frame"), vec![outcome], "Saved frame")
}

fn slice_frame_one(
    input: &Path,
    output: &Path,
    grid: SheetGrid,
    index: u32,
    options: ProcessOptions,
) -> Result<FileOutcome> {
    let sheet = load_rgba(input)?;
    let (width, height) = sheet.dimensions();
    info!("{} original: {}x{}", display_name(input), width, height);

    let frame = slice_frame(&sheet, grid, index)
        .with_context(|| format!("cannot slice {}", input.display()))?;
    save_png(&frame, output, options.compress)?;
    Ok(FileOutcome::Written {
        source: input.to_path_buf(),
        output: output.to_path_buf(),
        from: (width, height),
        to: frame.dimensions(),
    })
}

/// Crop every sprite in `files` to its visible content plus `padding`.
///
/// Fully transparent sprites are skipped and left untouched.
pub fn trim_batch(
    files: &FileSet,
    padding: u32,
    output_dir: Option<&Path>,
    options: ProcessOptions,
) -> Result<BatchReport> {
    let paths = collect_batch(files)?;
    debug!("Trimming with {}px padding", padding);

    let outcomes: Vec<FileOutcome> = paths
        .par_iter()
        .map(|path| settle(path, trim_one(path, padding, output_dir, options)))
        .collect();

    Ok(finish(BatchReport::new("trim"), outcomes, "Cropped"))
}

fn trim_one(
    path: &Path,
    padding: u32,
    output_dir: Option<&Path>,
    options: ProcessOptions,
) -> Result<FileOutcome> {
    let image = load_rgba(path)?;

    let Some((trimmed, _)) = trim_sprite(&image, padding) else {
        return Ok(FileOutcome::Skipped {
            source: path.to_path_buf(),
            reason: "no content found".to_string(),
        });
    };

    let output = output_path(path, output_dir);
    save_png(&trimmed, &output, options.compress)?;

    Ok(FileOutcome::Written {
        source: path.to_path_buf(),
        output,
        from: image.dimensions(),
        to: trimmed.dimensions(),
    })
}

/// Place every sprite in `files` on one uniform transparent canvas.
///
/// For a batch-max canvas, a first pass reads every header and sizes the
/// canvas from the successful reads; files that fail it are reported and
/// not processed further.
pub fn align_batch(
    files: &FileSet,
    canvas_size: CanvasSize,
    placement: Placement,
    output_dir: Option<&Path>,
    options: ProcessOptions,
) -> Result<BatchReport> {
    let paths = collect_batch(files)?;

    let mut rejected: Vec<Option<SpritePrepError>> = paths.iter().map(|_| None).collect();
    let canvas = if canvas_size.needs_measure() {
        let mut dims = Vec::with_capacity(paths.len());
        for (slot, result) in rejected.iter_mut().zip(measure(&paths)) {
            match result {
                Ok(d) => dims.push(d),
                Err(e) => *slot = Some(e),
            }
        }
        let max = batch_max(dims);
        info!("Max dimensions found: {}x{}", max.0, max.1);
        canvas_size.resolve(max)
    } else {
        canvas_size.resolve((0, 0))
    };
    info!("Using canvas size: {}x{}", canvas.0, canvas.1);

    let outcomes: Vec<FileOutcome> = paths
        .par_iter()
        .zip(rejected.into_par_iter())
        .map(|(path, rejected)| match rejected {
            Some(e) => FileOutcome::Failed {
                source: path.clone(),
                error: e.into(),
            },
            None => settle(path, align_one(path, canvas, placement, output_dir, options)),
        })
        .collect();

    Ok(finish(BatchReport::new("align"), outcomes, "Aligned"))
}

fn align_one(
    path: &Path,
    canvas: (u32, u32),
    placement: Placement,
    output_dir: Option<&Path>,
    options: ProcessOptions,
) -> Result<FileOutcome> {
    let image = load_rgba(path)?;
    if is_clipped(canvas, image.dimensions(), placement) {
        warn!(
            "{} ({}x{}) does not fit the {}x{} canvas and will be clipped",
            display_name(path),
            image.width(),
            image.height(),
            canvas.0,
            canvas.1
        );
    }

    let placed = place_on_canvas(&image, canvas, placement)?;
    let output = output_path(path, output_dir);
    save_png(&placed, &output, options.compress)?;

    Ok(FileOutcome::Written {
        source: path.to_path_buf(),
        output,
        from: image.dimensions(),
        to: canvas,
    })
}

fn collect_batch(files: &FileSet) -> Result<Vec<PathBuf>> {
    let paths = files.collect()?;
    if paths.is_empty() {
        return Err(SpritePrepError::NoImages {
            dir: files.dir.clone(),
            pattern: files.pattern.clone(),
        }
        .into());
    }
    info!(
        "Found {} files matching '{}' in {}",
        paths.len(),
        files.pattern,
        files.dir.display()
    );
    Ok(paths)
}
