use anyhow::Result;
use log::{error, info};

use super::{
    BatchReport, ExtractJob, ProcessOptions, align_batch, crop_region_file, extract_frames,
    slice_frame_file, trim_batch,
};
use crate::config::{LoadedPipeline, StepConfig};
use crate::sprite::{Bounds, FileSet, Placement, SheetGrid};

/// Run every step of a pipeline in order.
///
/// A step that cannot start (missing folder, no matching files) is logged
/// and the remaining steps still run.
pub fn run_pipeline(pipeline: &LoadedPipeline, options: ProcessOptions) -> Vec<BatchReport> {
    let total = pipeline.config.steps.len();
    let mut reports = Vec::with_capacity(total);

    for (i, step) in pipeline.config.steps.iter().enumerate() {
        info!("Step {}/{}: {}", i + 1, total, step.op_name());
        match run_step(pipeline, step, options) {
            Ok(report) => reports.push(report),
            Err(e) => error!("Step {} ({}) failed: {:#}", i + 1, step.op_name(), e),
        }
    }

    reports
}

/// Describe each step with its resolved paths, without running anything
pub fn describe_pipeline(pipeline: &LoadedPipeline) -> Vec<String> {
    pipeline
        .config
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let detail = match step {
                StepConfig::Region { input, output, .. }
                | StepConfig::Frame { input, output, .. } => {
                    format!(
                        "{} -> {}",
                        pipeline.resolve(input).display(),
                        pipeline.resolve(output).display()
                    )
                }
                StepConfig::Trim { dir, pattern, .. } | StepConfig::Align { dir, pattern, .. } => {
                    format!("{}", pipeline.resolve(dir).join(pattern).display())
                }
                StepConfig::Extract {
                    source_dir,
                    pattern,
                    dest_dir,
                    ..
                } => format!(
                    "{} -> {}",
                    pipeline.resolve(source_dir).join(pattern).display(),
                    pipeline.resolve(dest_dir).display()
                ),
            };
            format!("{}. {} {}", i + 1, step.op_name(), detail)
        })
        .collect()
}

fn run_step(
    pipeline: &LoadedPipeline,
    step: &StepConfig,
    options: ProcessOptions,
) -> Result<BatchReport> {
    let report = match step {
        StepConfig::Region {
            input,
            output,
            x,
            y,
            width,
            height,
        } => crop_region_file(
            &pipeline.resolve(input),
            &pipeline.resolve(output),
            Bounds {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            },
            options,
        ),
        StepConfig::Frame {
            input,
            output,
            columns,
            rows,
            index,
        } => slice_frame_file(
            &pipeline.resolve(input),
            &pipeline.resolve(output),
            SheetGrid::new(*columns, *rows),
            *index,
            options,
        ),
        StepConfig::Trim {
            dir,
            pattern,
            padding,
            output_dir,
        } => trim_batch(
            &FileSet::new(pipeline.resolve(dir), pattern.clone()),
            *padding,
            output_dir.as_deref().map(|d| pipeline.resolve(d)).as_deref(),
            options,
        )?,
        StepConfig::Align {
            dir,
            pattern,
            canvas,
            anchor,
            bottom_margin,
            output_dir,
        } => align_batch(
            &FileSet::new(pipeline.resolve(dir), pattern.clone()),
            *canvas,
            Placement {
                anchor: *anchor,
                bottom_margin: *bottom_margin,
            },
            output_dir.as_deref().map(|d| pipeline.resolve(d)).as_deref(),
            options,
        )?,
        StepConfig::Extract {
            source_dir,
            pattern,
            dest_dir,
            selection,
            name_prefix,
            canvas,
            anchor,
            bottom_margin,
            clean,
        } => extract_frames(
            &ExtractJob {
                source: FileSet::new(pipeline.resolve(source_dir), pattern.clone()),
                dest_dir: pipeline.resolve(dest_dir),
                selection: *selection,
                name_prefix: name_prefix.clone(),
                canvas: *canvas,
                placement: Placement {
                    anchor: *anchor,
                    bottom_margin: *bottom_margin,
                },
                clean: *clean,
            },
            options,
        )?,
    };

    Ok(report)
}
