use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use spriteprep::batch::{
    ExtractJob, FrameSelection, ProcessOptions, align_batch, crop_region_file, describe_pipeline,
    extract_frames, run_pipeline, slice_frame_file, summarize_run, trim_batch,
};
use spriteprep::cli::{CliArgs, Command};
use spriteprep::config::LoadedPipeline;
use spriteprep::sprite::{Bounds, DEFAULT_PATTERN, FileSet, Placement, SheetGrid};

#[allow(clippy::print_stderr)]
fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            // Use eprintln instead of error! because logger may not be initialized
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when `--strict` is set and some file failed
fn run() -> Result<bool> {
    let cli = CliArgs::parse();

    env_logger::Builder::new()
        .filter_level(if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    let options = ProcessOptions {
        compress: cli.global.compress,
    };

    let reports = match &cli.command {
        Command::Region(args) => vec![crop_region_file(
            &args.input,
            &args.output,
            Bounds {
                x: args.x,
                y: args.y,
                width: args.width,
                height: args.height,
            },
            options,
        )],
        Command::Frame(args) => vec![slice_frame_file(
            &args.input,
            &args.output,
            SheetGrid::new(args.columns, args.rows),
            args.index,
            options,
        )],
        Command::Trim(args) => vec![trim_batch(
            &FileSet::new(&args.dir, &args.pattern),
            args.padding,
            args.output_dir.as_deref(),
            options,
        )?],
        Command::Align(args) => vec![align_batch(
            &FileSet::new(&args.dir, &args.pattern),
            args.canvas_size(),
            Placement {
                anchor: args.anchor,
                bottom_margin: args.bottom_margin,
            },
            args.output_dir.as_deref(),
            options,
        )?],
        Command::Extract(args) => {
            let selection = match (args.first, args.range) {
                (Some(n), _) => FrameSelection::First(n),
                (None, Some(range)) => FrameSelection::Range(range),
                (None, None) => FrameSelection::All,
            };
            let job = ExtractJob {
                source: FileSet::new(&args.source_dir, DEFAULT_PATTERN),
                dest_dir: args.dest_dir.clone(),
                selection,
                name_prefix: args.name_prefix.clone(),
                canvas: args.canvas,
                placement: Placement::bottom(0),
                clean: args.clean,
            };
            vec![extract_frames(&job, options)?]
        }
        Command::Run(args) => {
            let pipeline = LoadedPipeline::load(&args.pipeline)
                .with_context(|| format!("failed to load pipeline: {}", args.pipeline.display()))?;
            if args.dry_run {
                for line in describe_pipeline(&pipeline) {
                    info!("{}", line);
                }
                return Ok(true);
            }
            run_pipeline(&pipeline, options)
        }
    };

    Ok(summarize_run(&reports, cli.global.strict))
}
