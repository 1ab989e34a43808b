use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

use crate::sprite::{CanvasSize, DEFAULT_PATTERN};

#[derive(Parser, Debug)]
#[command(name = "spriteprep")]
#[command(version, about = "Crop, align and normalize sprite images", long_about = None)]
pub struct CliArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_missing_value = "2",
        num_args = 0..=1
    )]
    pub compress: Option<CompressionLevel>,

    /// Exit with an error status if any file failed
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Copy a fixed rectangle out of one image
    Region(RegionArgs),
    /// Extract one frame from a sprite sheet
    Frame(FrameArgs),
    /// Crop sprites to their visible content (in place unless --output-dir)
    Trim(TrimArgs),
    /// Place sprites on a uniform transparent canvas
    Align(AlignArgs),
    /// Build a numbered animation from a folder of frames
    Extract(ExtractArgs),
    /// Run the steps of a pipeline file in order
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RegionArgs {
    /// Source image
    pub input: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Left edge of the region
    #[arg(long, default_value_t = 0)]
    pub x: u32,

    /// Top edge of the region
    #[arg(long, default_value_t = 0)]
    pub y: u32,

    /// Region width in pixels
    #[arg(long)]
    pub width: u32,

    /// Region height in pixels
    #[arg(long)]
    pub height: u32,
}

#[derive(Args, Debug, Clone)]
pub struct FrameArgs {
    /// Sprite sheet image
    pub input: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of frame columns in the sheet
    #[arg(long)]
    pub columns: u32,

    /// Number of frame rows in the sheet
    #[arg(long, default_value_t = 1)]
    pub rows: u32,

    /// 1-based frame number (row-major)
    #[arg(long, default_value_t = 1)]
    pub index: u32,
}

#[derive(Args, Debug, Clone)]
pub struct TrimArgs {
    /// Directory holding the sprites
    pub dir: PathBuf,

    /// Filename pattern selecting the sprites
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Keep N pixels of transparent border around the content
    #[arg(short, long, default_value_t = 0)]
    pub padding: u32,

    /// Write results here instead of overwriting the sources
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct AlignArgs {
    /// Directory holding the sprites
    pub dir: PathBuf,

    /// Filename pattern selecting the sprites
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Canvas size: a side length (227), WIDTHxHEIGHT (201x180), or 'max' for the batch maximum
    #[arg(long, default_value = "max")]
    pub canvas: CanvasSize,

    /// With --canvas max, use the larger dimension on both sides
    #[arg(long)]
    pub square: bool,

    /// With --canvas max, add N pixels to each side length
    #[arg(long, default_value_t = 0)]
    pub grow: u32,

    /// Where the sprite sits on the canvas
    #[arg(long, value_enum, default_value_t = Anchor::Bottom)]
    pub anchor: Anchor,

    /// Gap in pixels between the sprite and the canvas bottom
    #[arg(long, default_value_t = 0)]
    pub bottom_margin: u32,

    /// Write results here instead of overwriting the sources
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl AlignArgs {
    /// Canvas size with --square/--grow applied
    pub fn canvas_size(&self) -> CanvasSize {
        match self.canvas {
            CanvasSize::BatchMax { .. } => CanvasSize::BatchMax {
                square: self.square,
                grow: self.grow,
            },
            fixed => fixed,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Folder of individual animation frames
    pub source_dir: PathBuf,

    /// Folder receiving the numbered frames
    pub dest_dir: PathBuf,

    /// Take only the first N frames
    #[arg(long, conflicts_with = "range")]
    pub first: Option<usize>,

    /// Take frames whose numeric filename prefix is in START-END (inclusive)
    #[arg(long, value_name = "START-END", conflicts_with = "first")]
    pub range: Option<FrameRange>,

    /// Output name prefix; frames are written as PREFIX0001.png, PREFIX0002.png, ...
    #[arg(short = 'n', long, value_parser = NonEmptyStringValueParser::new())]
    pub name_prefix: String,

    /// Canvas size: a side length or WIDTHxHEIGHT
    #[arg(long, default_value = "201")]
    pub canvas: CanvasSize,

    /// Delete existing PREFIX* files in the destination first
    #[arg(long)]
    pub clean: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Pipeline JSON file
    pub pipeline: PathBuf,

    /// Print the resolved steps without touching any file
    #[arg(long)]
    pub dry_run: bool,
}

/// Vertical anchoring of a sprite on its canvas
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Centered horizontally, resting on the canvas bottom
    #[default]
    Bottom,
    /// Centered on both axes
    Center,
}

/// Inclusive range of numeric filename prefixes (e.g. 100-110)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FrameRange {
    pub start: u32,
    pub end: u32,
}

impl std::str::FromStr for FrameRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("expected START-END, got {}", s))?;
        let start = start
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid range start '{}': {}", start, e))?;
        let end = end
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid range end '{}': {}", end, e))?;
        if start > end {
            return Err(format!("range start {} is after end {}", start, end));
        }
        Ok(FrameRange { start, end })
    }
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::Level(2)
    }
}
