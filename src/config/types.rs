use std::path::PathBuf;

use serde::Deserialize;

use crate::batch::FrameSelection;
use crate::cli::Anchor;
use crate::sprite::{CanvasSize, DEFAULT_PATTERN};

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_one() -> u32 {
    1
}

fn default_canvas() -> CanvasSize {
    CanvasSize::BatchMax {
        square: false,
        grow: 0,
    }
}

/// One operation of a pipeline.
///
/// Relative paths are relative to the pipeline file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StepConfig {
    /// Copy a fixed rectangle out of one image
    Region {
        input: PathBuf,
        output: PathBuf,
        #[serde(default)]
        x: u32,
        #[serde(default)]
        y: u32,
        width: u32,
        height: u32,
    },
    /// Extract one frame of a sprite sheet
    Frame {
        input: PathBuf,
        output: PathBuf,
        columns: u32,
        #[serde(default = "default_one")]
        rows: u32,
        #[serde(default = "default_one")]
        index: u32,
    },
    /// Crop sprites to their visible content
    Trim {
        dir: PathBuf,
        #[serde(default = "default_pattern")]
        pattern: String,
        #[serde(default)]
        padding: u32,
        #[serde(default)]
        output_dir: Option<PathBuf>,
    },
    /// Place sprites on a uniform canvas
    Align {
        dir: PathBuf,
        #[serde(default = "default_pattern")]
        pattern: String,
        #[serde(default = "default_canvas")]
        canvas: CanvasSize,
        #[serde(default)]
        anchor: Anchor,
        #[serde(default)]
        bottom_margin: u32,
        #[serde(default)]
        output_dir: Option<PathBuf>,
    },
    /// Build a numbered animation from a folder of frames
    Extract {
        source_dir: PathBuf,
        #[serde(default = "default_pattern")]
        pattern: String,
        dest_dir: PathBuf,
        #[serde(default)]
        selection: FrameSelection,
        name_prefix: String,
        #[serde(default = "default_canvas")]
        canvas: CanvasSize,
        #[serde(default)]
        anchor: Anchor,
        #[serde(default)]
        bottom_margin: u32,
        #[serde(default)]
        clean: bool,
    },
}

impl StepConfig {
    pub fn op_name(&self) -> &'static str {
        match self {
            StepConfig::Region { .. } => "region",
            StepConfig::Frame { .. } => "frame",
            StepConfig::Trim { .. } => "trim",
            StepConfig::Align { .. } => "align",
            StepConfig::Extract { .. } => "extract",
        }
    }
}

/// Pipeline file structure
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline file version (currently 1)
    #[serde(default = "default_one")]
    pub version: u32,
    /// Steps, run in order
    pub steps: Vec<StepConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::FrameRange;

    #[test]
    fn test_parse_steps_with_defaults() {
        let json = r#"{
            "steps": [
                { "op": "trim", "dir": "drawable", "pattern": "goblin_*.png", "padding": 2 },
                { "op": "align", "dir": "drawable", "canvas": { "fixed": [227, 227] } },
                { "op": "frame", "input": "Knight_1/Idle.png",
                  "output": "player_avatar.png", "columns": 10 }
            ]
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.version, 1);
        assert_eq!(
            config.steps[0],
            StepConfig::Trim {
                dir: "drawable".into(),
                pattern: "goblin_*.png".to_string(),
                padding: 2,
                output_dir: None,
            }
        );
        assert_eq!(
            config.steps[1],
            StepConfig::Align {
                dir: "drawable".into(),
                pattern: "*.png".to_string(),
                canvas: CanvasSize::Fixed(227, 227),
                anchor: Anchor::Bottom,
                bottom_margin: 0,
                output_dir: None,
            }
        );
        assert_eq!(
            config.steps[2],
            StepConfig::Frame {
                input: "Knight_1/Idle.png".into(),
                output: "player_avatar.png".into(),
                columns: 10,
                rows: 1,
                index: 1,
            }
        );
    }

    #[test]
    fn test_parse_extract_step() {
        let json = r#"{
            "op": "extract",
            "source_dir": "Goblin/Atk2",
            "dest_dir": ".",
            "selection": { "range": { "start": 100, "end": 110 } },
            "name_prefix": "goblin_hurt_",
            "canvas": { "fixed": [201, 201] },
            "clean": true
        }"#;
        let step: StepConfig = serde_json::from_str(json).unwrap();

        let StepConfig::Extract {
            selection, clean, ..
        } = step
        else {
            panic!("expected extract step");
        };
        assert_eq!(
            selection,
            FrameSelection::Range(FrameRange {
                start: 100,
                end: 110
            })
        );
        assert!(clean);
    }

    #[test]
    fn test_demo_pipeline_parses() {
        let config: PipelineConfig =
            serde_json::from_str(include_str!("../../demos/quizbattle.json")).unwrap();
        assert_eq!(config.steps.len(), 9);
        assert_eq!(config.steps[8].op_name(), "extract");
    }

    #[test]
    fn test_variant_demo_pipeline_parses() {
        let config: PipelineConfig =
            serde_json::from_str(include_str!("../../demos/goblin_variants.json")).unwrap();
        assert_eq!(config.steps.len(), 4);
        assert!(matches!(config.steps[0], StepConfig::Trim { padding: 2, .. }));
        assert!(matches!(
            config.steps[1],
            StepConfig::Align {
                canvas: CanvasSize::Fixed(227, 227),
                ..
            }
        ));
        assert!(matches!(
            config.steps[2],
            StepConfig::Align {
                canvas: CanvasSize::BatchMax {
                    square: true,
                    grow: 20
                },
                bottom_margin: 10,
                ..
            }
        ));
        assert!(matches!(
            config.steps[3],
            StepConfig::Extract {
                selection: FrameSelection::First(5),
                clean: false,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let json = r#"{ "steps": [ { "op": "rotate", "dir": "x" } ] }"#;
        assert!(serde_json::from_str::<PipelineConfig>(json).is_err());
    }
}
