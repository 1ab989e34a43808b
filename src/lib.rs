pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod sprite;

pub use batch::{BatchReport, FileOutcome, ProcessOptions};
pub use cli::{CliArgs, Command};
pub use error::SpritePrepError;
pub use sprite::{Bounds, CanvasSize, FileSet, Placement, SheetGrid, TrimInfo};
