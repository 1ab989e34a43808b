mod canvas;
mod loader;
mod sheet;
mod sprite;
mod trimmer;

pub use canvas::{CanvasSize, Placement, is_clipped, new_canvas, place_on_canvas};
pub use loader::{DEFAULT_PATTERN, FileSet, batch_max, display_name, load_rgba, measure};
pub use sheet::{SheetGrid, crop_region, slice_frame};
pub use sprite::{Bounds, TrimInfo};
pub use trimmer::{content_bounds, trim_sprite};
