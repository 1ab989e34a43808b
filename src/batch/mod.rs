mod extract;
mod ops;
mod pipeline;
mod report;

pub use extract::{ExtractJob, FrameSelection, extract_frames};
pub use ops::{ProcessOptions, align_batch, crop_region_file, slice_frame_file, trim_batch};
pub use pipeline::{describe_pipeline, run_pipeline};
pub use report::{BatchReport, FileOutcome, summarize_run};
