mod load;
mod types;

pub use load::LoadedPipeline;
pub use types::{PipelineConfig, StepConfig};
