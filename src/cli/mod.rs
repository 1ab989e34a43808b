mod args;

pub use args::{
    AlignArgs, Anchor, CliArgs, Command, CompressionLevel, ExtractArgs, FrameArgs, FrameRange,
    GlobalArgs, RegionArgs, RunArgs, TrimArgs,
};
