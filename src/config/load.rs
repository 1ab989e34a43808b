use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::PipelineConfig;

/// A loaded pipeline file with its associated directory.
///
/// Paths in the pipeline are relative to the file location,
/// so we need to track where it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedPipeline {
    /// The parsed pipeline
    pub config: PipelineConfig,
    /// The directory containing the pipeline file
    pub config_dir: PathBuf,
}

impl LoadedPipeline {
    /// Load a pipeline file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pipeline file: {}", path.display()))?;

        let config: PipelineConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse pipeline file: {}", path.display()))?;

        if config.version != 1 {
            anyhow::bail!(
                "unsupported pipeline version {} in {}",
                config.version,
                path.display()
            );
        }

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self { config, config_dir })
    }

    /// Resolve a pipeline path relative to the pipeline file directory.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.config_dir.join(path)
    }
}
