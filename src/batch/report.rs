use std::path::PathBuf;

use log::{error, info, warn};

use crate::sprite::display_name;

/// What happened to one input file
#[derive(Debug)]
pub enum FileOutcome {
    Written {
        source: PathBuf,
        output: PathBuf,
        from: (u32, u32),
        to: (u32, u32),
    },
    Skipped {
        source: PathBuf,
        reason: String,
    },
    Failed {
        source: PathBuf,
        error: anyhow::Error,
    },
}

impl FileOutcome {
    pub fn source(&self) -> &PathBuf {
        match self {
            FileOutcome::Written { source, .. }
            | FileOutcome::Skipped { source, .. }
            | FileOutcome::Failed { source, .. } => source,
        }
    }

    /// Emit the per-file progress line
    pub fn log(&self, verb: &str) {
        match self {
            FileOutcome::Written {
                source,
                output,
                from,
                to,
            } => {
                if source == output {
                    info!(
                        "{} {}: {}x{} -> {}x{}",
                        verb,
                        display_name(source),
                        from.0,
                        from.1,
                        to.0,
                        to.1
                    );
                } else {
                    info!(
                        "{} {} from {}: {}x{} -> {}x{}",
                        verb,
                        display_name(output),
                        display_name(source),
                        from.0,
                        from.1,
                        to.0,
                        to.1
                    );
                }
            }
            FileOutcome::Skipped { source, reason } => {
                warn!("Skipped {}: {}", display_name(source), reason);
            }
            FileOutcome::Failed { source, error } => {
                error!("Error processing {}: {:#}", display_name(source), error);
            }
        }
    }
}

/// Ordered outcomes of one operation
#[derive(Debug)]
pub struct BatchReport {
    /// Operation name used in the summary line
    pub operation: String,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }

    pub fn log_summary(&self) {
        let line = format!(
            "{}: {} written, {} skipped, {} failed",
            self.operation,
            self.written(),
            self.skipped(),
            self.failed()
        );
        if self.has_failures() {
            warn!("{}", line);
        } else {
            info!("{}", line);
        }
    }
}

/// Log the overall totals of a run and decide its exit status.
///
/// Returns false only when `strict` is set and at least one file failed.
pub fn summarize_run(reports: &[BatchReport], strict: bool) -> bool {
    let failed: usize = reports.iter().map(BatchReport::failed).sum();
    let written: usize = reports.iter().map(BatchReport::written).sum();

    if failed > 0 {
        warn!("Done with {} file(s) written and {} failure(s)", written, failed);
    } else {
        info!("Done! {} file(s) written", written);
    }

    !(strict && failed > 0)
}
