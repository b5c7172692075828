//! Stage selection and the sequential stage runner.

use std::fmt;

use tracing::{debug, info, warn};

use crate::combine::combine_all;
use crate::config::RecipeConfig;
use crate::constants::LOG_PREFIX;
use crate::download::download_corpus;
use crate::errors::PrepError;
use crate::lm_text::fetch_recipe_lm_text;
use crate::prepare::{SilenceTrimmer, prepare_parts};
use crate::transport::http::Fetcher;

/// One numbered step of the preparation pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Fetch and extract corpus archives.
    Download = 1,
    /// Trim (optionally) and normalize each part into a data directory.
    Prepare = 2,
    /// Merge data directories.
    Combine = 3,
    /// Fetch and reformat the external text corpus.
    FetchLmText = 4,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [
        Stage::Download,
        Stage::Prepare,
        Stage::Combine,
        Stage::FetchLmText,
    ];

    /// Numeric stage id.
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Human-readable description logged on stage entry.
    pub fn description(self) -> &'static str {
        match self {
            Stage::Download => "download and extract corpus parts",
            Stage::Prepare => "trim silence and prepare data directories",
            Stage::Combine => "combine data directories",
            Stage::FetchLmText => "fetch and reformat external text corpus",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {}: {}", self.id(), self.description())
    }
}

/// Inclusive `[start, stop]` stage range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageRange {
    /// First stage to run.
    pub start: i32,
    /// Last stage to run.
    pub stop: i32,
}

impl StageRange {
    /// Build a range; an inverted range selects nothing.
    pub fn new(start: i32, stop: i32) -> Self {
        Self { start, stop }
    }

    /// True iff `start <= n <= stop`.
    pub fn contains(&self, n: i32) -> bool {
        self.start <= n && n <= self.stop
    }

    /// True when no stage number can satisfy the range.
    pub fn is_empty(&self) -> bool {
        self.start > self.stop
    }
}

impl Default for StageRange {
    fn default() -> Self {
        Self { start: 1, stop: 100 }
    }
}

/// Stages executed and skipped by one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Stages whose bodies ran, in order.
    pub executed: Vec<Stage>,
    /// Stages outside the requested range.
    pub skipped: Vec<Stage>,
}

/// Walks [`Stage::ALL`] in order, running the stages inside the range and
/// halting at the first error.
pub struct StageRunner<'a> {
    config: &'a RecipeConfig,
    fetcher: &'a dyn Fetcher,
    trimmer: &'a dyn SilenceTrimmer,
}

impl<'a> StageRunner<'a> {
    /// Create a runner over an immutable configuration.
    pub fn new(
        config: &'a RecipeConfig,
        fetcher: &'a dyn Fetcher,
        trimmer: &'a dyn SilenceTrimmer,
    ) -> Self {
        Self {
            config,
            fetcher,
            trimmer,
        }
    }

    /// Run every stage whose id lies in `range`.
    pub fn run(&self, range: StageRange) -> Result<RunReport, PrepError> {
        if range.is_empty() {
            warn!(
                start = range.start,
                stop = range.stop,
                "{LOG_PREFIX} stage range is empty, nothing to do"
            );
        }
        let mut report = RunReport::default();
        for stage in Stage::ALL {
            if !range.contains(stage.id()) {
                debug!(stage = stage.id(), "{LOG_PREFIX} outside requested range");
                report.skipped.push(stage);
                continue;
            }
            info!("{LOG_PREFIX} {stage}");
            self.run_stage(stage)?;
            report.executed.push(stage);
        }
        info!("{LOG_PREFIX} successfully finished");
        Ok(report)
    }

    fn run_stage(&self, stage: Stage) -> Result<(), PrepError> {
        match stage {
            Stage::Download => {
                download_corpus(self.config, self.fetcher)?;
            }
            Stage::Prepare => {
                for prepared in prepare_parts(self.config, self.trimmer)? {
                    info!(
                        utterances = prepared.utterances,
                        trimmed = prepared.trimmed_files,
                        "{LOG_PREFIX} prepared {}",
                        prepared.data_dir.display()
                    );
                }
            }
            Stage::Combine => {
                if self.config.combine.is_empty() {
                    info!("{LOG_PREFIX} no data directories to combine");
                }
                combine_all(self.config)?;
            }
            Stage::FetchLmText => {
                fetch_recipe_lm_text(self.config, self.fetcher)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive_on_both_ends() {
        for start in -2..=6 {
            for stop in -2..=6 {
                let range = StageRange::new(start, stop);
                for n in -3..=7 {
                    assert_eq!(range.contains(n), start <= n && n <= stop);
                }
            }
        }
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(StageRange::new(3, 2).is_empty());
        assert!(!StageRange::new(2, 2).is_empty());
        assert!(StageRange::default().contains(4));
    }

    #[test]
    fn stages_are_numbered_in_order() {
        let ids: Vec<i32> = Stage::ALL.iter().map(|stage| stage.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(
            Stage::Download.to_string(),
            "stage 1: download and extract corpus parts"
        );
    }
}
