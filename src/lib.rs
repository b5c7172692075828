#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line surface.
pub mod cli;
/// Dataset-combination stage.
pub mod combine;
/// Recipe configuration and presets.
pub mod config;
/// Centralized constants used across stages.
pub mod constants;
/// Typed corpus part identifiers.
pub mod corpus;
/// Download-and-extract stage.
pub mod download;
/// External text corpus stage.
pub mod lm_text;
/// Data directory manifests.
pub mod manifest;
/// Downstream pipeline hand-off.
pub mod pipeline;
/// Silence trimming and directory normalization stage.
pub mod prepare;
/// Stage selection and sequential runner.
pub mod stages;
/// Input transports used by stages (filesystem and HTTP).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;

mod errors;

pub use combine::{CombineSummary, combine_data_dirs};
pub use config::{CombineSpec, LmTextConfig, RecipeConfig, RecipeKind, TrimConfig};
pub use corpus::{CorpusPart, PartSpec};
pub use download::{DownloadOutcome, download_and_extract};
pub use errors::PrepError;
pub use lm_text::{LmTextOutcome, fetch_lm_text, reformat_lines};
pub use manifest::{DataDir, Manifest, Utterance};
pub use pipeline::PipelineInvocation;
pub use prepare::{EnergyTrimmer, SilenceTrimmer};
pub use stages::{RunReport, Stage, StageRange, StageRunner};
pub use transport::{Fetcher, HttpFetcher};
pub use types::{DataDirName, ManifestName, PartName, SpeakerId, Transcript, UttId};
