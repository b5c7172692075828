use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum, error::ErrorKind};
use tracing::info;

use crate::config::{RecipeConfig, RecipeKind, resolve_corpus_root};
use crate::constants::LOG_PREFIX;
use crate::errors::PrepError;
use crate::pipeline::PipelineInvocation;
use crate::prepare::EnergyTrimmer;
use crate::stages::{RunReport, StageRange, StageRunner};
use crate::transport::HttpFetcher;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RecipeArg {
    Librispeech,
    Libritts,
}

impl From<RecipeArg> for RecipeKind {
    fn from(value: RecipeArg) -> Self {
        match value {
            RecipeArg::Librispeech => RecipeKind::LibriSpeech,
            RecipeArg::Libritts => RecipeKind::LibriTts,
        }
    }
}

/// Command line for `corpus-prep`.
///
/// Common usage:
/// - Full run: `corpus-prep --recipe libritts --corpus-root /corpora`
/// - Only the prepare stage: `--stage 2 --stop-stage 2`
/// - Prepare then hand off to `tts.sh`: `--stop-stage 3 --launch`
#[derive(Debug, Parser)]
#[command(
    name = "corpus-prep",
    version,
    disable_help_subcommand = true,
    about = "Staged corpus preparation for speech recipes",
    long_about = "Download, trim, normalize and combine speech corpora into data \
                  directories, then optionally launch the downstream training pipeline.",
    after_help = "Stages: 1 download, 2 prepare, 3 combine, 4 external text. The corpus \
                  root is resolved from --corpus-root, then the recipe's environment \
                  variable (LIBRISPEECH or LIBRITTS)."
)]
pub struct PrepCli {
    #[arg(
        long,
        default_value_t = 1,
        allow_negative_numbers = true,
        help = "First stage to run (inclusive)"
    )]
    stage: i32,
    #[arg(
        long = "stop-stage",
        alias = "stop_stage",
        default_value_t = 100,
        allow_negative_numbers = true,
        help = "Last stage to run (inclusive)"
    )]
    stop_stage: i32,
    #[arg(
        long,
        value_enum,
        default_value_t = RecipeArg::Librispeech,
        help = "Corpus recipe preset"
    )]
    recipe: RecipeArg,
    #[arg(
        long = "corpus-root",
        value_name = "PATH",
        help = "Directory that receives archives and extracted corpora"
    )]
    corpus_root: Option<PathBuf>,
    #[arg(long = "data-dir", value_name = "DIR", help = "Output root for data directories")]
    data_dir: Option<PathBuf>,
    #[arg(long = "work-dir", value_name = "DIR", help = "Scratch root for trimmed audio")]
    work_dir: Option<PathBuf>,
    #[arg(long = "download-url", value_name = "URL", help = "Base URL serving <part>.tar.gz")]
    download_url: Option<String>,
    #[arg(long = "lm-url", value_name = "URL", help = "External text corpus URL")]
    lm_url: Option<String>,
    #[arg(long = "no-trim", help = "Disable silence trimming for every part")]
    no_trim: bool,
    #[arg(long = "remove-archives", help = "Delete archives after extraction")]
    remove_archives: bool,
    #[arg(long, help = "Launch the downstream pipeline after the stages succeed")]
    launch: bool,
    #[arg(long = "pipeline-entry", value_name = "PATH", help = "Override the pipeline entry point")]
    pipeline_entry: Option<PathBuf>,
    #[arg(
        long = "pipeline-arg",
        value_name = "KEY=VALUE",
        help = "Extra or overriding pipeline flag, repeat as needed"
    )]
    pipeline_args: Vec<String>,
    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
    #[arg(hide = true)]
    unexpected: Vec<String>,
}

impl PrepCli {
    /// Parse arguments (including the program name).
    ///
    /// Returns `Ok(None)` after printing help or version output.
    pub fn parse_args<I>(args: I) -> Result<Option<Self>, PrepError>
    where
        I: IntoIterator,
        I::Item: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(Some(cli)),
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    err.print()?;
                    Ok(None)
                }
                _ => Err(PrepError::InvalidArguments(err.to_string())),
            },
        }
    }

    /// Number of `-v` flags given.
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Build the recipe configuration from the parsed flags.
    pub fn recipe_config(&self) -> Result<RecipeConfig, PrepError> {
        if !self.unexpected.is_empty() {
            return Err(PrepError::UnexpectedArguments(self.unexpected.clone()));
        }
        let kind = RecipeKind::from(self.recipe);
        let root = resolve_corpus_root(self.corpus_root.as_deref(), kind)?;
        let mut config =
            RecipeConfig::preset(kind, root)?.with_remove_archives(self.remove_archives);
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(dir) = &self.work_dir {
            config = config.with_work_dir(dir);
        }
        if let Some(url) = &self.download_url {
            config = config.with_download_url(url);
        }
        if let Some(url) = &self.lm_url {
            config = config.with_lm_url(url);
        }
        if let Some(entry) = &self.pipeline_entry {
            config = config.with_pipeline_entry(entry);
        }
        if self.no_trim {
            config = config.without_trim();
        }
        Ok(config)
    }

    /// Requested stage range.
    pub fn stage_range(&self) -> StageRange {
        StageRange::new(self.stage, self.stop_stage)
    }

    /// Run the stages and, when requested, the downstream pipeline.
    pub fn execute(&self) -> Result<RunReport, PrepError> {
        let config = self.recipe_config()?;
        let invocation = if self.launch {
            let invocation = PipelineInvocation::from_config(&config.pipeline)
                .with_overrides(&self.pipeline_args)?;
            Some(invocation)
        } else {
            None
        };

        info!(
            corpus_root = %config.corpus_root.display(),
            data_dir = %config.data_dir.display(),
            "{LOG_PREFIX} stages {} to {}",
            self.stage,
            self.stop_stage
        );
        let fetcher = HttpFetcher::new();
        let trimmer = EnergyTrimmer::new(config.trim.clone());
        let report = StageRunner::new(&config, &fetcher, &trimmer).run(self.stage_range())?;

        if let Some(invocation) = invocation {
            invocation.launch()?;
        }
        Ok(report)
    }
}
