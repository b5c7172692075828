use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::constants::{download, env, lm_text, trim};
use crate::corpus::{CorpusPart, PartSpec};
use crate::errors::PrepError;
use crate::types::{DataDirName, ManifestName};

/// Which corpus recipe a configuration was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeKind {
    /// LibriSpeech ASR recipe (`asr.sh`).
    LibriSpeech,
    /// LibriTTS TTS recipe (`tts.sh`).
    LibriTts,
}

impl RecipeKind {
    /// Environment variable consulted when no explicit corpus root is given.
    pub fn root_env_var(self) -> &'static str {
        match self {
            RecipeKind::LibriSpeech => env::LIBRISPEECH,
            RecipeKind::LibriTts => env::LIBRITTS,
        }
    }
}

/// Acoustic front-end settings forwarded to the downstream pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Sampling rate in Hz.
    pub fs: u32,
    /// FFT size, when the pipeline extracts spectrograms.
    pub n_fft: Option<u32>,
    /// Hop size in samples.
    pub n_shift: Option<u32>,
    /// Window length in samples; `None` renders as `null` (defaults to `n_fft`).
    pub win_length: Option<u32>,
}

/// Silence trimming parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TrimConfig {
    /// Frames quieter than the loudest frame by more than this many dB are silence.
    pub top_db: f32,
    /// Analysis window in sample frames.
    pub frame_length: usize,
    /// Hop between analysis windows in sample frames.
    pub hop_length: usize,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            top_db: trim::DEFAULT_TOP_DB,
            frame_length: trim::DEFAULT_FRAME_LENGTH,
            hop_length: trim::DEFAULT_HOP_LENGTH,
        }
    }
}

/// Describes one combined data directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombineSpec {
    /// Name of the combined data directory.
    pub target: DataDirName,
    /// Source data directory names, in merge order.
    pub sources: Vec<DataDirName>,
    /// Optional per-utterance manifests to merge besides the required ones.
    pub extra_files: Vec<ManifestName>,
}

/// External text corpus used for language-model training.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LmTextConfig {
    /// Remote gzip-compressed text file.
    pub url: String,
    /// Prefix for generated utterance ids.
    pub id_prefix: String,
}

/// Downstream task driven by the pipeline entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineTask {
    /// Speech recognition.
    Asr,
    /// Speech synthesis.
    Tts,
}

/// Hand-off settings for the downstream training pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Task kind (controls which front-end flags are rendered).
    pub task: PipelineTask,
    /// Entry point script, e.g. `./tts.sh`.
    pub entry: PathBuf,
    /// Front-end settings.
    pub features: FeatureConfig,
    /// Training data directory name.
    pub train_set: DataDirName,
    /// Validation data directory name.
    pub valid_set: DataDirName,
    /// Evaluation data directory names.
    pub test_sets: Vec<DataDirName>,
    /// Fixed recipe flags appended after the generated ones (`--key value`).
    pub extra_args: Vec<(String, String)>,
}

/// Immutable recipe configuration built once at process start.
#[derive(Clone, Debug)]
pub struct RecipeConfig {
    /// Recipe the configuration was built from.
    pub kind: RecipeKind,
    /// Root that receives archives, extracted corpora and the download marker.
    pub corpus_root: PathBuf,
    /// Directory inside the archives that holds the parts (e.g. `LibriTTS`).
    pub archive_subdir: String,
    /// Base URL that serves `<part>.tar.gz` archives.
    pub download_url: String,
    /// Delete archives after successful extraction.
    pub remove_archives: bool,
    /// Parts to download and prepare.
    pub parts: Vec<PartSpec>,
    /// Output root for data directories.
    pub data_dir: PathBuf,
    /// Scratch root for trimmed audio copies.
    pub work_dir: PathBuf,
    /// Silence trimming parameters.
    pub trim: TrimConfig,
    /// Combined data directories to build.
    pub combine: Vec<CombineSpec>,
    /// External text corpus, when the recipe uses one.
    pub lm_text: Option<LmTextConfig>,
    /// Downstream pipeline hand-off.
    pub pipeline: PipelineConfig,
}

impl RecipeConfig {
    /// LibriSpeech 100h ASR recipe rooted at `corpus_root`.
    pub fn librispeech(corpus_root: impl Into<PathBuf>) -> Result<Self, PrepError> {
        let parts = ["dev-clean", "test-clean", "dev-other", "test-other", "train-clean-100"]
            .into_iter()
            .map(|name| PartSpec::new(name, false))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind: RecipeKind::LibriSpeech,
            corpus_root: corpus_root.into(),
            archive_subdir: "LibriSpeech".to_string(),
            download_url: download::LIBRISPEECH_URL.to_string(),
            remove_archives: false,
            parts,
            data_dir: PathBuf::from("data"),
            work_dir: PathBuf::from("data/local"),
            trim: TrimConfig::default(),
            combine: vec![CombineSpec {
                target: "dev".to_string(),
                sources: vec!["dev_clean".to_string(), "dev_other".to_string()],
                extra_files: Vec::new(),
            }],
            lm_text: Some(LmTextConfig {
                url: lm_text::LIBRISPEECH_LM_URL.to_string(),
                id_prefix: lm_text::DEFAULT_ID_PREFIX.to_string(),
            }),
            pipeline: PipelineConfig {
                task: PipelineTask::Asr,
                entry: PathBuf::from("./asr.sh"),
                features: FeatureConfig {
                    fs: 16000,
                    n_fft: None,
                    n_shift: None,
                    win_length: None,
                },
                train_set: "train_clean_100".to_string(),
                valid_set: "dev".to_string(),
                test_sets: ["test_clean", "test_other", "dev_clean", "dev_other"]
                    .map(str::to_string)
                    .to_vec(),
                extra_args: [
                    ("lang", "en"),
                    ("ngpu", "1"),
                    ("nbpe", "5000"),
                    ("max_wav_duration", "30"),
                    ("speed_perturb_factors", "0.9 1.0 1.1"),
                    ("audio_format", "flac.ark"),
                    ("feats_type", "raw"),
                    ("use_lm", "false"),
                    ("lm_train_text", "data/train_clean_100/text"),
                    ("bpe_train_text", "data/train_clean_100/text"),
                ]
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .to_vec(),
            },
        })
    }

    /// LibriTTS 460h TTS recipe rooted at `corpus_root`.
    pub fn libritts(corpus_root: impl Into<PathBuf>) -> Result<Self, PrepError> {
        let parts = ["dev-clean", "test-clean", "train-clean-100", "train-clean-360"]
            .into_iter()
            .map(|name| PartSpec::new(name, true))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind: RecipeKind::LibriTts,
            corpus_root: corpus_root.into(),
            archive_subdir: "LibriTTS".to_string(),
            download_url: download::LIBRITTS_URL.to_string(),
            remove_archives: false,
            parts,
            data_dir: PathBuf::from("data"),
            work_dir: PathBuf::from("data/local"),
            trim: TrimConfig::default(),
            combine: vec![CombineSpec {
                target: "train_clean_460".to_string(),
                sources: vec!["train_clean_100".to_string(), "train_clean_360".to_string()],
                extra_files: vec![crate::constants::manifest::UTT2NUM_SAMPLES.to_string()],
            }],
            lm_text: None,
            pipeline: PipelineConfig {
                task: PipelineTask::Tts,
                entry: PathBuf::from("./tts.sh"),
                features: FeatureConfig {
                    fs: 24000,
                    n_fft: Some(1024),
                    n_shift: Some(256),
                    win_length: None,
                },
                train_set: "train_clean_460".to_string(),
                valid_set: "dev_clean".to_string(),
                test_sets: vec!["dev_clean".to_string(), "test_clean".to_string()],
                extra_args: [
                    ("lang", "en"),
                    ("feats_type", "raw"),
                    ("token_type", "phn"),
                    ("cleaner", "tacotron"),
                    ("g2p", "g2p_en_no_space"),
                    ("audio_format", "wav"),
                    ("srctexts", "data/train_clean_460/text"),
                ]
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .to_vec(),
            },
        })
    }

    /// Build a preset by kind.
    pub fn preset(kind: RecipeKind, corpus_root: impl Into<PathBuf>) -> Result<Self, PrepError> {
        match kind {
            RecipeKind::LibriSpeech => Self::librispeech(corpus_root),
            RecipeKind::LibriTts => Self::libritts(corpus_root),
        }
    }

    /// Override the data directory root.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Override the scratch root used for trimmed copies.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Override the archive base URL.
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = url.into();
        self
    }

    /// Override the external text corpus URL (no-op for recipes without one).
    pub fn with_lm_url(mut self, url: impl Into<String>) -> Self {
        if let Some(lm) = self.lm_text.as_mut() {
            lm.url = url.into();
        }
        self
    }

    /// Replace the part list.
    pub fn with_parts(mut self, parts: Vec<PartSpec>) -> Self {
        self.parts = parts;
        self
    }

    /// Replace the combine list.
    pub fn with_combine(mut self, combine: Vec<CombineSpec>) -> Self {
        self.combine = combine;
        self
    }

    /// Disable silence trimming for every part.
    pub fn without_trim(mut self) -> Self {
        for spec in &mut self.parts {
            spec.trim_all_silence = false;
        }
        self
    }

    /// Control archive removal after extraction.
    pub fn with_remove_archives(mut self, remove_archives: bool) -> Self {
        self.remove_archives = remove_archives;
        self
    }

    /// Override the pipeline entry point.
    pub fn with_pipeline_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.pipeline.entry = entry.into();
        self
    }

    /// Directory holding the extracted parts.
    pub fn corpus_dir(&self) -> PathBuf {
        self.corpus_root.join(&self.archive_subdir)
    }

    /// Extracted source directory of one part.
    pub fn part_source_dir(&self, part: &CorpusPart) -> PathBuf {
        self.corpus_dir().join(part.name())
    }

    /// Data directory path for a data directory name.
    pub fn data_dir_for(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Scratch directory for a part's trimmed copy.
    pub fn trim_dir_for(&self, part: &CorpusPart) -> PathBuf {
        self.work_dir.join(part.dir_name())
    }

    /// Cache directory for the external text corpus.
    pub fn lm_cache_dir(&self) -> PathBuf {
        self.data_dir.join(lm_text::CACHE_SUBDIR)
    }
}

/// Resolve the corpus root from an explicit value or the recipe's environment variable.
pub fn resolve_corpus_root(
    explicit: Option<&Path>,
    kind: RecipeKind,
) -> Result<PathBuf, PrepError> {
    resolve_corpus_root_with(explicit, kind, |var| std::env::var_os(var))
}

/// Same as [`resolve_corpus_root`] with an injectable environment lookup.
pub fn resolve_corpus_root_with<F>(
    explicit: Option<&Path>,
    kind: RecipeKind,
    lookup: F,
) -> Result<PathBuf, PrepError>
where
    F: FnOnce(&str) -> Option<OsString>,
{
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let var = kind.root_env_var();
    match lookup(var) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(PrepError::Configuration(format!(
            "corpus root is not set: pass --corpus-root or export {var}"
        ))),
    }
}
