//! Per-part preparation: optional silence trimming followed by normalization
//! into a data directory named after the part's underscore form.
//!
//! Outputs are overwritten on every run; there is no completion marker here.

/// Corpus layout discovery.
pub mod layout;
/// Silence trimming transforms.
pub mod trim;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::RecipeConfig;
use crate::constants::LOG_PREFIX;
use crate::constants::layout::{CHAPTER_TRANS_SUFFIX, NORMALIZED_TEXT_SUFFIX};
use crate::constants::manifest::UTT2NUM_SAMPLES;
use crate::corpus::PartSpec;
use crate::errors::PrepError;
use crate::manifest::{DataDir, Manifest, ManifestMap, Utterance};
use crate::transport::fs::{
    copy_matching_files, ensure_dir, has_extension, has_name_suffix, list_files,
};

pub use layout::discover_utterances;
pub use trim::{EnergyTrimmer, SilenceTrimmer};

/// Summary of one prepared part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedPart {
    /// Written data directory.
    pub data_dir: PathBuf,
    /// Number of utterances written.
    pub utterances: usize,
    /// Number of audio files trimmed (zero when trimming is disabled).
    pub trimmed_files: usize,
}

/// Prepare every part listed in `config`, in order.
pub fn prepare_parts(
    config: &RecipeConfig,
    trimmer: &dyn SilenceTrimmer,
) -> Result<Vec<PreparedPart>, PrepError> {
    config
        .parts
        .iter()
        .map(|spec| prepare_part(config, spec, trimmer))
        .collect()
}

/// Prepare one part.
pub fn prepare_part(
    config: &RecipeConfig,
    spec: &PartSpec,
    trimmer: &dyn SilenceTrimmer,
) -> Result<PreparedPart, PrepError> {
    let source = config.part_source_dir(&spec.part);
    let output = DataDir::new(config.data_dir_for(spec.part.dir_name()));

    let (normalize_from, trimmed_files) = if spec.trim_all_silence {
        let work = config.trim_dir_for(&spec.part);
        let trimmed = trim_part(spec.part.name(), &source, &work, trimmer)?;
        (work, trimmed)
    } else {
        (source, 0)
    };

    info!(
        part = %spec.part,
        from = %normalize_from.display(),
        "{LOG_PREFIX} writing data directory {}",
        output.path().display()
    );
    let utterances = normalize_part(spec.part.name(), &normalize_from, &output)?;
    Ok(PreparedPart {
        data_dir: output.path().to_path_buf(),
        utterances,
        trimmed_files,
    })
}

/// Trim every `.wav` under `source` into `work` (same relative paths) and copy
/// the transcripts next to them. Returns the number of trimmed files.
pub fn trim_part(
    part: &str,
    source: &Path,
    work: &Path,
    trimmer: &dyn SilenceTrimmer,
) -> Result<usize, PrepError> {
    if !source.is_dir() {
        return Err(PrepError::transform(
            part,
            format!("source directory {} does not exist", source.display()),
        ));
    }
    ensure_dir(work)?;
    let wavs = list_files(source, |path| has_extension(path, "wav"))?;
    info!(part, files = wavs.len(), "{LOG_PREFIX} trimming silence into {}", work.display());
    for wav in &wavs {
        let relative = wav
            .strip_prefix(source)
            .map_err(|err| PrepError::transform(part, err.to_string()))?;
        trimmer.trim_file(wav, &work.join(relative))?;
    }
    let copied = copy_matching_files(source, work, |path| {
        has_name_suffix(path, NORMALIZED_TEXT_SUFFIX) || has_name_suffix(path, CHAPTER_TRANS_SUFFIX)
    })?;
    debug!(part, copied, "{LOG_PREFIX} copied transcripts");
    Ok(wavs.len())
}

/// Write the data directory for the utterances found under `root`.
///
/// `utt2num_samples` is written as well when every audio file is a WAV file.
pub fn normalize_part(part: &str, root: &Path, output: &DataDir) -> Result<usize, PrepError> {
    let utterances = discover_utterances(part, root)?;
    output.write(&Manifest::from_utterances(&utterances))?;
    if let Some(num_samples) = wav_sample_counts(&utterances)? {
        output.write_map(UTT2NUM_SAMPLES, &num_samples)?;
    }
    Ok(utterances.len())
}

fn wav_sample_counts(utterances: &[Utterance]) -> Result<Option<ManifestMap>, PrepError> {
    if !utterances.iter().all(|utt| has_extension(&utt.audio, "wav")) {
        return Ok(None);
    }
    let mut counts = ManifestMap::new();
    for utt in utterances {
        counts.insert(utt.id.clone(), trim::wav_num_samples(&utt.audio)?.to_string());
    }
    Ok(Some(counts))
}
