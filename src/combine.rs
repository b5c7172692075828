use std::path::Path;

use tracing::info;

use crate::config::{CombineSpec, RecipeConfig};
use crate::constants::LOG_PREFIX;
use crate::errors::PrepError;
use crate::manifest::{DataDir, Manifest, ManifestMap};

/// Summary of one combined data directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombineSummary {
    /// Combined directory name.
    pub target: String,
    /// Utterances in the combined directory.
    pub utterances: usize,
    /// Distinct speakers in the combined directory.
    pub speakers: usize,
}

/// Build every combined directory listed in `config`.
pub fn combine_all(config: &RecipeConfig) -> Result<Vec<CombineSummary>, PrepError> {
    config
        .combine
        .iter()
        .map(|spec| combine_spec(&config.data_dir, spec))
        .collect()
}

/// Build one combined directory under `data_root`.
pub fn combine_spec(data_root: &Path, spec: &CombineSpec) -> Result<CombineSummary, PrepError> {
    let sources: Vec<DataDir> = spec
        .sources
        .iter()
        .map(|name| DataDir::new(data_root.join(name)))
        .collect();
    let target = DataDir::new(data_root.join(&spec.target));
    combine_data_dirs(&target, &sources, &spec.extra_files)
}

/// Merge `sources` into `target`.
///
/// All sources are validated before anything is written. Utterance ids are
/// kept as-is and must be unique across sources.
pub fn combine_data_dirs(
    target: &DataDir,
    sources: &[DataDir],
    extra_files: &[String],
) -> Result<CombineSummary, PrepError> {
    if sources.is_empty() {
        return Err(PrepError::manifest(
            target.path(),
            "no source data directories to combine",
        ));
    }
    for source in sources {
        source.validate(extra_files)?;
    }

    let mut combined = Manifest::default();
    let mut extras: Vec<ManifestMap> = vec![ManifestMap::new(); extra_files.len()];
    for source in sources {
        let manifest = source.read()?;
        for (utt, spk) in &manifest.utt2spk {
            if combined.utt2spk.contains_key(utt) {
                return Err(PrepError::manifest(
                    source.path(),
                    format!("utterance '{utt}' already present in an earlier source"),
                ));
            }
            let wav = manifest.wav_scp.get(utt).ok_or_else(|| {
                PrepError::manifest(source.path(), format!("'{utt}' has no wav.scp entry"))
            })?;
            let text = manifest.text.get(utt).ok_or_else(|| {
                PrepError::manifest(source.path(), format!("'{utt}' has no text entry"))
            })?;
            combined.utt2spk.insert(utt.clone(), spk.clone());
            combined.wav_scp.insert(utt.clone(), wav.clone());
            combined.text.insert(utt.clone(), text.clone());
        }
        for (name, merged) in extra_files.iter().zip(extras.iter_mut()) {
            merged.extend(source.read_map(name)?);
        }
    }

    target.write(&combined)?;
    for (name, merged) in extra_files.iter().zip(&extras) {
        target.write_map(name, merged)?;
    }

    let summary = CombineSummary {
        target: target
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        utterances: combined.len(),
        speakers: combined.spk2utt().len(),
    };
    info!(
        utterances = summary.utterances,
        speakers = summary.speakers,
        "{LOG_PREFIX} combined {} sources into {}",
        sources.len(),
        target.path().display()
    );
    Ok(summary)
}
