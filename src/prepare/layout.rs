use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::layout::{AUDIO_EXTENSIONS, CHAPTER_TRANS_SUFFIX, NORMALIZED_TEXT_SUFFIX};
use crate::errors::PrepError;
use crate::manifest::Utterance;
use crate::transport::fs::{has_name_suffix, list_files};
use crate::types::{SpeakerId, UttId};
use crate::utils::normalize_inline_whitespace;

/// Discover every utterance under a corpus part directory.
///
/// Understands the LibriTTS layout (`<utt>.wav` next to `<utt>.normalized.txt`)
/// and the LibriSpeech layout (`<spk>-<chapter>.trans.txt` listing
/// `<utt> TEXT` with `<utt>.flac` beside it). Results are sorted by id.
pub fn discover_utterances(part: &str, root: &Path) -> Result<Vec<Utterance>, PrepError> {
    if !root.is_dir() {
        return Err(PrepError::transform(
            part,
            format!("source directory {} does not exist", root.display()),
        ));
    }
    let transcripts = list_files(root, |path| {
        has_name_suffix(path, NORMALIZED_TEXT_SUFFIX) || has_name_suffix(path, CHAPTER_TRANS_SUFFIX)
    })?;

    let mut found: BTreeMap<UttId, Utterance> = BTreeMap::new();
    for transcript in transcripts {
        let entries = if has_name_suffix(&transcript, NORMALIZED_TEXT_SUFFIX) {
            vec![read_normalized_text(part, &transcript)?]
        } else {
            read_chapter_transcript(part, &transcript)?
        };
        for utterance in entries {
            if found.contains_key(&utterance.id) {
                return Err(PrepError::transform(
                    part,
                    format!("utterance '{}' appears more than once", utterance.id),
                ));
            }
            found.insert(utterance.id.clone(), utterance);
        }
    }

    if found.is_empty() {
        return Err(PrepError::transform(
            part,
            format!("no utterances found under {}", root.display()),
        ));
    }
    Ok(found.into_values().collect())
}

/// Speaker id: the utterance id prefix before the first `-` or `_`.
pub fn speaker_of(utt_id: &str) -> SpeakerId {
    utt_id
        .split(['-', '_'])
        .next()
        .unwrap_or(utt_id)
        .to_string()
}

fn read_normalized_text(part: &str, path: &Path) -> Result<Utterance, PrepError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let id = name
        .strip_suffix(NORMALIZED_TEXT_SUFFIX)
        .unwrap_or(name)
        .to_string();
    let audio = path.with_file_name(format!("{id}.wav"));
    if !audio.is_file() {
        return Err(PrepError::transform(
            part,
            format!("missing audio {} for transcript", audio.display()),
        ));
    }
    let text = normalize_inline_whitespace(fs::read_to_string(path)?);
    Ok(Utterance {
        speaker: speaker_of(&id),
        id,
        audio,
        text,
    })
}

fn read_chapter_transcript(part: &str, path: &Path) -> Result<Vec<Utterance>, PrepError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let body = fs::read_to_string(path)?;
    let mut utterances = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (id, text) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let audio = locate_audio(dir, id).ok_or_else(|| {
            PrepError::transform(
                part,
                format!("missing audio for '{id}' listed in {}", path.display()),
            )
        })?;
        utterances.push(Utterance {
            id: id.to_string(),
            speaker: speaker_of(id),
            audio,
            text: normalize_inline_whitespace(text),
        });
    }
    Ok(utterances)
}

fn locate_audio(dir: &Path, id: &str) -> Option<PathBuf> {
    AUDIO_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{id}.{ext}")))
        .find(|candidate| candidate.is_file())
}
