//! Kaldi-style data directory manifests.
//!
//! Every manifest is a text file of `"<key> <value>"` lines sorted by key.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::manifest::{REQUIRED, SPK2UTT, TEXT, UTT2SPK, WAV_SCP};
use crate::errors::PrepError;
use crate::transport::fs::{ensure_dir, write_atomic};
use crate::types::{SpeakerId, Transcript, UttId};

/// One `key -> value` manifest keyed by utterance (or speaker) id.
pub type ManifestMap = BTreeMap<UttId, String>;

/// A single utterance discovered in a corpus part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utterance {
    /// Utterance id.
    pub id: UttId,
    /// Speaker id.
    pub speaker: SpeakerId,
    /// Audio file path.
    pub audio: PathBuf,
    /// Normalized transcript.
    pub text: Transcript,
}

/// Required manifests of one data directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    /// `wav.scp`
    pub wav_scp: ManifestMap,
    /// `text`
    pub text: ManifestMap,
    /// `utt2spk`
    pub utt2spk: ManifestMap,
}

impl Manifest {
    /// Build manifests from discovered utterances.
    pub fn from_utterances(utterances: &[Utterance]) -> Self {
        let mut manifest = Manifest::default();
        for utt in utterances {
            manifest
                .wav_scp
                .insert(utt.id.clone(), utt.audio.to_string_lossy().into_owned());
            manifest.text.insert(utt.id.clone(), utt.text.clone());
            manifest.utt2spk.insert(utt.id.clone(), utt.speaker.clone());
        }
        manifest
    }

    /// Number of utterances.
    pub fn len(&self) -> usize {
        self.utt2spk.len()
    }

    /// True when there are no utterances.
    pub fn is_empty(&self) -> bool {
        self.utt2spk.is_empty()
    }

    /// Speaker to sorted utterance ids, derived from `utt2spk`.
    pub fn spk2utt(&self) -> BTreeMap<SpeakerId, Vec<UttId>> {
        let mut spk2utt: BTreeMap<SpeakerId, Vec<UttId>> = BTreeMap::new();
        for (utt, spk) in &self.utt2spk {
            spk2utt.entry(spk.clone()).or_default().push(utt.clone());
        }
        spk2utt
    }
}

/// Handle to a data directory on disk.
#[derive(Clone, Debug)]
pub struct DataDir {
    path: PathBuf,
}

impl DataDir {
    /// Refer to a data directory (it need not exist yet).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a manifest file inside this directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Fail unless every required manifest and every name in `extra` exists.
    pub fn validate(&self, extra: &[String]) -> Result<(), PrepError> {
        if !self.path.is_dir() {
            return Err(PrepError::manifest(&self.path, "directory does not exist"));
        }
        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .chain(extra.iter().map(String::as_str))
            .filter(|name| !self.file(name).is_file())
            .collect();
        if !missing.is_empty() {
            return Err(PrepError::manifest(
                &self.path,
                format!("missing manifest files: {}", missing.join(", ")),
            ));
        }
        Ok(())
    }

    /// Read one manifest file.
    pub fn read_map(&self, name: &str) -> Result<ManifestMap, PrepError> {
        let path = self.file(name);
        let body = fs::read_to_string(&path).map_err(|err| {
            PrepError::manifest(&self.path, format!("failed reading {name}: {err}"))
        })?;
        parse_manifest(&body).map_err(|details| {
            PrepError::manifest(&self.path, format!("{name}: {details}"))
        })
    }

    /// Read the required manifests.
    pub fn read(&self) -> Result<Manifest, PrepError> {
        self.validate(&[])?;
        Ok(Manifest {
            wav_scp: self.read_map(WAV_SCP)?,
            text: self.read_map(TEXT)?,
            utt2spk: self.read_map(UTT2SPK)?,
        })
    }

    /// Write one manifest file atomically.
    pub fn write_map(&self, name: &str, map: &ManifestMap) -> Result<(), PrepError> {
        write_atomic(&self.file(name), |writer| {
            for (key, value) in map {
                writeln!(writer, "{key} {value}")?;
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Write the required manifests plus the derived `spk2utt`.
    pub fn write(&self, manifest: &Manifest) -> Result<(), PrepError> {
        ensure_dir(&self.path)?;
        self.write_map(WAV_SCP, &manifest.wav_scp)?;
        self.write_map(TEXT, &manifest.text)?;
        self.write_map(UTT2SPK, &manifest.utt2spk)?;
        let spk2utt: ManifestMap = manifest
            .spk2utt()
            .into_iter()
            .map(|(spk, utts)| (spk, utts.join(" ")))
            .collect();
        self.write_map(SPK2UTT, &spk2utt)
    }
}

/// Parse `"<key> <value>"` lines. Blank lines are ignored; a value may be empty.
pub fn parse_manifest(body: &str) -> Result<ManifestMap, String> {
    let mut map = ManifestMap::new();
    for (idx, line) in body.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = match line.split_once(' ') {
            Some((key, value)) => (key, value.trim_start()),
            None => (line, ""),
        };
        if map.insert(key.to_string(), value.to_string()).is_some() {
            return Err(format!("duplicate key '{key}' on line {}", idx + 1));
        }
    }
    Ok(map)
}
