#![allow(dead_code)]

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use corpus_prep::{Fetcher, PrepError};
use flate2::Compression;
use flate2::write::GzEncoder;
use hound::{SampleFormat, WavSpec, WavWriter};

/// Fetcher that serves files from a local mirror directory and records every URL.
pub struct MirrorFetcher {
    mirror: PathBuf,
    fail_on: Option<String>,
    pub calls: RefCell<Vec<String>>,
}

impl MirrorFetcher {
    pub fn new(mirror: impl Into<PathBuf>) -> Self {
        Self {
            mirror: mirror.into(),
            fail_on: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Fail any URL ending with `suffix`.
    pub fn failing_on(mut self, suffix: &str) -> Self {
        self.fail_on = Some(suffix.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Fetcher for MirrorFetcher {
    fn fetch(&self, url: &str, target: &Path) -> Result<u64, PrepError> {
        self.calls.borrow_mut().push(url.to_string());
        if let Some(suffix) = &self.fail_on
            && url.ends_with(suffix.as_str())
        {
            return Err(PrepError::Fetch {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        let name = url.rsplit('/').next().unwrap();
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(fs::copy(self.mirror.join(name), target)?)
    }
}

/// Write a `.tar.gz` archive holding `(path, bytes)` entries.
pub fn write_tar_gz(path: &Path, entries: &[(String, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::fast()));
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, data.as_slice()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Write a gzip-compressed text file.
pub fn write_gz_text(path: &Path, body: &str) {
    let file = File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::fast());
    encoder.write_all(body.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

/// 16-bit mono WAV bytes: `pad` silent samples, `voiced` loud samples, `pad` silent samples.
pub fn padded_tone_wav(pad: usize, voiced: usize) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..pad {
            writer.write_sample(0i16).unwrap();
        }
        for idx in 0..voiced {
            let value: i16 = if idx % 2 == 0 { 12000 } else { -12000 };
            writer.write_sample(value).unwrap();
        }
        for _ in 0..pad {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Archive entries for one LibriTTS-style part with one utterance per speaker.
pub fn libritts_part_entries(part: &str, speakers: &[&str]) -> Vec<(String, Vec<u8>)> {
    let mut entries = Vec::new();
    for speaker in speakers {
        let utt = format!("{speaker}_100_000001_000000");
        let dir = format!("LibriTTS/{part}/{speaker}/100");
        entries.push((format!("{dir}/{utt}.wav"), padded_tone_wav(4096, 4096)));
        entries.push((
            format!("{dir}/{utt}.normalized.txt"),
            format!("Speaker {speaker} reads aloud.").into_bytes(),
        ));
    }
    entries
}

/// Archive entries for one LibriSpeech-style part with a single chapter.
pub fn librispeech_part_entries(part: &str, speaker: &str) -> Vec<(String, Vec<u8>)> {
    let dir = format!("LibriSpeech/{part}/{speaker}/7");
    vec![
        (
            format!("{dir}/{speaker}-7.trans.txt"),
            format!("{speaker}-7-0000 HELLO WORLD\n{speaker}-7-0001 GOOD BYE\n").into_bytes(),
        ),
        (format!("{dir}/{speaker}-7-0000.flac"), b"fLaC".to_vec()),
        (format!("{dir}/{speaker}-7-0001.flac"), b"fLaC".to_vec()),
    ]
}

/// Write manifests for a data directory from `(utt, speaker)` pairs.
pub fn write_data_dir(dir: &Path, utts: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    let mut wav = String::new();
    let mut text = String::new();
    let mut utt2spk = String::new();
    for (utt, spk) in utts {
        wav.push_str(&format!("{utt} /audio/{utt}.wav\n"));
        text.push_str(&format!("{utt} TEXT {utt}\n"));
        utt2spk.push_str(&format!("{utt} {spk}\n"));
    }
    fs::write(dir.join("wav.scp"), wav).unwrap();
    fs::write(dir.join("text"), text).unwrap();
    fs::write(dir.join("utt2spk"), utt2spk).unwrap();
}
