use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::config::TrimConfig;
use crate::errors::PrepError;
use crate::transport::fs::{ensure_dir, partial_path};

/// Audio transform that removes silence from one file.
pub trait SilenceTrimmer {
    /// Read `src` and write the trimmed audio to `dst`.
    fn trim_file(&self, src: &Path, dst: &Path) -> Result<(), PrepError>;
}

/// Energy-based trimmer that drops every frame quieter than `top_db` below the
/// loudest frame, including internal pauses.
#[derive(Clone, Debug, Default)]
pub struct EnergyTrimmer {
    config: TrimConfig,
}

enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl EnergyTrimmer {
    /// Create a trimmer from trimming parameters.
    pub fn new(config: TrimConfig) -> Self {
        Self { config }
    }

    /// Non-silent `[start, end)` intervals in sample frames for a mono envelope.
    pub fn non_silent_intervals(&self, envelope: &[f32]) -> Vec<(usize, usize)> {
        let frame_length = self.config.frame_length.max(1);
        let hop = self.config.hop_length.max(1);
        let total = envelope.len();
        if total == 0 {
            return Vec::new();
        }

        let mut rms = Vec::with_capacity(total.div_ceil(hop));
        let mut start = 0;
        while start < total {
            let end = (start + frame_length).min(total);
            let window = &envelope[start..end];
            let power = window.iter().map(|v| v * v).sum::<f32>() / window.len() as f32;
            rms.push(power.sqrt());
            start += hop;
        }

        let peak = rms.iter().copied().fold(0.0_f32, f32::max);
        if peak <= 0.0 {
            return vec![(0, total)];
        }
        let threshold = peak * 10f32.powf(-self.config.top_db / 20.0);

        let mut intervals: Vec<(usize, usize)> = Vec::new();
        for (frame, value) in rms.iter().enumerate() {
            if *value < threshold {
                continue;
            }
            let begin = frame * hop;
            let end = (begin + frame_length).min(total);
            match intervals.last_mut() {
                Some(last) if begin <= last.1 => last.1 = last.1.max(end),
                _ => intervals.push((begin, end)),
            }
        }
        intervals
    }

    fn read(path: &Path) -> Result<(WavSpec, Samples), PrepError> {
        let mut reader = WavReader::open(path).map_err(|err| wav_err(path, err))?;
        let spec = reader.spec();
        let samples = match spec.sample_format {
            SampleFormat::Float => Samples::Float(
                reader
                    .samples::<f32>()
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|err| wav_err(path, err))?,
            ),
            SampleFormat::Int => Samples::Int(
                reader
                    .samples::<i32>()
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|err| wav_err(path, err))?,
            ),
        };
        Ok((spec, samples))
    }

    fn envelope(spec: &WavSpec, samples: &Samples) -> Vec<f32> {
        let channels = spec.channels.max(1) as usize;
        let normalized: Vec<f32> = match samples {
            Samples::Float(values) => values.clone(),
            Samples::Int(values) => {
                let scale = (1_i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                values.iter().map(|v| *v as f32 / scale).collect()
            }
        };
        normalized
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    }
}

impl SilenceTrimmer for EnergyTrimmer {
    fn trim_file(&self, src: &Path, dst: &Path) -> Result<(), PrepError> {
        let (spec, samples) = Self::read(src)?;
        let channels = spec.channels.max(1) as usize;
        let intervals = self.non_silent_intervals(&Self::envelope(&spec, &samples));

        if let Some(parent) = dst.parent() {
            ensure_dir(parent)?;
        }
        let temp = partial_path(dst);
        let mut writer = WavWriter::create(&temp, spec).map_err(|err| wav_err(dst, err))?;
        for (start, end) in intervals {
            let range = start * channels..end * channels;
            match &samples {
                Samples::Int(values) => {
                    for value in &values[range] {
                        writer.write_sample(*value).map_err(|err| wav_err(dst, err))?;
                    }
                }
                Samples::Float(values) => {
                    for value in &values[range] {
                        writer.write_sample(*value).map_err(|err| wav_err(dst, err))?;
                    }
                }
            }
        }
        writer.finalize().map_err(|err| wav_err(dst, err))?;
        fs::rename(&temp, dst)?;
        Ok(())
    }
}

fn wav_err(path: &Path, err: hound::Error) -> PrepError {
    PrepError::Audio {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Sample-frame count from a WAV header.
pub fn wav_num_samples(path: &Path) -> Result<u32, PrepError> {
    let reader = WavReader::open(path).map_err(|err| wav_err(path, err))?;
    Ok(reader.duration())
}
