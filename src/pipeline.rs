use std::process::Command;

use tracing::info;

use crate::config::{PipelineConfig, PipelineTask};
use crate::constants::LOG_PREFIX;
use crate::errors::PrepError;

/// Command line for the downstream training pipeline entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineInvocation {
    entry: std::path::PathBuf,
    flags: Vec<(String, String)>,
}

impl PipelineInvocation {
    /// Render the recipe's fixed flags.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let features = &config.features;
        let mut flags = vec![("fs".to_string(), features.fs.to_string())];
        if config.task == PipelineTask::Tts {
            if let Some(n_fft) = features.n_fft {
                flags.push(("n_fft".to_string(), n_fft.to_string()));
            }
            if let Some(n_shift) = features.n_shift {
                flags.push(("n_shift".to_string(), n_shift.to_string()));
            }
            flags.push((
                "win_length".to_string(),
                features
                    .win_length
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "null".to_string()),
            ));
        }
        flags.push(("train_set".to_string(), config.train_set.clone()));
        flags.push(("valid_set".to_string(), config.valid_set.clone()));
        flags.push(("test_sets".to_string(), config.test_sets.join(" ")));

        let mut invocation = Self {
            entry: config.entry.clone(),
            flags,
        };
        for (key, value) in &config.extra_args {
            invocation.set(key, value);
        }
        invocation
    }

    /// Set a flag, replacing an existing value in place or appending it.
    pub fn set(&mut self, key: &str, value: &str) {
        let key = key.trim_start_matches('-');
        match self.flags.iter_mut().find(|(existing, _)| existing == key) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.flags.push((key.to_string(), value.to_string())),
        }
    }

    /// Apply `key=value` overrides.
    pub fn with_overrides(mut self, overrides: &[String]) -> Result<Self, PrepError> {
        for raw in overrides {
            let (key, value) = raw.split_once('=').ok_or_else(|| {
                PrepError::Configuration(format!(
                    "pipeline argument '{raw}' must look like key=value"
                ))
            })?;
            if key.trim_start_matches('-').is_empty() {
                return Err(PrepError::Configuration(format!(
                    "pipeline argument '{raw}' has an empty key"
                )));
            }
            self.set(key, value);
        }
        Ok(self)
    }

    /// Value of a flag, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.flags
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Arguments passed to the entry point (`--key value` pairs).
    pub fn args(&self) -> Vec<String> {
        self.flags
            .iter()
            .flat_map(|(key, value)| [format!("--{key}"), value.clone()])
            .collect()
    }

    /// Spawn the entry point and wait for it.
    pub fn launch(&self) -> Result<(), PrepError> {
        info!(
            entry = %self.entry.display(),
            "{LOG_PREFIX} launching downstream pipeline"
        );
        let status = Command::new(&self.entry).args(self.args()).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(PrepError::Pipeline {
                code: status.code().unwrap_or(1),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecipeConfig;

    #[test]
    fn tts_flags_include_front_end_settings() {
        let config = RecipeConfig::libritts("/corpora").unwrap();
        let invocation = PipelineInvocation::from_config(&config.pipeline);
        let args = invocation.args();
        assert_eq!(
            &args[..8],
            &[
                "--fs",
                "24000",
                "--n_fft",
                "1024",
                "--n_shift",
                "256",
                "--win_length",
                "null",
            ]
        );
        assert_eq!(invocation.get("test_sets"), Some("dev_clean test_clean"));
        assert_eq!(invocation.get("token_type"), Some("phn"));
    }

    #[test]
    fn asr_flags_skip_spectrogram_settings() {
        let config = RecipeConfig::librispeech("/corpora").unwrap();
        let invocation = PipelineInvocation::from_config(&config.pipeline);
        assert_eq!(invocation.get("fs"), Some("16000"));
        assert_eq!(invocation.get("n_fft"), None);
        assert_eq!(invocation.get("valid_set"), Some("dev"));
    }

    #[test]
    fn overrides_replace_in_place_and_append() {
        let config = RecipeConfig::libritts("/corpora").unwrap();
        let invocation = PipelineInvocation::from_config(&config.pipeline)
            .with_overrides(&["--fs=22050".to_string(), "stage=5".to_string()])
            .unwrap();
        let args = invocation.args();
        assert_eq!(&args[..2], &["--fs", "22050"]);
        assert_eq!(&args[args.len() - 2..], &["--stage", "5"]);
    }

    #[test]
    fn malformed_override_is_a_configuration_error() {
        let config = RecipeConfig::libritts("/corpora").unwrap();
        let err = PipelineInvocation::from_config(&config.pipeline)
            .with_overrides(&["no_equals".to_string()])
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
