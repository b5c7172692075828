use std::fmt;
use std::str::FromStr;

use crate::errors::PrepError;
use crate::types::{DataDirName, PartName};

/// Named subset of a speech corpus (e.g. `train-clean-100`).
///
/// Carries both the canonical upstream name, used for archive URLs and source
/// directories, and the underscore form used for data directory names.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorpusPart {
    name: PartName,
    dir_name: DataDirName,
}

impl CorpusPart {
    /// Build a part from its canonical name.
    pub fn new(name: impl Into<PartName>) -> Result<Self, PrepError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PrepError::Configuration(
                "corpus part name must not be empty".to_string(),
            ));
        }
        if name
            .chars()
            .any(|ch| ch == '/' || ch == '\\' || ch.is_whitespace())
        {
            return Err(PrepError::Configuration(format!(
                "corpus part name '{name}' must not contain path separators or whitespace"
            )));
        }
        let dir_name = name.replace('-', "_");
        Ok(Self { name, dir_name })
    }

    /// Canonical name, e.g. `dev-clean`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filesystem-safe name, e.g. `dev_clean`.
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    /// Archive file name for this part, e.g. `dev-clean.tar.gz`.
    pub fn archive_name(&self) -> String {
        format!(
            "{}{}",
            self.name,
            crate::constants::download::ARCHIVE_SUFFIX
        )
    }
}

impl fmt::Display for CorpusPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for CorpusPart {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CorpusPart::new(s)
    }
}

/// A corpus part paired with its per-part preparation settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartSpec {
    /// The corpus part to prepare.
    pub part: CorpusPart,
    /// Trim all silence (leading, trailing and internal) before normalization.
    pub trim_all_silence: bool,
}

impl PartSpec {
    /// Build from a canonical part name.
    pub fn new(name: &str, trim_all_silence: bool) -> Result<Self, PrepError> {
        Ok(Self {
            part: CorpusPart::new(name)?,
            trim_all_silence,
        })
    }
}
