//! Download-and-extract stage.
//!
//! Idempotence is tracked for the whole corpus: a single marker is written
//! once every part has been fetched and extracted, and its presence skips the
//! stage entirely.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RecipeConfig;
use crate::constants::LOG_PREFIX;
use crate::corpus::CorpusPart;
use crate::errors::PrepError;
use crate::transport::fs::{ensure_dir, marker_present, write_marker};
use crate::transport::http::{Fetcher, join_url};
use crate::types::PartName;

/// Result of running the download stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The marker was present; nothing was fetched.
    AlreadyComplete,
    /// Every listed part was fetched and extracted.
    Downloaded {
        /// Parts fetched and extracted, in order.
        parts: Vec<PartName>,
        /// Total archive bytes fetched.
        bytes: u64,
    },
}

/// Body of the download completion marker.
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadMarker {
    /// Parts that were extracted before the marker was written.
    pub parts: Vec<PartName>,
    /// Completion time.
    pub completed_at: DateTime<Utc>,
}

/// Run the download stage for the parts listed in `config`.
pub fn download_corpus(
    config: &RecipeConfig,
    fetcher: &dyn Fetcher,
) -> Result<DownloadOutcome, PrepError> {
    let parts: Vec<&CorpusPart> = config.parts.iter().map(|spec| &spec.part).collect();
    download_and_extract(
        &config.corpus_root,
        &config.download_url,
        &parts,
        config.remove_archives,
        fetcher,
    )
}

/// Fetch and extract `<base_url>/<part>.tar.gz` for every part into `root`,
/// unless `root` already carries the completion marker.
pub fn download_and_extract(
    root: &Path,
    base_url: &str,
    parts: &[&CorpusPart],
    remove_archives: bool,
    fetcher: &dyn Fetcher,
) -> Result<DownloadOutcome, PrepError> {
    let marker = root.join(crate::constants::markers::DOWNLOAD_COMPLETE);
    if marker_present(&marker) {
        info!(
            marker = %marker.display(),
            "{LOG_PREFIX} download already complete, skipping"
        );
        return Ok(DownloadOutcome::AlreadyComplete);
    }

    ensure_dir(root)?;
    let mut bytes = 0u64;
    for part in parts {
        let archive = root.join(part.archive_name());
        let url = join_url(base_url, &part.archive_name());
        info!(part = %part, "{LOG_PREFIX} fetching {url}");
        bytes = bytes.saturating_add(fetcher.fetch(&url, &archive)?);
        extract_tar_gz(&archive, root)?;
        if remove_archives {
            fs::remove_file(&archive)?;
        }
        info!(part = %part, "{LOG_PREFIX} extracted into {}", root.display());
    }

    let names: Vec<PartName> = parts.iter().map(|part| part.name().to_string()).collect();
    let body = DownloadMarker {
        parts: names.clone(),
        completed_at: Utc::now(),
    };
    let payload = serde_json::to_vec_pretty(&body)
        .map_err(|err| PrepError::Io(std::io::Error::other(err)))?;
    write_marker(&marker, &payload)?;
    info!(marker = %marker.display(), "{LOG_PREFIX} download complete");

    Ok(DownloadOutcome::Downloaded {
        parts: names,
        bytes,
    })
}

/// Extract a gzip-compressed tarball into `dest`.
///
/// Entries that would escape `dest` are rejected by `tar` itself.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<(), PrepError> {
    let extract_err = |reason: String| PrepError::Extract {
        archive: archive.to_path_buf(),
        reason,
    };
    let file = File::open(archive).map_err(|err| extract_err(err.to_string()))?;
    let mut tarball = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    tarball
        .unpack(dest)
        .map_err(|err| extract_err(err.to_string()))
}
