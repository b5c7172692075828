use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::constants::LOG_PREFIX;
use crate::constants::download::{PROGRESS_INTERVAL_SECS, STREAM_BUFFER_BYTES};
use crate::errors::PrepError;
use crate::transport::fs::{ensure_dir, partial_path};

/// Fetches a remote resource into a local file.
///
/// Implementations must leave `target` absent unless the whole payload was
/// written.
pub trait Fetcher {
    /// Fetch `url` into `target`, returning the number of bytes written.
    fn fetch(&self, url: &str, target: &Path) -> Result<u64, PrepError>;
}

/// Blocking HTTP(S) fetcher backed by `ureq`.
///
/// `file://` URLs are served by copying from the local filesystem, which lets a
/// pre-mirrored corpus be used without network access.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    /// Create a fetcher.
    pub fn new() -> Self {
        Self
    }

    fn fetch_local(&self, url: &str, path: &str, target: &Path) -> Result<u64, PrepError> {
        let temp = partial_path(target);
        let bytes = fs::copy(path, &temp).map_err(|err| PrepError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        fs::rename(&temp, target)?;
        Ok(bytes)
    }

    fn fetch_remote(&self, url: &str, target: &Path) -> Result<u64, PrepError> {
        let fetch_err = |reason: String| PrepError::Fetch {
            url: url.to_string(),
            reason,
        };
        let response = ureq::get(url).call().map_err(|err| fetch_err(err.to_string()))?;
        let expected_bytes = response
            .headers()
            .get("content-length")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());

        let temp = partial_path(target);
        if temp.exists() {
            let _ = fs::remove_file(&temp);
        }
        let mut reader = response.into_body().into_reader();
        let mut file = File::create(&temp)?;

        info!("{LOG_PREFIX} downloading {url} -> {}", target.display());
        let started = Instant::now();
        let mut last_report = Instant::now();
        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; STREAM_BUFFER_BYTES];
        loop {
            let read = reader
                .read(&mut buffer)
                .map_err(|err| fetch_err(format!("failed reading response body: {err}")))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])?;
            total_bytes = total_bytes.saturating_add(read as u64);
            if last_report.elapsed() >= Duration::from_secs(PROGRESS_INTERVAL_SECS) {
                let elapsed = started.elapsed().as_secs_f64();
                if let Some(expected) = expected_bytes
                    && expected > 0
                {
                    let pct = ((total_bytes as f64 / expected as f64) * 100.0).clamp(0.0, 100.0);
                    info!(
                        "{LOG_PREFIX} {url}: {pct:.1}% \
                         ({total_bytes}/{expected} bytes, {elapsed:.0}s)"
                    );
                } else {
                    info!("{LOG_PREFIX} {url}: {total_bytes} bytes ({elapsed:.0}s)");
                }
                last_report = Instant::now();
            }
        }
        file.sync_all()?;
        drop(file);

        if let Some(expected) = expected_bytes
            && expected != total_bytes
        {
            let _ = fs::remove_file(&temp);
            return Err(fetch_err(format!(
                "truncated body: expected {expected} bytes, received {total_bytes}"
            )));
        }

        fs::rename(&temp, target)?;
        debug!(
            url,
            bytes = total_bytes,
            secs = started.elapsed().as_secs_f64(),
            "{LOG_PREFIX} download finished"
        );
        Ok(total_bytes)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, target: &Path) -> Result<u64, PrepError> {
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        match url.strip_prefix("file://") {
            Some(path) => self.fetch_local(url, path, target),
            None => self.fetch_remote(url, target),
        }
    }
}

/// Last path segment of a URL, ignoring any query or fragment.
pub fn url_file_name(url: &str) -> Option<&str> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
}

/// Join a base URL and a file name with exactly one separator.
pub fn join_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}
