//! External text corpus stage.
//!
//! Two checkpoints are evaluated independently: the compressed download and
//! the reformatted `text` file. A cached download with a missing `text` only
//! redoes the reformat.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::info;

use crate::config::{LmTextConfig, RecipeConfig};
use crate::constants::LOG_PREFIX;
use crate::constants::lm_text::{ID_WIDTH, OUTPUT_FILE};
use crate::errors::PrepError;
use crate::transport::fs::{ensure_dir, write_atomic};
use crate::transport::http::{Fetcher, url_file_name};

/// What the stage did at each checkpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LmTextOutcome {
    /// Compressed corpus location.
    pub archive: PathBuf,
    /// Reformatted output location.
    pub output: PathBuf,
    /// True when the compressed corpus was fetched during this call.
    pub downloaded: bool,
    /// Lines written, or `None` when the output already existed.
    pub reformatted_lines: Option<usize>,
}

/// Run the stage for the recipe's external text corpus, if it has one.
pub fn fetch_recipe_lm_text(
    config: &RecipeConfig,
    fetcher: &dyn Fetcher,
) -> Result<Option<LmTextOutcome>, PrepError> {
    match &config.lm_text {
        Some(lm) => fetch_lm_text(lm, &config.lm_cache_dir(), fetcher).map(Some),
        None => {
            info!("{LOG_PREFIX} recipe has no external text corpus, nothing to fetch");
            Ok(None)
        }
    }
}

/// Download (unless cached) and reformat (unless present) the text corpus.
pub fn fetch_lm_text(
    lm: &LmTextConfig,
    cache_dir: &Path,
    fetcher: &dyn Fetcher,
) -> Result<LmTextOutcome, PrepError> {
    let file_name = url_file_name(&lm.url).ok_or_else(|| {
        PrepError::Configuration(format!("cannot derive a file name from URL '{}'", lm.url))
    })?;
    ensure_dir(cache_dir)?;
    let archive = cache_dir.join(file_name);
    let output = cache_dir.join(OUTPUT_FILE);

    let downloaded = if archive.is_file() {
        info!(archive = %archive.display(), "{LOG_PREFIX} text corpus already cached");
        false
    } else {
        fetcher.fetch(&lm.url, &archive)?;
        true
    };

    let reformatted_lines = if output.is_file() {
        info!(output = %output.display(), "{LOG_PREFIX} reformatted text already present");
        None
    } else {
        let file = File::open(&archive)?;
        let reader = BufReader::new(MultiGzDecoder::new(BufReader::new(file)));
        let mut count = 0;
        write_atomic(&output, |writer| {
            count = reformat_lines(reader, writer, &lm.id_prefix)?;
            Ok(())
        })?;
        info!(lines = count, "{LOG_PREFIX} wrote {}", output.display());
        Some(count)
    };

    Ok(LmTextOutcome {
        archive,
        output,
        downloaded,
        reformatted_lines,
    })
}

/// Prefix every input line with `{prefix}_{n:08}` where `n` counts from 1.
///
/// Lines are copied as raw bytes: only the trailing `\n` is replaced, so
/// non-UTF-8 text and `\r` survive unchanged. A final line without a newline
/// still gets one. Returns the number of lines written, which always equals
/// the number of input lines.
pub fn reformat_lines<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    prefix: &str,
) -> std::io::Result<usize> {
    let mut count = 0usize;
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        count += 1;
        writer.write_all(line_prefix(prefix, count).as_bytes())?;
        writer.write_all(&line)?;
        writer.write_all(b"\n")?;
    }
    Ok(count)
}

fn line_prefix(prefix: &str, n: usize) -> String {
    format!("{prefix}_{n:0width$} ", width = ID_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reformat_numbers_lines_from_one() {
        let input = "A BANK CHECK\nTHE END\n";
        let mut out = Vec::new();
        let count = reformat_lines(input.as_bytes(), &mut out, "librispeech_lng").unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "librispeech_lng_00000001 A BANK CHECK\nlibrispeech_lng_00000002 THE END\n"
        );
    }

    #[test]
    fn reformat_keeps_empty_lines_and_counts() {
        let input = "ONE\n\nTHREE";
        let mut out = Vec::new();
        let count = reformat_lines(input.as_bytes(), &mut out, "x").unwrap();
        assert_eq!(count, 3);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["x_00000001 ONE", "x_00000002 ", "x_00000003 THREE"]);
    }

    #[test]
    fn ids_widen_past_eight_digits() {
        assert_eq!(line_prefix("p", 123_456_789), "p_123456789 ");
    }

    #[test]
    fn reformat_passes_raw_bytes_through() {
        let input: &[u8] = b"GOOD LINE\nCAF\xC9 LINE\r\nTHIRD";
        let mut out = Vec::new();
        let count = reformat_lines(input, &mut out, "lm").unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            out,
            b"lm_00000001 GOOD LINE\nlm_00000002 CAF\xC9 LINE\r\nlm_00000003 THIRD\n".to_vec()
        );
    }
}
