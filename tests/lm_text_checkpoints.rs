mod common;

use std::fs;

use corpus_prep::{LmTextConfig, fetch_lm_text};
use tempfile::tempdir;

use common::{MirrorFetcher, write_gz_text};

fn lm_config() -> LmTextConfig {
    LmTextConfig {
        url: "mirror://openslr/11/librispeech-lm-norm.txt.gz".to_string(),
        id_prefix: "librispeech_lng".to_string(),
    }
}

#[test]
fn fresh_cache_downloads_and_reformats() {
    let temp = tempdir().unwrap();
    let mirror = temp.path().join("mirror");
    fs::create_dir_all(&mirror).unwrap();
    write_gz_text(
        &mirror.join("librispeech-lm-norm.txt.gz"),
        "A BANK CHECK\nTHE SECOND LINE\nTHIRD\n",
    );
    let cache = temp.path().join("data/local/other_text");
    let fetcher = MirrorFetcher::new(&mirror);

    let outcome = fetch_lm_text(&lm_config(), &cache, &fetcher).unwrap();
    assert!(outcome.downloaded);
    assert_eq!(outcome.reformatted_lines, Some(3));
    assert_eq!(fetcher.call_count(), 1);

    let text = fs::read_to_string(cache.join("text")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "librispeech_lng_00000001 A BANK CHECK",
            "librispeech_lng_00000002 THE SECOND LINE",
            "librispeech_lng_00000003 THIRD",
        ]
    );

    let again = fetch_lm_text(&lm_config(), &cache, &fetcher).unwrap();
    assert!(!again.downloaded);
    assert_eq!(again.reformatted_lines, None);
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn cached_archive_only_redoes_reformat() {
    let temp = tempdir().unwrap();
    let cache = temp.path().join("other_text");
    fs::create_dir_all(&cache).unwrap();
    write_gz_text(&cache.join("librispeech-lm-norm.txt.gz"), "ONLY LINE\n");
    let fetcher = MirrorFetcher::new(temp.path().join("empty-mirror"));

    let outcome = fetch_lm_text(&lm_config(), &cache, &fetcher).unwrap();
    assert!(!outcome.downloaded);
    assert_eq!(outcome.reformatted_lines, Some(1));
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(
        fs::read_to_string(cache.join("text")).unwrap(),
        "librispeech_lng_00000001 ONLY LINE\n"
    );
}

#[test]
fn existing_output_skips_reformat_but_missing_archive_is_fetched() {
    let temp = tempdir().unwrap();
    let mirror = temp.path().join("mirror");
    fs::create_dir_all(&mirror).unwrap();
    write_gz_text(&mirror.join("librispeech-lm-norm.txt.gz"), "NEW\n");
    let cache = temp.path().join("other_text");
    fs::create_dir_all(&cache).unwrap();
    fs::write(cache.join("text"), "kept 1\n").unwrap();
    let fetcher = MirrorFetcher::new(&mirror);

    let outcome = fetch_lm_text(&lm_config(), &cache, &fetcher).unwrap();
    assert!(outcome.downloaded);
    assert_eq!(outcome.reformatted_lines, None);
    assert_eq!(fs::read_to_string(cache.join("text")).unwrap(), "kept 1\n");
}

#[test]
fn failed_download_leaves_no_checkpoints() {
    let temp = tempdir().unwrap();
    let cache = temp.path().join("other_text");
    let fetcher = MirrorFetcher::new(temp.path()).failing_on(".txt.gz");

    let err = fetch_lm_text(&lm_config(), &cache, &fetcher).unwrap_err();
    assert!(matches!(err, corpus_prep::PrepError::Fetch { .. }));
    assert!(!cache.join("librispeech-lm-norm.txt.gz").exists());
    assert!(!cache.join("text").exists());
}
