mod common;

use std::fs;

use corpus_prep::manifest::parse_manifest;
use corpus_prep::{DataDir, PrepError, combine_data_dirs};
use tempfile::tempdir;

use common::write_data_dir;

#[test]
fn union_of_disjoint_sources() {
    let temp = tempdir().unwrap();
    let a = temp.path().join("dev_clean");
    let b = temp.path().join("dev_other");
    write_data_dir(&a, &[("1-1-0001", "1"), ("1-1-0002", "1")]);
    write_data_dir(&b, &[("2-1-0003", "2"), ("2-1-0004", "2")]);

    let target = DataDir::new(temp.path().join("dev"));
    let summary =
        combine_data_dirs(&target, &[DataDir::new(&a), DataDir::new(&b)], &[]).unwrap();
    assert_eq!(summary.target, "dev");
    assert_eq!(summary.utterances, 4);
    assert_eq!(summary.speakers, 2);

    let manifest = target.read().unwrap();
    let ids: Vec<&str> = manifest.utt2spk.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["1-1-0001", "1-1-0002", "2-1-0003", "2-1-0004"]);
    assert_eq!(manifest.text["2-1-0004"], "TEXT 2-1-0004");
    assert_eq!(
        fs::read_to_string(target.file("spk2utt")).unwrap(),
        "1 1-1-0001 1-1-0002\n2 2-1-0003 2-1-0004\n"
    );
}

#[test]
fn extra_files_are_merged() {
    let temp = tempdir().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    write_data_dir(&a, &[("1-1", "1")]);
    write_data_dir(&b, &[("2-1", "2")]);
    fs::write(a.join("utt2num_frames"), "1-1 120\n").unwrap();
    fs::write(b.join("utt2num_frames"), "2-1 340\n").unwrap();

    let target = DataDir::new(temp.path().join("ab"));
    combine_data_dirs(
        &target,
        &[DataDir::new(&a), DataDir::new(&b)],
        &["utt2num_frames".to_string()],
    )
    .unwrap();
    let body = fs::read_to_string(target.file("utt2num_frames")).unwrap();
    let frames = parse_manifest(&body).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames["2-1"], "340");
}

#[test]
fn missing_extra_file_fails_before_writing() {
    let temp = tempdir().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    write_data_dir(&a, &[("1-1", "1")]);
    write_data_dir(&b, &[("2-1", "2")]);
    fs::write(a.join("utt2num_frames"), "1-1 120\n").unwrap();

    let target = DataDir::new(temp.path().join("ab"));
    let err = combine_data_dirs(
        &target,
        &[DataDir::new(&a), DataDir::new(&b)],
        &["utt2num_frames".to_string()],
    )
    .unwrap_err();
    assert!(matches!(err, PrepError::Manifest { .. }));
    assert!(err.to_string().contains("utt2num_frames"));
    assert!(!target.path().exists());
}

#[test]
fn missing_required_manifest_fails() {
    let temp = tempdir().unwrap();
    let a = temp.path().join("a");
    write_data_dir(&a, &[("1-1", "1")]);
    fs::remove_file(a.join("utt2spk")).unwrap();

    let target = DataDir::new(temp.path().join("out"));
    let err = combine_data_dirs(&target, &[DataDir::new(&a)], &[]).unwrap_err();
    assert!(err.to_string().contains("utt2spk"));

    let absent = DataDir::new(temp.path().join("absent"));
    assert!(combine_data_dirs(&target, &[absent], &[]).is_err());
}

#[test]
fn duplicate_utterance_ids_are_rejected() {
    let temp = tempdir().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    write_data_dir(&a, &[("1-1", "1")]);
    write_data_dir(&b, &[("1-1", "1")]);

    let target = DataDir::new(temp.path().join("ab"));
    let err =
        combine_data_dirs(&target, &[DataDir::new(&a), DataDir::new(&b)], &[]).unwrap_err();
    assert!(err.to_string().contains("1-1"));
}

#[test]
fn sources_are_not_mutated() {
    let temp = tempdir().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    write_data_dir(&a, &[("1-1", "1")]);
    write_data_dir(&b, &[("2-1", "2")]);
    let before = fs::read_to_string(a.join("wav.scp")).unwrap();

    combine_data_dirs(
        &DataDir::new(temp.path().join("ab")),
        &[DataDir::new(&a), DataDir::new(&b)],
        &[],
    )
    .unwrap();
    assert_eq!(fs::read_to_string(a.join("wav.scp")).unwrap(), before);
    assert!(!a.join("spk2utt").exists());
}
