use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::constants::markers::PARTIAL_EXTENSION;

/// Sibling path used while a file is being written (`<name>.part`).
pub fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(PARTIAL_EXTENSION);
    target.with_file_name(name)
}

/// Create `dir` and all missing parents.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Write a file through `<target>.part` and rename it into place.
///
/// The target either does not exist or holds the complete output; a failure in
/// `write` leaves at most a stale `.part` file that the next attempt replaces.
pub fn write_atomic<F>(target: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }
    let temp = partial_path(target);
    let file = File::create(&temp)?;
    let mut writer = BufWriter::new(file);
    if let Err(err) = write(&mut writer).and_then(|_| writer.flush()) {
        drop(writer);
        let _ = fs::remove_file(&temp);
        return Err(err);
    }
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    drop(file);
    fs::rename(&temp, target)
}

/// Write a completion marker atomically.
pub fn write_marker(marker: &Path, contents: &[u8]) -> io::Result<()> {
    write_atomic(marker, |writer| writer.write_all(contents))
}

/// True when a completion marker is present.
pub fn marker_present(marker: &Path) -> bool {
    marker.is_file()
}

/// Copy every file under `src` accepted by `keep` into `dst`, preserving
/// relative paths. Returns the number of copied files.
pub fn copy_matching_files<F>(src: &Path, dst: &Path, mut keep: F) -> io::Result<usize>
where
    F: FnMut(&Path) -> bool,
{
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() || !keep(entry.path()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }
    Ok(copied)
}

/// Files under `root` accepted by `keep`, sorted for deterministic processing.
pub fn list_files<F>(root: &Path, mut keep: F) -> io::Result<Vec<PathBuf>>
where
    F: FnMut(&Path) -> bool,
{
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_file() && keep(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// True if the path has the given extension (case-insensitive).
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|value| value.to_str())
        .map(|value| value.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// True if the file name ends with `suffix`.
pub fn has_name_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(suffix))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_path_appends_extension() {
        assert_eq!(
            partial_path(Path::new("/root/.download_complete")),
            PathBuf::from("/root/.download_complete.part")
        );
        assert_eq!(
            partial_path(Path::new("cache/text")),
            PathBuf::from("cache/text.part")
        );
    }

    #[test]
    fn write_atomic_leaves_no_target_on_failure() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("nested").join("marker");
        let result = write_atomic(&target, |writer| {
            writer.write_all(b"half")?;
            Err(io::Error::other("boom"))
        });
        assert!(result.is_err());
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());

        write_marker(&target, b"done").unwrap();
        assert!(marker_present(&target));
        assert_eq!(fs::read(&target).unwrap(), b"done");
        assert!(!partial_path(&target).exists());
    }

    #[test]
    fn copy_matching_files_preserves_structure() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join("84/121123")).unwrap();
        fs::write(src.join("84/121123/a.normalized.txt"), "A").unwrap();
        fs::write(src.join("84/121123/a.wav"), "RIFF").unwrap();

        let copied =
            copy_matching_files(&src, &dst, |path| has_name_suffix(path, ".normalized.txt"))
                .unwrap();
        assert_eq!(copied, 1);
        assert!(dst.join("84/121123/a.normalized.txt").is_file());
        assert!(!dst.join("84/121123/a.wav").exists());
    }

    #[test]
    fn extension_checks_ignore_case() {
        assert!(has_extension(Path::new("x/a.WAV"), "wav"));
        assert!(!has_extension(Path::new("x/a.flac"), "wav"));
        assert!(!has_extension(Path::new("x/noext"), "wav"));
    }
}
