/// Utterance identifier, unique within a data directory.
/// Examples: `84-121123-0000`, `84_121123_000007_000001`
pub type UttId = String;
/// Speaker identifier derived from the utterance id prefix.
/// Examples: `84`, `1272`
pub type SpeakerId = String;
/// Canonical corpus part name as published upstream.
/// Examples: `dev-clean`, `train-clean-100`
pub type PartName = String;
/// Filesystem-safe data directory name.
/// Examples: `dev_clean`, `train_clean_460`
pub type DataDirName = String;
/// Manifest file name inside a data directory.
/// Examples: `wav.scp`, `utt2spk`, `utt2num_samples`
pub type ManifestName = String;
/// Normalized transcript text.
/// Example: `CHAPTER ONE MISSUS RACHEL LYNDE IS SURPRISED`
pub type Transcript = String;
