/// Constants used by completion markers and atomic writes.
pub mod markers {
    /// Whole-corpus marker written after every part is downloaded and extracted.
    pub const DOWNLOAD_COMPLETE: &str = ".download_complete";
    /// Extension used for in-flight files that are renamed into place on success.
    pub const PARTIAL_EXTENSION: &str = "part";
}

/// Constants used by data directory manifests.
pub mod manifest {
    /// Utterance id to audio path.
    pub const WAV_SCP: &str = "wav.scp";
    /// Utterance id to transcript.
    pub const TEXT: &str = "text";
    /// Utterance id to speaker id.
    pub const UTT2SPK: &str = "utt2spk";
    /// Speaker id to space-separated utterance ids (derived from `utt2spk`).
    pub const SPK2UTT: &str = "spk2utt";
    /// Utterance id to sample-frame count (written for WAV-only parts).
    pub const UTT2NUM_SAMPLES: &str = "utt2num_samples";
    /// Manifests every data directory must carry.
    pub const REQUIRED: [&str; 3] = [WAV_SCP, TEXT, UTT2SPK];
}

/// Constants used by corpus layout discovery.
pub mod layout {
    /// Per-utterance transcript suffix used by LibriTTS.
    pub const NORMALIZED_TEXT_SUFFIX: &str = ".normalized.txt";
    /// Per-chapter transcript suffix used by LibriSpeech.
    pub const CHAPTER_TRANS_SUFFIX: &str = ".trans.txt";
    /// Audio extensions probed for LibriSpeech chapter transcripts, in order.
    pub const AUDIO_EXTENSIONS: [&str; 2] = ["flac", "wav"];
}

/// Constants used by the download stage.
pub mod download {
    /// Archive suffix appended to each part name.
    pub const ARCHIVE_SUFFIX: &str = ".tar.gz";
    /// Buffer size for streaming response bodies to disk.
    pub const STREAM_BUFFER_BYTES: usize = 1024 * 1024;
    /// Minimum interval between progress log lines, in seconds.
    pub const PROGRESS_INTERVAL_SECS: u64 = 5;
    /// LibriSpeech resource root on OpenSLR.
    pub const LIBRISPEECH_URL: &str = "https://www.openslr.org/resources/12";
    /// LibriTTS resource root on OpenSLR.
    pub const LIBRITTS_URL: &str = "https://www.openslr.org/resources/60";
}

/// Constants used by the external text corpus stage.
pub mod lm_text {
    /// Default external text corpus (gzip-compressed, one sentence per line).
    pub const LIBRISPEECH_LM_URL: &str =
        "https://www.openslr.org/resources/11/librispeech-lm-norm.txt.gz";
    /// Default utterance id prefix for reformatted lines.
    pub const DEFAULT_ID_PREFIX: &str = "librispeech_lng";
    /// Zero-padded width of the sequential line number.
    pub const ID_WIDTH: usize = 8;
    /// Reformatted output file name inside the cache directory.
    pub const OUTPUT_FILE: &str = "text";
    /// Cache directory relative to the data directory.
    pub const CACHE_SUBDIR: &str = "local/other_text";
}

/// Constants used by silence trimming.
pub mod trim {
    /// Threshold below the loudest frame (in dB) considered silence.
    pub const DEFAULT_TOP_DB: f32 = 30.0;
    /// Analysis frame length in sample frames.
    pub const DEFAULT_FRAME_LENGTH: usize = 2048;
    /// Hop between analysis frames in sample frames.
    pub const DEFAULT_HOP_LENGTH: usize = 512;
}

/// Environment variables that name corpus roots.
pub mod env {
    /// Root directory for LibriSpeech downloads.
    pub const LIBRISPEECH: &str = "LIBRISPEECH";
    /// Root directory for LibriTTS downloads.
    pub const LIBRITTS: &str = "LIBRITTS";
}

/// Log message prefix shared by stage logging.
pub const LOG_PREFIX: &str = "[corpus-prep]";
