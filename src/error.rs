//! Error types for dictionary and emission-model loading.
//!
//! Segmentation itself never fails (see `segmenter` module docs); errors can
//! only arise while loading the lexicon, frequency table or HMM emission
//! matrix from external resources.

use std::fmt;
use std::path::PathBuf;

/// Failure while loading the main dictionary, a user dictionary, or
/// inserting a word into the trie.
#[derive(Debug)]
pub enum DictError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The main dictionary file is missing or unreadable. Per spec this is
    /// catastrophic: the caller should refuse to segment rather than run
    /// against an empty lexicon.
    MissingMainDictionary { path: PathBuf },
    /// A word contained `U+0000`, which collides with the trie's root
    /// sentinel character and is rejected at insertion time.
    NullCharacter { word: String },
}

impl fmt::Display for DictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictError::Io { path, source } => {
                write!(f, "i/o error reading dictionary {}: {}", path.display(), source)
            }
            DictError::MissingMainDictionary { path } => {
                write!(f, "main dictionary not found: {}", path.display())
            }
            DictError::NullCharacter { word } => {
                write!(f, "word {:?} contains a null character", word)
            }
        }
    }
}

impl std::error::Error for DictError {}

/// Failure while loading `prob_emit.txt`. Unlike `DictError`, a missing
/// emission file is not catastrophic: it only disables the HMM fallback
/// (see `hmm` module).
#[derive(Debug)]
pub enum EmitLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for EmitLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitLoadError::Io { path, source } => {
                write!(f, "i/o error reading emission file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for EmitLoadError {}

/// Summary of a dictionary load pass, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub accepted: usize,
    pub skipped: usize,
}

impl LoadStats {
    pub fn merge(&mut self, other: LoadStats) {
        self.accepted += other.accepted;
        self.skipped += other.skipped;
    }
}
