//! Frequency table (component C3) and the main/user dictionary loaders
//! that populate it and the [`Trie`](crate::trie::Trie) alongside it.

use crate::error::{DictError, LoadStats};
use crate::trie::Trie;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::Path;

/// Maps a normalized word (lower-cased, trimmed — the same string inserted
/// into the trie) to its log-probability.
pub struct FreqTable {
    log_p: AHashMap<String, f64>,
    min_log: f64,
    total: f64,
}

impl Default for FreqTable {
    fn default() -> Self {
        Self {
            log_p: AHashMap::new(),
            min_log: f64::MIN_POSITIVE.ln(),
            total: 0.0,
        }
    }
}

impl FreqTable {
    pub fn contains(&self, word: &str) -> bool {
        self.log_p.contains_key(word)
    }

    /// Log-probability of `word`, or [`Self::min_log`] if unknown.
    pub fn log_p(&self, word: &str) -> f64 {
        *self.log_p.get(word).unwrap_or(&self.min_log)
    }

    /// Floor log-probability assigned to any word absent from the table.
    pub fn min_log(&self) -> f64 {
        self.min_log
    }

    /// Sum of all raw frequencies seen during the main-dictionary load.
    /// User-dictionary entries are normalized against this same total
    /// without changing it (§6).
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.log_p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_p.is_empty()
    }

    fn recompute_min_log(&mut self) {
        if let Some(m) = self.log_p.values().cloned().fold(None, |acc, v| match acc {
            None => Some(v),
            Some(a) => Some(a.min(v)),
        }) {
            self.min_log = m;
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.log_p.iter().map(|(w, p)| (w.as_str(), *p))
    }
}

/// On-disk representation of a prebuilt lexicon, for callers who want to
/// skip re-parsing and re-scoring a large text dictionary on every process
/// start. Stores already-computed log-probabilities, not raw frequencies.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    total: f64,
    entries: Vec<(String, f64)>,
}

/// Serialize `trie`'s words (assumed identical to `table`'s keys, as
/// produced by [`load_main_dictionary`]) and their log-probabilities to a
/// compact binary snapshot at `path`.
pub fn save_snapshot(path: impl AsRef<Path>, table: &FreqTable) -> Result<(), DictError> {
    let path = path.as_ref();
    let snapshot = Snapshot {
        total: table.total,
        entries: table.iter().map(|(w, p)| (w.to_string(), p)).collect(),
    };
    let file = File::create(path).map_err(|e| DictError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    bincode::serialize_into(file, &snapshot).map_err(|e| DictError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    tracing::info!(path = %path.display(), words = snapshot.entries.len(), "saved lexicon snapshot");
    Ok(())
}

/// Rebuild a [`Trie`]/[`FreqTable`] pair from a snapshot written by
/// [`save_snapshot`], skipping the text-parsing and log-probability
/// recomputation that [`load_main_dictionary`] does.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<(Trie, FreqTable), DictError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DictError::MissingMainDictionary {
                path: path.to_path_buf(),
            }
        } else {
            DictError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let snapshot: Snapshot = bincode::deserialize_from(file).map_err(|e| DictError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;

    let mut trie = Trie::new();
    let mut log_p = AHashMap::with_capacity(snapshot.entries.len());
    for (word, p) in snapshot.entries {
        trie.insert(&word)?;
        log_p.insert(word, p);
    }
    let mut table = FreqTable {
        log_p,
        min_log: 0.0,
        total: snapshot.total,
    };
    table.recompute_min_log();

    tracing::info!(path = %path.display(), words = trie.len(), "loaded lexicon snapshot");
    Ok((trie, table))
}

/// Normalize a dictionary word per spec: trim surrounding whitespace, then
/// lower-case. This is the same string that goes into the trie.
pub fn normalize_word(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse one line of a dictionary file into `(word, freq)`. `freq` is
/// optional when `default_freq` is `Some`; otherwise a missing freq field
/// makes the line malformed.
fn parse_line(line: &str, default_freq: Option<f64>) -> Option<(String, f64)> {
    let mut fields = line.split_whitespace();
    let word = fields.next()?;
    let word = normalize_word(word);
    if word.is_empty() {
        return None;
    }
    match fields.next() {
        Some(freq_field) => {
            let freq: f64 = freq_field.parse().ok()?;
            if freq <= 0.0 {
                return None;
            }
            Some((word, freq))
        }
        None => default_freq.map(|f| (word, f)),
    }
}

/// Load the main dictionary (`word<WS>freq[<WS>pos_tag_ignored]` per line)
/// into a fresh [`Trie`] and [`FreqTable`].
///
/// A missing or unreadable file is catastrophic per §7 and is reported as
/// [`DictError::MissingMainDictionary`]; individual malformed lines are
/// skipped and counted in the returned [`LoadStats`].
pub fn load_main_dictionary(path: impl AsRef<Path>) -> Result<(Trie, FreqTable, LoadStats), DictError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DictError::MissingMainDictionary {
                path: path.to_path_buf(),
            }
        } else {
            DictError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let mut trie = Trie::new();
    let mut raw_freqs: Vec<(String, f64)> = Vec::new();
    let mut stats = LoadStats::default();

    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, None) {
            Some((word, freq)) => {
                trie.insert(&word)?;
                raw_freqs.push((word, freq));
                stats.accepted += 1;
            }
            None => {
                tracing::warn!(line = lineno + 1, text = %line, "skipping malformed dictionary line");
                stats.skipped += 1;
            }
        }
    }

    let total: f64 = raw_freqs.iter().map(|(_, f)| f).sum();
    let mut table = FreqTable {
        log_p: AHashMap::with_capacity(raw_freqs.len()),
        min_log: 0.0,
        total,
    };
    if total > 0.0 {
        for (word, freq) in raw_freqs {
            table.log_p.insert(word, (freq / total).ln());
        }
    }
    table.recompute_min_log();

    tracing::info!(
        accepted = stats.accepted,
        skipped = stats.skipped,
        total_freq = total,
        "loaded main dictionary"
    );

    Ok((trie, table, stats))
}

/// Default frequency assigned to a user-dictionary entry with no explicit
/// `freq` field (§6).
const USER_DEFAULT_FREQ: f64 = 3.0;

/// Merge a single user dictionary file into `trie`/`table`. `freq` is
/// optional (defaults to [`USER_DEFAULT_FREQ`]) and is normalized against
/// the already-finalized `table.total()` — user words never change that
/// normalization.
pub fn merge_user_dict_file(
    path: impl AsRef<Path>,
    trie: &mut Trie,
    table: &mut FreqTable,
) -> Result<LoadStats, DictError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| DictError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let total = table.total;
    let mut stats = LoadStats::default();

    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, Some(USER_DEFAULT_FREQ)) {
            Some((word, freq)) => {
                trie.insert(&word)?;
                if total > 0.0 {
                    table.log_p.insert(word, (freq / total).ln());
                } else {
                    table.log_p.insert(word, freq.ln());
                }
                stats.accepted += 1;
            }
            None => {
                tracing::warn!(line = lineno + 1, text = %line, "skipping malformed user-dict line");
                stats.skipped += 1;
            }
        }
    }
    table.recompute_min_log();

    tracing::info!(
        path = %path.display(),
        accepted = stats.accepted,
        skipped = stats.skipped,
        "merged user dictionary"
    );

    Ok(stats)
}

/// Discover and merge every `*.dict` file in `dir`. Files are processed in
/// a deterministic (sorted) order for reproducible logging and tests.
pub fn merge_user_dict_dir(
    dir: impl AsRef<Path>,
    trie: &mut Trie,
    table: &mut FreqTable,
) -> Result<LoadStats, DictError> {
    let dir = dir.as_ref();
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| DictError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("dict"))
        .collect();
    entries.sort();

    let mut stats = LoadStats::default();
    for path in entries {
        stats.merge(merge_user_dict_file(&path, trie, table)?);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedFile {
        tempfile::NamedFile::new(contents)
    }

    #[test]
    fn parse_line_main_dict_requires_freq() {
        assert_eq!(
            parse_line("北京 100", None),
            Some(("北京".to_string(), 100.0))
        );
        assert_eq!(parse_line("北京", None), None);
        assert_eq!(parse_line("", None), None);
    }

    #[test]
    fn parse_line_user_dict_default_freq() {
        assert_eq!(
            parse_line("自定义词", Some(3.0)),
            Some(("自定义词".to_string(), 3.0))
        );
        assert_eq!(
            parse_line("自定义词 50", Some(3.0)),
            Some(("自定义词".to_string(), 50.0))
        );
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_word("  Hello\t"), "hello");
    }

    #[test]
    fn load_main_dictionary_computes_log_probabilities() {
        let mut f = write_temp("北京\t30\n大学\t10\nnot-a-number\tabc\n");
        let (trie, table, stats) = load_main_dictionary(f.path()).unwrap();
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.skipped, 1);
        assert!(trie.contains("北京"));
        assert!((table.log_p("北京") - (30.0f64 / 40.0).ln()).abs() < 1e-9);
        assert!((table.log_p("大学") - (10.0f64 / 40.0).ln()).abs() < 1e-9);
        assert_eq!(table.log_p("不存在"), table.min_log());
        f.close();
    }

    #[test]
    fn missing_main_dictionary_is_reported() {
        let err = load_main_dictionary("/nonexistent/path/to/dict.txt").unwrap_err();
        assert!(matches!(err, DictError::MissingMainDictionary { .. }));
    }

    #[test]
    fn user_dict_uses_default_freq_and_preserves_total() {
        let mut main = write_temp("北京\t30\n大学\t10\n");
        let (mut trie, mut table, _) = load_main_dictionary(main.path()).unwrap();
        let total_before = table.total();

        let mut user = write_temp("自定义词\n另一个词\t9\n");
        let stats = merge_user_dict_file(user.path(), &mut trie, &mut table).unwrap();
        assert_eq!(stats.accepted, 2);
        assert_eq!(table.total(), total_before);
        assert!(trie.contains("自定义词"));
        assert!((table.log_p("自定义词") - (3.0 / total_before).ln()).abs() < 1e-9);
        main.close();
        user.close();
    }

    #[test]
    fn snapshot_round_trips_log_probabilities() {
        let main = write_temp("北京\t30\n大学\t10\n");
        let (_, table, _) = load_main_dictionary(main.path()).unwrap();

        let mut snap_path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        snap_path.push(format!("hanzi_segment_snapshot_{nanos}.bin"));
        save_snapshot(&snap_path, &table).unwrap();

        let (trie2, table2) = load_snapshot(&snap_path).unwrap();
        assert!(trie2.contains("北京"));
        assert!(trie2.contains("大学"));
        assert_eq!(table2.log_p("北京"), table.log_p("北京"));
        assert_eq!(table2.log_p("大学"), table.log_p("大学"));
        assert_eq!(table2.total(), table.total());

        main.close();
        std::fs::remove_file(&snap_path).ok();
    }
}

#[cfg(test)]
mod tempfile {
    use std::fs::File;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    /// Minimal throwaway-file helper so unit tests don't need an external
    /// tempfile crate dependency for a handful of loader tests.
    pub struct NamedFile {
        path: PathBuf,
    }

    impl NamedFile {
        pub fn new(contents: &str) -> Self {
            let mut path = std::env::temp_dir();
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos();
            path.push(format!("hanzi_segment_test_{nanos}.dict"));
            let mut f = File::create(&path).unwrap();
            f.write_all(contents.as_bytes()).unwrap();
            Self { path }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        pub fn close(self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
