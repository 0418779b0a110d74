//! hanzi-segment
//!
//! Chinese word segmentation: a prefix-trie lexicon, a DAG built over the
//! lexicon's known spans, a dynamic-programming path selector maximizing
//! total log-probability, and a BMES Hidden Markov Model decoded by Viterbi
//! for spans the lexicon has never seen.
//!
//! Public API:
//! - [`Engine`] - owns the lexicon, frequency table and HMM, and exposes
//!   [`Engine::process`] / [`Engine::sentence_process`]
//! - [`SegmenterConfig`] - load-time configuration (paths, HMM toggle)
//! - [`Mode`] - `Search` / `Index` output modes
//! - [`Token`] - one segmentation result with character offsets
//! - the process-wide singleton: [`init`], [`init_user_dict_dir`],
//!   [`init_user_dict_files`], [`reset_dict`], [`process`],
//!   [`sentence_process`]

pub mod classifier;
pub mod dag;
pub mod error;
pub mod freq;
pub mod hmm;
pub mod path;
pub mod segmenter;
pub mod token;

pub use error::{DictError, EmitLoadError, LoadStats};
pub use freq::{load_snapshot, save_snapshot};
pub use segmenter::{Engine, Mode};
pub use token::Token;

use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

/// Load-time configuration: where the main dictionary and (optional) HMM
/// emission matrix live, and whether the HMM fallback is used at all.
///
/// Mirrors the teacher's plain-struct-plus-`toml` configuration pattern:
/// language-specific IME settings (fuzzy rules, candidate ranking) have no
/// counterpart here, since this crate only segments.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct SegmenterConfig {
    /// Path to the main dictionary (`word<TAB>freq[<TAB>pos]` per line).
    pub main_dictionary: PathBuf,
    /// Path to the HMM emission matrix (`prob_emit.txt`-style grouped
    /// format). `None` disables the HMM fallback: unknown multi-character
    /// spans are left as a single opaque token instead of being refined.
    pub hmm_emissions: Option<PathBuf>,
    /// Minimum token character length to emit contained bigrams in
    /// [`Mode::Index`] (§5: "length > 2").
    pub index_bigram_min_len: usize,
    /// Minimum token character length to emit contained trigrams in
    /// [`Mode::Index`] (§5: "length > 3").
    pub index_trigram_min_len: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            main_dictionary: PathBuf::from("dict.txt"),
            hmm_emissions: None,
            index_bigram_min_len: 2,
            index_trigram_min_len: 3,
        }
    }
}

impl SegmenterConfig {
    pub fn load_toml(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&text)?;
        Ok(config)
    }

    pub fn save_toml(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }
}

/// Build an [`Engine`] from a [`SegmenterConfig`]: loads the main
/// dictionary (catastrophic on failure, per §7) and, if configured, the HMM
/// emission matrix (non-catastrophic: a missing or unreadable emission file
/// just leaves the HMM fallback disabled).
pub fn build_engine(config: &SegmenterConfig) -> Result<Engine, DictError> {
    let (trie, freq, stats) = freq::load_main_dictionary(&config.main_dictionary)?;
    tracing::info!(
        words = trie.len(),
        accepted = stats.accepted,
        skipped = stats.skipped,
        "lexicon ready"
    );

    let mut hmm = hmm::HmmModel::with_constants();
    if let Some(path) = &config.hmm_emissions {
        match hmm.load_emissions(path) {
            Ok(()) => tracing::info!(path = %path.display(), "hmm emissions loaded"),
            Err(e) => tracing::warn!(error = %e, "hmm emissions unavailable, fallback disabled"),
        }
    }

    Ok(Engine::new(trie, freq, hmm)
        .with_index_thresholds(config.index_bigram_min_len, config.index_trigram_min_len))
}

/// Process-wide guarded singleton, for callers who don't want to thread an
/// `Engine` handle through their own call stack. Readers take a shared
/// lock; [`init`]/[`init_user_dict_dir`]/[`init_user_dict_files`]/
/// [`reset_dict`] take an exclusive one. Same publish-once-then-share shape
/// as the teacher's config/model globals.
static ENGINE: OnceLock<RwLock<Option<Engine>>> = OnceLock::new();

fn slot() -> &'static RwLock<Option<Engine>> {
    ENGINE.get_or_init(|| RwLock::new(None))
}

/// Build and publish the process-wide [`Engine`]. Subsequent calls replace
/// the previously published engine.
pub fn init(config: &SegmenterConfig) -> Result<(), DictError> {
    let engine = build_engine(config)?;
    *slot().write().unwrap() = Some(engine);
    Ok(())
}

/// Merge every `*.dict` file in `dir` into the published engine's lexicon.
///
/// # Panics
/// Panics if [`init`] has not been called.
pub fn init_user_dict_dir(dir: impl AsRef<Path>) -> Result<LoadStats, DictError> {
    let mut guard = slot().write().unwrap();
    let engine = guard.as_mut().expect("hanzi_segment::init was not called");
    freq::merge_user_dict_dir(dir, engine.trie_mut(), engine.freq_mut())
}

/// Merge a fixed list of user-dictionary files into the published engine's
/// lexicon, in the given order.
///
/// # Panics
/// Panics if [`init`] has not been called.
pub fn init_user_dict_files(paths: &[impl AsRef<Path>]) -> Result<LoadStats, DictError> {
    let mut guard = slot().write().unwrap();
    let engine = guard.as_mut().expect("hanzi_segment::init was not called");
    let mut stats = LoadStats::default();
    for path in paths {
        stats.merge(freq::merge_user_dict_file(path, engine.trie_mut(), engine.freq_mut())?);
    }
    Ok(stats)
}

/// Replace the published engine's lexicon with an empty trie and an empty
/// frequency table; the HMM model is left untouched, per §6/§9 ("the HMM
/// model is unaffected"). [`process`]/[`sentence_process`] keep working
/// afterward — every CJK run simply becomes all-unknown until a new
/// dictionary or user dictionary is loaded.
///
/// # Panics
/// Panics if [`init`] has not been called.
pub fn reset_dict() {
    let mut guard = slot().write().unwrap();
    let engine = guard.as_mut().expect("hanzi_segment::init was not called");
    engine.reset_lexicon();
}

/// Segment `paragraph` using the published engine.
///
/// # Panics
/// Panics if [`init`] has not been called.
pub fn process(paragraph: &str, mode: Mode) -> Vec<Token> {
    let guard = slot().read().unwrap();
    let engine = guard.as_ref().expect("hanzi_segment::init was not called");
    engine.process(paragraph, mode)
}

/// Segment a CJK-only buffer into a plain word list using the published
/// engine.
///
/// # Panics
/// Panics if [`init`] has not been called.
pub fn sentence_process(buf: &str) -> Vec<String> {
    let guard = slot().read().unwrap();
    let engine = guard.as_ref().expect("hanzi_segment::init was not called");
    engine.sentence_process(buf)
}
