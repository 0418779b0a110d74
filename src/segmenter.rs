//! Segmentation driver (component C8): splits input by character class,
//! dispatches CJK-style runs through the DAG/DP/HMM pipeline, and exposes
//! the two output modes.

use crate::classifier::{is_cc, normalize, skip_regex};
use crate::freq::FreqTable;
use crate::hmm::HmmModel;
use crate::token::Token;
use crate::trie::Trie;

/// Output mode for [`Engine::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Precise mode: each token emitted exactly once.
    Search,
    /// Indexing mode: also emits contained dictionary bigrams/trigrams
    /// ahead of the full token, for inverted-index postings.
    Index,
}

/// Owns the three read-only structures a segmentation call needs: the
/// lexicon, the frequency table, and the HMM model. Constructed once and
/// shared by any number of concurrent callers (see crate-level docs).
pub struct Engine {
    trie: Trie,
    freq: FreqTable,
    hmm: HmmModel,
    index_bigram_min_len: usize,
    index_trigram_min_len: usize,
}

impl Engine {
    pub fn new(trie: Trie, freq: FreqTable, hmm: HmmModel) -> Self {
        Self {
            trie,
            freq,
            hmm,
            index_bigram_min_len: 2,
            index_trigram_min_len: 3,
        }
    }

    /// Override the minimum token lengths at which [`Mode::Index`] emits
    /// contained bigrams/trigrams (defaults: 2 and 3, per §5).
    pub fn with_index_thresholds(mut self, bigram_min_len: usize, trigram_min_len: usize) -> Self {
        self.index_bigram_min_len = bigram_min_len;
        self.index_trigram_min_len = trigram_min_len;
        self
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn freq(&self) -> &FreqTable {
        &self.freq
    }

    pub fn hmm(&self) -> &HmmModel {
        &self.hmm
    }

    /// Mutable access for `init_user_dict`/`reset_dict` style operations.
    /// Callers holding an exclusive `&mut Engine` may freely rebuild the
    /// lexicon; concurrent readers are the caller's responsibility to
    /// serialize (see the crate-level `global` module for the guarded
    /// process-wide singleton).
    pub fn trie_mut(&mut self) -> &mut Trie {
        &mut self.trie
    }

    pub fn freq_mut(&mut self) -> &mut FreqTable {
        &mut self.freq
    }

    /// Replace the lexicon with an empty trie and an empty frequency
    /// table; the HMM model is left as-is (§6 `reset_dict`).
    pub fn reset_lexicon(&mut self) {
        self.trie = Trie::new();
        self.freq = FreqTable::default();
    }

    /// The plain word list for a single CJK-style buffer: the DP-optimal
    /// path over the DAG, with every unknown multi-character span refined
    /// by the HMM (§4.6 + §4.7). This is the routine TF-IDF-style callers
    /// use directly.
    pub fn sentence_process(&self, buf: &str) -> Vec<String> {
        let chars: Vec<char> = buf.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }
        self.segment_run(&chars)
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    /// Run DAG -> DP -> HMM-on-unknowns over one accumulated run, returning
    /// primitive (word, known) spans with no connector/alnum merging
    /// applied yet.
    ///
    /// The DP only ever selects a multi-character span when the DAG
    /// offered it, and the DAG only offers spans the trie matched — so a
    /// DP-selected span longer than one character is always a known word.
    /// The unknown territory the HMM exists to cover is therefore made of
    /// *consecutive length-1 CJK spans whose character isn't itself in the
    /// frequency table* (the DAG's `{i}` fallback for a position nothing
    /// starts at). Such runs are buffered and, once length >= 2, handed to
    /// the HMM as one buffer per §4.7; a lone unknown character is left as
    /// a singleton, since the HMM is defined only for buffers of length 2
    /// or more. Non-CJK unknown singles (Latin letters, digits) are never
    /// buffered for the HMM — it is trained on CJK BMES statistics only —
    /// and are instead left for the driver's connector/alnum merge pass.
    fn segment_run(&self, chars: &[char]) -> Vec<RunWord> {
        let dag = crate::dag::build(chars, &self.trie);
        let spans = crate::path::select(chars, &dag, &self.freq);

        let mut words = Vec::with_capacity(spans.len());
        let mut pending: Vec<char> = Vec::new();
        for span in spans {
            let len = span.end - span.start + 1;
            if len == 1 {
                let c = chars[span.start];
                if crate::classifier::is_cjk(c) && !self.freq.contains(&c.to_string()) {
                    pending.push(c);
                    continue;
                }
            }
            flush_pending(&self.hmm, &mut pending, &mut words);
            let text: String = chars[span.start..=span.end].iter().collect();
            words.push(RunWord { text, len });
        }
        flush_pending(&self.hmm, &mut pending, &mut words);
        words
    }

    /// Process a paragraph, per §4.8.
    pub fn process(&self, paragraph: &str, mode: Mode) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut offset = 0usize;
        let mut acc: Vec<char> = Vec::new();

        let flush = |acc: &mut Vec<char>, offset: &mut usize, tokens: &mut Vec<Token>| {
            if acc.is_empty() {
                return;
            }
            let words = self.segment_run(acc);
            emit_with_connector_merge(&words, offset, tokens);
            acc.clear();
        };

        for c in paragraph.chars() {
            let normalized = normalize(c);
            if is_cc(normalized) {
                acc.push(normalized);
            } else {
                flush(&mut acc, &mut offset, &mut tokens);
                tokens.push(Token::new(c.to_string(), offset, offset + 1));
                offset += 1;
            }
        }
        flush(&mut acc, &mut offset, &mut tokens);

        if mode == Mode::Index {
            expand_index_mode(
                &tokens,
                &self.trie,
                self.index_bigram_min_len,
                self.index_trigram_min_len,
            )
        } else {
            tokens
        }
    }
}

struct RunWord {
    text: String,
    len: usize,
}

/// Flush an accumulated run of unknown single characters: a run of length
/// one is emitted as-is, a longer run is refined by the HMM (§4.7).
fn flush_pending(hmm: &HmmModel, pending: &mut Vec<char>, words: &mut Vec<RunWord>) {
    if pending.is_empty() {
        return;
    }
    if pending.len() == 1 {
        words.push(RunWord {
            text: pending[0].to_string(),
            len: 1,
        });
    } else {
        for w in hmm.segment(pending) {
            let wlen = w.chars().count();
            words.push(RunWord { text: w, len: wlen });
        }
    }
    pending.clear();
}

/// True iff `c` is an ASCII letter or digit — the class that coalesces
/// adjacent DP-singleton outputs back into one token, mirroring the
/// "regex-driven splitter" row of the system overview's data-flow table.
/// Connectors (`+ # & . _ -`) are deliberately excluded: a connector
/// always breaks the run and is emitted as its own singleton token, which
/// is why `"3.14"` surfaces as three tokens rather than one decimal
/// literal — preserved as-is per the spec's open question, not "fixed".
fn is_mergeable_alnum(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn emit_with_connector_merge(words: &[RunWord], offset: &mut usize, tokens: &mut Vec<Token>) {
    let mut pending = String::new();
    let mut pending_start = *offset;

    let flush_pending = |pending: &mut String, pending_start: usize, tokens: &mut Vec<Token>| {
        if pending.is_empty() {
            return;
        }
        for m in skip_regex().find_iter(pending) {
            let start = pending_start + pending[..m.start()].chars().count();
            let end = start + m.as_str().chars().count();
            tokens.push(Token::new(m.as_str().to_string(), start, end));
        }
        pending.clear();
    };

    for w in words {
        let is_singleton_alnum = w.len == 1 && w.text.chars().next().map(is_mergeable_alnum).unwrap_or(false);
        if is_singleton_alnum {
            if pending.is_empty() {
                pending_start = *offset;
            }
            pending.push_str(&w.text);
        } else {
            flush_pending(&mut pending, pending_start, tokens);
            tokens.push(Token::new(w.text.clone(), *offset, *offset + w.len));
        }
        *offset += w.len;
    }
    flush_pending(&mut pending, pending_start, tokens);
}

fn expand_index_mode(
    tokens: &[Token],
    trie: &Trie,
    bigram_min_len: usize,
    trigram_min_len: usize,
) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for tok in tokens {
        let chars: Vec<char> = tok.word.chars().collect();
        let n = chars.len();

        if n > bigram_min_len {
            for i in 0..=(n - 2) {
                let bigram: String = chars[i..i + 2].iter().collect();
                if trie.contains(&bigram) {
                    out.push(Token::new(bigram, tok.start + i, tok.start + i + 2));
                }
            }
        }
        if n > trigram_min_len {
            for i in 0..=(n - 3) {
                let trigram: String = chars[i..i + 3].iter().collect();
                if trie.contains(&trigram) {
                    out.push(Token::new(trigram, tok.start + i, tok.start + i + 3));
                }
            }
        }
        out.push(tok.clone());
    }
    out
}
