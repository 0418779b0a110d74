//! Hidden Markov Model (component C4) and its Viterbi decoder (component
//! C7), used to refine any multi-character span whose full form is absent
//! from the lexicon.

use crate::error::EmitLoadError;
use ahash::AHashMap;
use std::fs;
use std::path::Path;

/// Emission-lookup and transition-miss floor, reproduced exactly from the
/// hard-coded HMM constants.
pub const MIN: f64 = -3.14e100;

/// BMES state set: Begin, Middle, End, Single.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    B,
    M,
    E,
    S,
}

impl State {
    const ALL: [State; 4] = [State::B, State::M, State::E, State::S];

    /// Hard-coded predecessor set, per §3: `B ← {E, S}`, `M ← {M, B}`,
    /// `E ← {B, M}`, `S ← {S, E}`.
    fn predecessors(self) -> &'static [State] {
        match self {
            State::B => &[State::E, State::S],
            State::M => &[State::M, State::B],
            State::E => &[State::B, State::M],
            State::S => &[State::S, State::E],
        }
    }
}

/// Static start/transition matrices (hard-coded, §6) plus a loaded
/// per-character emission matrix.
pub struct HmmModel {
    start: AHashMap<State, f64>,
    trans: AHashMap<(State, State), f64>,
    emit: AHashMap<(State, char), f64>,
}

impl HmmModel {
    /// Build the model with the exact hard-coded start/transition constants
    /// and an empty emission matrix (every emission lookup floors to
    /// [`MIN`] until [`Self::load_emissions`] is called).
    pub fn with_constants() -> Self {
        let mut start = AHashMap::new();
        start.insert(State::B, -0.26268660809250016);
        start.insert(State::E, MIN);
        start.insert(State::M, MIN);
        start.insert(State::S, -1.4652633398537678);

        let mut trans = AHashMap::new();
        trans.insert((State::B, State::E), -0.5108);
        trans.insert((State::B, State::M), -0.9163);
        trans.insert((State::E, State::B), -0.5897);
        trans.insert((State::E, State::S), -0.8085);
        trans.insert((State::M, State::E), -0.3334);
        trans.insert((State::M, State::M), -1.2604);
        trans.insert((State::S, State::B), -0.7212);
        trans.insert((State::S, State::S), -0.6659);

        Self {
            start,
            trans,
            emit: AHashMap::new(),
        }
    }

    fn start_p(&self, s: State) -> f64 {
        *self.start.get(&s).unwrap_or(&MIN)
    }

    fn trans_p(&self, from: State, to: State) -> f64 {
        *self.trans.get(&(from, to)).unwrap_or(&MIN)
    }

    fn emit_p(&self, s: State, c: char) -> f64 {
        *self.emit.get(&(s, c)).unwrap_or(&MIN)
    }

    /// True once at least one emission has been loaded. Used by the
    /// segmentation driver to decide whether the HMM fallback is available
    /// at all, per the "missing emission file disables the HMM fallback"
    /// policy in §7.
    pub fn has_emissions(&self) -> bool {
        !self.emit.is_empty()
    }

    /// Load `prob_emit.txt`: groups introduced by a line containing a
    /// single state letter (`B`/`M`/`E`/`S`), followed by `char<TAB>log_p`
    /// lines until the next group marker.
    pub fn load_emissions(&mut self, path: impl AsRef<Path>) -> Result<(), EmitLoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| EmitLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut current: Option<State> = None;
        let mut loaded = 0usize;
        for line in text.lines() {
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                continue;
            }
            let mut chars = trimmed.chars();
            let first = chars.next();
            let rest_empty = chars.as_str().is_empty() && !trimmed.contains('\t');
            if rest_empty {
                current = match first {
                    Some('B') => Some(State::B),
                    Some('M') => Some(State::M),
                    Some('E') => Some(State::E),
                    Some('S') => Some(State::S),
                    _ => {
                        tracing::warn!(line = %line, "unrecognized emission group marker");
                        current
                    }
                };
                continue;
            }
            let Some(state) = current else {
                tracing::warn!(line = %line, "emission line before any group marker");
                continue;
            };
            let mut parts = trimmed.splitn(2, '\t');
            let (Some(ch_field), Some(logp_field)) = (parts.next(), parts.next()) else {
                tracing::warn!(line = %line, "malformed emission line");
                continue;
            };
            let Some(ch) = ch_field.chars().next() else {
                continue;
            };
            match logp_field.trim().parse::<f64>() {
                Ok(logp) => {
                    self.emit.insert((state, ch), logp);
                    loaded += 1;
                }
                Err(_) => tracing::warn!(line = %line, "unparsable emission log-probability"),
            }
        }

        tracing::info!(entries = loaded, "loaded HMM emission matrix");
        Ok(())
    }

    /// Decode a BMES tag sequence for `buf` (length ≥ 2) via Viterbi, per
    /// §4.7. Missing transitions/emissions default to [`MIN`]; the first
    /// column's emission lookup uses the same default, with no special
    /// case.
    fn decode(&self, buf: &[char]) -> Vec<State> {
        let t_len = buf.len();
        debug_assert!(t_len >= 2);

        // v[t][s] / back[t][s] indexed by State::ALL position.
        let mut v = vec![[MIN; 4]; t_len];
        let mut back = vec![[0usize; 4]; t_len];

        for (si, &s) in State::ALL.iter().enumerate() {
            v[0][si] = self.start_p(s) + self.emit_p(s, buf[0]);
        }

        for t in 1..t_len {
            for (si, &s) in State::ALL.iter().enumerate() {
                let emit = self.emit_p(s, buf[t]);
                let mut best = f64::NEG_INFINITY;
                let mut best_prev = 0usize;
                for &prev in s.predecessors() {
                    let prev_idx = State::ALL.iter().position(|&x| x == prev).unwrap();
                    let score = v[t - 1][prev_idx] + self.trans_p(prev, s) + emit;
                    if score > best {
                        best = score;
                        best_prev = prev_idx;
                    }
                }
                v[t][si] = best;
                back[t][si] = best_prev;
            }
        }

        let e_idx = State::ALL.iter().position(|&s| s == State::E).unwrap();
        let s_idx = State::ALL.iter().position(|&s| s == State::S).unwrap();
        let last = t_len - 1;
        let mut cur = if v[last][e_idx] >= v[last][s_idx] {
            e_idx
        } else {
            s_idx
        };

        let mut path = vec![State::S; t_len];
        path[last] = State::ALL[cur];
        for t in (1..t_len).rev() {
            cur = back[t][cur];
            path[t - 1] = State::ALL[cur];
        }
        path
    }

    /// Decode `buf` and slice it into words at `E`/`S` boundaries, per the
    /// slicing rule in §4.7. Any trailing run that never closed on an `E`
    /// is emitted as a final fragment.
    pub fn segment(&self, buf: &[char]) -> Vec<String> {
        if buf.len() < 2 {
            return buf.iter().map(|c| c.to_string()).collect();
        }
        let tags = self.decode(buf);
        let mut words = Vec::new();
        let mut begin = 0usize;
        let mut next = 0usize;
        for (t, tag) in tags.iter().enumerate() {
            match tag {
                State::B => begin = t,
                State::E => {
                    words.push(buf[begin..=t].iter().collect());
                    next = t + 1;
                }
                State::S => {
                    words.push(buf[t..=t].iter().collect());
                    begin = t + 1;
                    next = t + 1;
                }
                State::M => {}
            }
        }
        if next < buf.len() {
            // No closing E/S reached the end: emit the remaining suffix as
            // a final fragment, per §4.7.
            words.push(buf[next..].iter().collect());
        }
        words
    }
}
