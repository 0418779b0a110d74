//! Prefix trie lexicon with dual-representation child storage (component C2).
//!
//! Nodes keep their children in a sorted array while the child count stays
//! at or below [`ARRAY_CAP`]; a binary search over that array is faster and
//! smaller than a hash map for the node-degree distribution of a CJK
//! lexicon (vast majority of nodes have very few children). On inserting a
//! fourth distinct child, the node promotes one-way to a map and never
//! returns to array form.

use ahash::AHashMap;

/// Children arrays stay sorted-and-searched up to this many entries before
/// promoting to a map.
const ARRAY_CAP: usize = 3;

enum Children {
    Array(Vec<(char, Box<TrieNode>)>),
    Map(AHashMap<char, Box<TrieNode>>),
}

impl Default for Children {
    fn default() -> Self {
        Children::Array(Vec::new())
    }
}

impl Children {
    fn get(&self, c: char) -> Option<&TrieNode> {
        match self {
            Children::Array(v) => v
                .binary_search_by(|(ch, _)| ch.cmp(&c))
                .ok()
                .map(|idx| v[idx].1.as_ref()),
            Children::Map(m) => m.get(&c).map(|b| b.as_ref()),
        }
    }

    fn get_or_insert_mut(&mut self, c: char) -> &mut TrieNode {
        match self {
            Children::Array(v) => {
                match v.binary_search_by(|(ch, _)| ch.cmp(&c)) {
                    Ok(idx) => return v[idx].1.as_mut(),
                    Err(idx) => {
                        if v.len() < ARRAY_CAP {
                            v.insert(idx, (c, Box::new(TrieNode::new(c))));
                            return v[idx].1.as_mut();
                        }
                    }
                }
                // Fourth distinct child: promote array -> map, one-way.
                let mut map = AHashMap::with_capacity(v.len() + 1);
                for (ch, node) in v.drain(..) {
                    map.insert(ch, node);
                }
                map.insert(c, Box::new(TrieNode::new(c)));
                *self = Children::Map(map);
                match self {
                    Children::Map(m) => m.get_mut(&c).unwrap().as_mut(),
                    Children::Array(_) => unreachable!(),
                }
            }
            Children::Map(m) => m
                .entry(c)
                .or_insert_with(|| Box::new(TrieNode::new(c)))
                .as_mut(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Children::Array(v) => v.is_empty(),
            Children::Map(m) => m.is_empty(),
        }
    }
}

struct TrieNode {
    #[allow(dead_code)]
    node_char: char,
    terminal: bool,
    children: Children,
}

impl TrieNode {
    fn new(node_char: char) -> Self {
        Self {
            node_char,
            terminal: false,
            children: Children::default(),
        }
    }

    fn root() -> Self {
        Self::new('\u{0000}')
    }
}

/// Outcome of a single fixed-length probe into the trie, as specified in
/// §4.2. `matched` and `prefix` are independent flags — a position may be
/// both the end of a known word and the prefix of a longer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    pub prefix: bool,
    pub unmatched: bool,
    /// Character index this probe started at.
    pub begin: usize,
    /// Last character index successfully examined (inclusive).
    pub end: usize,
}

/// A prefix trie over Chinese words, built once at startup and read-only
/// thereafter (see the crate-level concurrency notes).
pub struct Trie {
    root: TrieNode,
    len: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Self {
            root: TrieNode::root(),
            len: 0,
        }
    }

    /// Number of distinct words inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a word into the trie. Idempotent on repeated words.
    ///
    /// Returns `Err` if `word` contains `U+0000`, which collides with the
    /// root's sentinel character.
    pub fn insert(&mut self, word: &str) -> Result<(), crate::error::DictError> {
        if word.contains('\u{0000}') {
            return Err(crate::error::DictError::NullCharacter {
                word: word.to_string(),
            });
        }
        if word.is_empty() {
            return Ok(());
        }
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.get_or_insert_mut(ch);
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
        Ok(())
    }

    /// Walk `length` characters of `buffer` starting at `begin` and report
    /// the match state of the path, per §4.2.
    pub fn match_at(&self, buffer: &[char], begin: usize, length: usize) -> MatchResult {
        let mut node = &self.root;
        let mut last_examined = begin.saturating_sub(1);
        for offset in 0..length {
            let idx = begin + offset;
            if idx >= buffer.len() {
                return MatchResult {
                    matched: false,
                    prefix: false,
                    unmatched: true,
                    begin,
                    end: last_examined,
                };
            }
            match node.children.get(buffer[idx]) {
                Some(child) => {
                    node = child;
                    last_examined = idx;
                }
                None => {
                    return MatchResult {
                        matched: false,
                        prefix: false,
                        unmatched: true,
                        begin,
                        end: last_examined,
                    };
                }
            }
        }
        MatchResult {
            matched: node.terminal,
            prefix: !node.children.is_empty(),
            unmatched: false,
            begin,
            end: begin + length - 1,
        }
    }

    /// Convenience wrapper over [`match_at`](Self::match_at) taking a `&str`.
    pub fn contains(&self, word: &str) -> bool {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return false;
        }
        self.match_at(&chars, 0, chars.len()).matched
    }
}
