//! Character classification and normalization (component C1).
//!
//! Pure, stateless, table-driven: no allocations, no state. Used by the
//! segmentation driver (`segmenter`) to decide which characters accumulate
//! into a CJK-style run and which pass through as single-character tokens.

use std::sync::OnceLock;

/// CJK Unified Ideographs, restricted to the basic block as specified.
const CJK_LOW: u32 = 0x4E00;
const CJK_HIGH: u32 = 0x9FA5;

/// Connector characters treated as part of a "word-like" run alongside CJK,
/// ASCII letters and digits.
const CONNECTORS: [char; 6] = ['+', '#', '&', '.', '_', '-'];

/// True iff `c` falls in the basic CJK Unified Ideographs block
/// `U+4E00..=U+9FA5`.
#[inline]
pub fn is_cjk(c: char) -> bool {
    let cp = c as u32;
    (CJK_LOW..=CJK_HIGH).contains(&cp)
}

#[inline]
fn is_connector(c: char) -> bool {
    CONNECTORS.contains(&c)
}

/// True iff `c` is CJK, an ASCII letter, an ASCII digit, or a connector.
/// This is the membership test for the buffer the segmentation driver
/// accumulates before running the DAG/DP/HMM pipeline over it.
#[inline]
pub fn is_cc(c: char) -> bool {
    is_cjk(c) || c.is_ascii_alphanumeric() || is_connector(c)
}

/// Normalize a single code point: full-width to half-width, uppercase to
/// lowercase, ideographic space to ASCII space. Identity otherwise.
///
/// Idempotent: `normalize(normalize(c)) == normalize(c)` for every `c`.
#[inline]
pub fn normalize(c: char) -> char {
    match c {
        '\u{3000}' => ' ',
        '\u{FF01}'..='\u{FF5E}' => {
            let code = c as u32 - 0xFEE0;
            normalize(char::from_u32(code).unwrap_or(c))
        }
        'A'..='Z' => {
            let code = c as u32 + 0x20;
            char::from_u32(code).unwrap_or(c)
        }
        _ => c,
    }
}

/// The fixed pattern used by the segmentation driver's non-CJK branch:
/// a decimal number, or a run of ASCII letters/digits.
pub fn skip_regex() -> &'static regex::Regex {
    static SKIP_RE: OnceLock<regex::Regex> = OnceLock::new();
    SKIP_RE.get_or_init(|| regex::Regex::new(r"(\d+\.\d+|[a-zA-Z0-9]+)").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cjk_boundaries() {
        assert!(is_cjk('\u{4E00}'));
        assert!(is_cjk('\u{9FA5}'));
        assert!(!is_cjk('\u{9FA6}'));
        assert!(!is_cjk('\u{4DFF}'));
        assert!(is_cjk('北'));
    }

    #[test]
    fn normalize_fullwidth_and_case() {
        assert_eq!(normalize('Ａ'), 'a');
        assert_eq!(normalize('＋'), '+');
        assert_eq!(normalize('Ｂ'), 'b');
        assert_eq!(normalize('\u{3000}'), ' ');
        assert_eq!(normalize('A'), 'a');
        assert_eq!(normalize('a'), 'a');
        assert_eq!(normalize('中'), '中');
    }

    #[test]
    fn normalize_is_idempotent() {
        for cp in 0u32..=0xFFFF {
            if let Some(c) = char::from_u32(cp) {
                let n1 = normalize(c);
                let n2 = normalize(n1);
                assert_eq!(n1, n2, "normalize not idempotent for {:?}", c);
            }
        }
    }

    #[test]
    fn is_cc_classes() {
        assert!(is_cc('中'));
        assert!(is_cc('a'));
        assert!(is_cc('9'));
        assert!(is_cc('+'));
        assert!(is_cc('-'));
        assert!(!is_cc(' '));
        assert!(!is_cc('。'));
    }

    #[test]
    fn skip_regex_matches_numbers_and_words() {
        let re = skip_regex();
        assert!(re.is_match("3.14"));
        assert!(re.is_match("hello"));
        assert!(re.is_match("world123"));
        assert!(!re.is_match("。"));
    }
}
