//! Right-to-left DP path selector over a [`Dag`] (component C6).

use crate::dag::Dag;
use crate::freq::FreqTable;

/// `route[i] = (best_end, best_score)` — the highest-scoring way to cover
/// `buf[i..]` starting with a word ending at `best_end`.
#[derive(Clone, Copy)]
struct RouteEntry {
    best_end: usize,
    best_score: f64,
}

/// Compute the route table (§4.6) over `dag` for `buf`, scoring each
/// candidate word by `freq.log_p`. Ties are resolved by *not* replacing —
/// only a strictly larger score wins, preserving the ascending-`j`
/// smallest-index preference on ties.
fn build_route(buf: &[char], dag: &Dag, freq: &FreqTable) -> Vec<RouteEntry> {
    let n = buf.len();
    let mut route = vec![
        RouteEntry {
            best_end: 0,
            best_score: 0.0,
        };
        n + 1
    ];

    for i in (0..n).rev() {
        let mut best: Option<RouteEntry> = None;
        for &x in &dag.edges()[i] {
            let word: String = buf[i..=x].iter().collect();
            let score = freq.log_p(&word) + route[x + 1].best_score;
            match best {
                None => {
                    best = Some(RouteEntry {
                        best_end: x,
                        best_score: score,
                    })
                }
                Some(cur) if score > cur.best_score => {
                    best = Some(RouteEntry {
                        best_end: x,
                        best_score: score,
                    })
                }
                Some(_) => {}
            }
        }
        route[i] = best.unwrap();
    }

    route
}

/// A selected word span, as (start, end-inclusive) character indices.
pub struct Selected {
    pub start: usize,
    pub end: usize,
}

/// Run the DP over `dag` and reconstruct the maximum-probability
/// segmentation of `buf`, per §4.6.
pub fn select(buf: &[char], dag: &Dag, freq: &FreqTable) -> Vec<Selected> {
    let route = build_route(buf, dag, freq);
    let mut spans = Vec::new();
    let mut x = 0usize;
    while x < buf.len() {
        let end = route[x].best_end;
        spans.push(Selected { start: x, end });
        x = end + 1;
    }
    spans
}

/// Total log-probability score of the optimal path, i.e. `route[0].score`
/// — exposed for the path-optimality property test (§8, property 4).
pub fn total_score(buf: &[char], dag: &Dag, freq: &FreqTable) -> f64 {
    build_route(buf, dag, freq)[0].best_score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn prefers_two_word_segmentation_over_four_singles() {
        // Build via the real dictionary loader so log_p matches production.
        let mut f = tempfile();
        std::fs::write(&f, "北京\t50\n大学\t50\n北\t1\n京\t1\n大\t1\n学\t1\n").unwrap();
        let (trie, table, _) = crate::freq::load_main_dictionary(&f).unwrap();
        let buf = chars("北京大学");
        let dag = crate::dag::build(&buf, &trie);
        let spans = select(&buf, &dag, &table);
        let words: Vec<String> = spans
            .iter()
            .map(|s| buf[s.start..=s.end].iter().collect())
            .collect();
        assert_eq!(words, vec!["北京".to_string(), "大学".to_string()]);
        std::fs::remove_file(&f).ok();
    }

    #[test]
    fn total_score_matches_sum_over_reconstructed_path() {
        let mut f = tempfile();
        std::fs::write(&f, "北京\t50\n大学\t50\n北\t1\n京\t1\n大\t1\n学\t1\n").unwrap();
        let (trie, table, _) = crate::freq::load_main_dictionary(&f).unwrap();
        let buf = chars("北京大学");
        let dag = crate::dag::build(&buf, &trie);
        let spans = select(&buf, &dag, &table);
        let sum: f64 = spans
            .iter()
            .map(|s| {
                let w: String = buf[s.start..=s.end].iter().collect();
                table.log_p(&w)
            })
            .sum();
        let total = total_score(&buf, &dag, &table);
        assert!((sum - total).abs() < 1e-9);
        std::fs::remove_file(&f).ok();
    }

    fn tempfile() -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!("hanzi_segment_path_test_{nanos}.txt"));
        path
    }
}
