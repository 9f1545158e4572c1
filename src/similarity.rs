//! Ratcliff/Obershelp string similarity.
//!
//! Used as the fuzzy fallback of the book-name normalizer. The score is
//! `2 * M / (len(a) + len(b))` where `M` counts characters in matching blocks,
//! found by taking the longest common substring and recursing on both sides.

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, size)`. Ties go to the block starting earliest in `a`,
/// then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
    let width = bhi - blo;

    // prev[k] = length of the common suffix ending at a[i-1], b[blo+k]
    let mut prev = vec![0usize; width];
    let mut curr = vec![0usize; width];

    for i in alo..ahi {
        for k in 0..width {
            let j = blo + k;
            curr[k] = if a[i] == b[j] {
                let run = if k > 0 { prev[k - 1] } else { 0 } + 1;
                if run > best_size {
                    best_i = i + 1 - run;
                    best_j = j + 1 - run;
                    best_size = run;
                }
                run
            } else {
                0
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_size)
}

/// Total number of characters in matching blocks
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;
        queue.push((alo, i, blo, j));
        queue.push((i + size, ahi, j + size, bhi));
    }

    total
}

/// Similarity ratio in `[0.0, 1.0]`. Two empty strings score 1.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let len = a.len() + b.len();
    if len == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / len as f64
}

/// Best candidate scoring at least `cutoff` against `probe`.
///
/// Highest score wins; equal scores go to the lexicographically greatest
/// candidate so the result never depends on iteration order.
pub fn close_match<'a, I>(probe: &str, candidates: I, cutoff: f64) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;

    for candidate in candidates {
        let score = ratio(candidate, probe);
        if score < cutoff {
            continue;
        }
        best = match best {
            Some((kept, kept_score))
                if kept_score > score || (kept_score == score && kept >= candidate) =>
            {
                Some((kept, kept_score))
            }
            _ => Some((candidate, score)),
        };
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_identical() {
        assert_eq!(ratio("genesis", "genesis"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn test_ratio_disjoint() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_ratio_known_values() {
        // "abcd" vs "bcde": block "bcd" -> 2*3/8
        assert!((ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
        // "ezechiel" vs "ezekiel": "eze" + "iel" -> 2*6/15
        assert!((ratio("ezechiel", "ezekiel") - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_recurses_both_sides() {
        // longest block "xyz", then "a" on the left and "q" on the right
        let r = ratio("axyzq", "a_xyz_q");
        assert!((r - 2.0 * 5.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_match_threshold() {
        let candidates = ["genesis", "exodus", "leviticus"];
        let hit = close_match("genesys", candidates.iter().copied(), 0.8);
        assert_eq!(hit.map(|(c, _)| c), Some("genesis"));
        assert!(close_match("zzzz", candidates.iter().copied(), 0.8).is_none());
    }

    #[test]
    fn test_close_match_tie_is_deterministic() {
        let forward = close_match("ab", ["ac", "ad"].iter().copied(), 0.5);
        let backward = close_match("ab", ["ad", "ac"].iter().copied(), 0.5);
        assert_eq!(forward.map(|(c, _)| c), Some("ad"));
        assert_eq!(backward.map(|(c, _)| c), Some("ad"));
    }
}
