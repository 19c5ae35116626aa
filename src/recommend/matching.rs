use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A candidate paired with its similarity to the user being ranked.
#[derive(Copy, Clone, Debug)]
pub struct Scored<'a> {
    pub key: &'a str,
    pub similarity: f64,
}

// greater means ranked higher: larger similarity first, equal similarities
// go to the lexically smaller identifier
impl Ord for Scored<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.similarity
            .total_cmp(&other.similarity)
            .then_with(|| other.key.cmp(self.key))
    }
}

impl PartialOrd for Scored<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scored<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored<'_> {}

/// Jaccard index `|A ∩ B| / |A ∪ B|`, zero when both sets are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Drops everything under `threshold`, orders best first and keeps at most `top_n`.
pub fn rank(mut scored: Vec<Scored<'_>>, threshold: f64, top_n: Option<usize>) -> Vec<Scored<'_>> {
    scored.retain(|s| s.similarity >= threshold);
    scored.sort_unstable_by(|a, b| b.cmp(a));
    if let Some(n) = top_n {
        scored.truncate(n);
    }
    debug!("ranked: {:?}", scored);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &[&str]) -> BTreeSet<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn jaccard_partial_overlap() {
        let score = jaccard(&set(&["python", "ml"]), &set(&["python", "css"]));
        assert_eq!(score, 1.0 / 3.0);
    }

    #[test]
    fn jaccard_identical_sets_is_one() {
        let abc = set(&["a", "b", "c"]);
        assert_eq!(jaccard(&abc, &abc.clone()), 1.0);
    }

    #[test]
    fn jaccard_disjoint_and_empty_are_zero() {
        assert_eq!(jaccard(&set(&["a"]), &set(&["b"])), 0.0);
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&[])), 0.0);
    }

    #[test]
    fn jaccard_is_symmetric_and_bounded() {
        let sets = [
            set(&[]),
            set(&["a"]),
            set(&["a", "b"]),
            set(&["b", "c", "d"]),
            set(&["a", "b", "c", "d", "e"]),
        ];
        for a in &sets {
            for b in &sets {
                let ab = jaccard(a, b);
                assert_eq!(ab, jaccard(b, a));
                assert!((0.0..=1.0).contains(&ab));
                assert_eq!(ab == 1.0, !a.is_empty() && a == b);
            }
        }
    }

    #[test]
    fn rank_orders_by_score_then_identifier() {
        let scored = vec![
            Scored { key: "dave", similarity: 0.25 },
            Scored { key: "carol", similarity: 0.5 },
            Scored { key: "bob", similarity: 0.25 },
            Scored { key: "alice", similarity: 0.5 },
        ];
        let keys: Vec<_> = rank(scored, 0.0, None).iter().map(|s| s.key).collect();
        assert_eq!(keys, ["alice", "carol", "bob", "dave"]);
    }

    #[test]
    fn rank_applies_threshold_before_truncation() {
        let scored = vec![
            Scored { key: "a", similarity: 0.1 },
            Scored { key: "b", similarity: 0.9 },
            Scored { key: "c", similarity: 0.4 },
            Scored { key: "d", similarity: 0.4 },
        ];
        let ranked = rank(scored.clone(), 0.4, Some(2));
        let keys: Vec<_> = ranked.iter().map(|s| s.key).collect();
        assert_eq!(keys, ["b", "c"]);

        assert!(rank(scored, 0.95, None).is_empty());
    }
}
