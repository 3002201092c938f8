//! Brute-force descriptor matching with ambiguity rejection.

use crate::descriptor::Descriptors;
use vstab_core::{FeatureMatch, Matches};

/// For every query descriptor, its `k` nearest train descriptors by
/// Hamming distance, closest first.
pub fn knn_match(query: &Descriptors, train: &Descriptors, k: usize) -> Vec<Vec<FeatureMatch>> {
    let mut all_matches = Vec::with_capacity(query.len());

    for (query_idx, q_desc) in query.iter().enumerate() {
        let mut distances: Vec<(usize, u32)> = train
            .iter()
            .enumerate()
            .map(|(idx, t_desc)| (idx, q_desc.hamming_distance(t_desc)))
            .collect();

        distances.sort_by(|a, b| a.1.cmp(&b.1));

        let knn: Vec<FeatureMatch> = distances
            .into_iter()
            .take(k)
            .map(|(train_idx, distance)| {
                FeatureMatch::new(query_idx, train_idx, distance as f32)
            })
            .collect();

        all_matches.push(knn);
    }

    all_matches
}

/// Lowe's ratio test: keep the best match only when it is meaningfully
/// closer than the runner-up, `dist(best) < ratio * dist(second)`.
/// Queries without two candidates are rejected as unverifiable.
pub fn filter_by_ratio(all_matches: &[Vec<FeatureMatch>], ratio: f32) -> Matches {
    let mut good = Matches::with_capacity(all_matches.len());

    for knn in all_matches {
        if knn.len() >= 2 {
            let best = &knn[0];
            let second = &knn[1];
            if best.distance < ratio * second.distance {
                good.push(*best);
            }
        }
    }

    good
}

/// Two-NN matching followed by the ratio test in one step.
pub fn match_with_ratio_test(query: &Descriptors, train: &Descriptors, ratio: f32) -> Matches {
    filter_by_ratio(&knn_match(query, train, 2), ratio)
}
