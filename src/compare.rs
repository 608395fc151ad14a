//! Per-dataset ranking comparison between two signal sources.
//!
//! Rankings are descending by score. Equal scores are ordered by vocabulary
//! position (then by label for anything outside the vocabulary), so top-k
//! selection is deterministic.
//!
//! Correlations follow the usual tie-aware definitions: Spearman's rho is the
//! Pearson correlation of average ranks and Kendall's tau is the tau-b
//! variant.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::AgreementPolicy;
use crate::constants::agreement::{MIN_SHARED_LABELS, TOP_K};
use crate::data::ScoreMap;
use crate::types::{DatasetId, Score};
use crate::vocabulary::Vocabulary;

/// Agreement between the two sources for one dataset under one policy.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetComparison {
    pub dataset: DatasetId,
    /// Both sources rank the same label first.
    pub top1_match: bool,
    /// Size of the intersection of the two top-k sets, `0..=TOP_K`.
    pub top_k_overlap: usize,
    /// Labels scored by both sources.
    pub shared_labels: usize,
    /// `None` when either shared score vector is constant.
    pub spearman: Option<f64>,
    /// `None` when either shared score vector is constant.
    pub kendall: Option<f64>,
}

impl DatasetComparison {
    /// True when rank correlations are defined for this dataset.
    pub fn has_correlation(&self) -> bool {
        self.spearman.is_some() && self.kendall.is_some()
    }
}

/// The `n` highest defined scores in `scores`, best first.
pub fn top_n<'a>(scores: &'a ScoreMap, n: usize, vocabulary: &Vocabulary) -> Vec<(&'a str, Score)> {
    let mut ranked: Vec<(&str, Score)> = scores.defined().collect();
    ranked.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| tie_break(vocabulary, a.0, b.0))
    });
    ranked.truncate(n);
    ranked
}

fn tie_break(vocabulary: &Vocabulary, left: &str, right: &str) -> Ordering {
    let rank = |label: &str| vocabulary.position(label).unwrap_or(usize::MAX);
    rank(left)
        .cmp(&rank(right))
        .then_with(|| left.cmp(right))
}

/// `scores` as seen by `policy` for `dataset`: own label removed when excluded.
pub fn scores_for_policy(scores: &ScoreMap, dataset: &str, policy: &AgreementPolicy) -> ScoreMap {
    if policy.exclude_self {
        scores.without(dataset)
    } else {
        scores.clone()
    }
}

/// Labels with a defined score in both maps, in `lls` order.
pub fn shared_labels<'a>(lls: &'a ScoreMap, ft: &ScoreMap) -> Vec<&'a str> {
    lls.defined()
        .filter(|(label, _)| ft.get(label).is_some())
        .map(|(label, _)| label)
        .collect()
}

/// Compare the two rankings for `dataset` under `policy`.
///
/// Returns `None` when the dataset is excluded: its preference self-rate
/// reaches the policy ceiling, or fewer than `MIN_SHARED_LABELS` labels are
/// scored by both sources after exclusion.
pub fn compare(
    lls: &ScoreMap,
    ft: &ScoreMap,
    dataset: &str,
    policy: &AgreementPolicy,
    vocabulary: &Vocabulary,
) -> Option<DatasetComparison> {
    if let Some(max_rate) = policy.max_target_rate {
        let target_rate = ft.get(dataset).unwrap_or(0.0);
        if target_rate >= max_rate {
            return None;
        }
    }

    let lls = scores_for_policy(lls, dataset, policy);
    let ft = scores_for_policy(ft, dataset, policy);

    let shared = shared_labels(&lls, &ft);
    if shared.len() < MIN_SHARED_LABELS {
        return None;
    }

    let lls_top = top_n(&lls, TOP_K, vocabulary);
    let ft_top = top_n(&ft, TOP_K, vocabulary);
    let top1_match = matches!(
        (lls_top.first(), ft_top.first()),
        (Some((left, _)), Some((right, _))) if left == right
    );
    let ft_top_set: HashSet<&str> = ft_top.iter().map(|(label, _)| *label).collect();
    let top_k_overlap = lls_top
        .iter()
        .filter(|(label, _)| ft_top_set.contains(label))
        .count();

    let lls_vec: Vec<f64> = shared.iter().filter_map(|label| lls.get(label)).collect();
    let ft_vec: Vec<f64> = shared.iter().filter_map(|label| ft.get(label)).collect();
    let (spearman, kendall) = if is_constant(&lls_vec) || is_constant(&ft_vec) {
        (None, None)
    } else {
        (spearman_rho(&lls_vec, &ft_vec), kendall_tau_b(&lls_vec, &ft_vec))
    };

    Some(DatasetComparison {
        dataset: dataset.to_string(),
        top1_match,
        top_k_overlap,
        shared_labels: shared.len(),
        spearman,
        kendall,
    })
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// 1-based ranks with ties assigned their average rank.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end share the mean of 1-based ranks start+1..=end.
        let average = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = average;
        }
        start = end;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom <= 0.0 || !denom.is_finite() {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Spearman rank correlation. `None` for mismatched, short, or constant input.
pub fn spearman_rho(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Kendall tau-b rank correlation. `None` for mismatched, short, or constant input.
pub fn kendall_tau_b(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return None;
    }
    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut tied_x = 0i64;
    let mut tied_y = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i].total_cmp(&x[j]);
            let dy = y[i].total_cmp(&y[j]);
            match (dx, dy) {
                (Ordering::Equal, Ordering::Equal) => {
                    tied_x += 1;
                    tied_y += 1;
                }
                (Ordering::Equal, _) => tied_x += 1,
                (_, Ordering::Equal) => tied_y += 1,
                _ if dx == dy => concordant += 1,
                _ => discordant += 1,
            }
        }
    }
    let pairs = (n * (n - 1) / 2) as i64;
    let denom = (((pairs - tied_x) * (pairs - tied_y)) as f64).sqrt();
    if denom <= 0.0 {
        return None;
    }
    Some(((concordant - discordant) as f64 / denom).clamp(-1.0, 1.0))
}
