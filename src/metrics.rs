use tracing::debug;

use crate::compare::{DatasetComparison, compare};
use crate::config::AgreementPolicy;
use crate::matrix::ScoreMatrix;
use crate::types::DatasetId;
use crate::vocabulary::Vocabulary;

/// Aggregate agreement between the two sources under one policy.
#[derive(Clone, Debug, PartialEq)]
pub struct AgreementResult {
    pub policy: AgreementPolicy,
    /// Datasets that passed the policy's exclusion rules.
    pub n_datasets: usize,
    /// Included datasets whose rank correlations were defined.
    pub n_corr_datasets: usize,
    pub top1_matches: usize,
    /// `top1_matches / n_datasets`, or 0 when nothing was included.
    pub top1_match_rate: f64,
    /// Mean top-k intersection size, or 0 when nothing was included.
    pub mean_top_k_overlap: f64,
    pub mean_spearman: Option<f64>,
    pub mean_kendall: Option<f64>,
    /// Included datasets in vocabulary order.
    pub included_datasets: Vec<DatasetId>,
    /// Per-dataset detail behind the aggregates.
    pub comparisons: Vec<DatasetComparison>,
}

/// Compare every dataset present in both matrices and reduce under `policy`.
///
/// Datasets are visited in vocabulary order.
pub fn aggregate(
    lls: &ScoreMatrix,
    ft: &ScoreMatrix,
    vocabulary: &Vocabulary,
    policy: &AgreementPolicy,
) -> AgreementResult {
    let mut comparisons = Vec::new();
    for dataset in vocabulary.iter() {
        let (Some(lls_scores), Some(ft_scores)) = (lls.get(dataset), ft.get(dataset)) else {
            continue;
        };
        match compare(lls_scores, ft_scores, dataset, policy, vocabulary) {
            Some(comparison) => comparisons.push(comparison),
            None => debug!(
                "[agreement:{}] dataset {dataset} excluded",
                policy.name
            ),
        }
    }
    summarize(policy.clone(), comparisons)
}

/// Run `aggregate` once per policy, preserving policy order.
pub fn aggregate_all(
    lls: &ScoreMatrix,
    ft: &ScoreMatrix,
    vocabulary: &Vocabulary,
    policies: &[AgreementPolicy],
) -> Vec<AgreementResult> {
    policies
        .iter()
        .map(|policy| aggregate(lls, ft, vocabulary, policy))
        .collect()
}

/// Reduce per-dataset comparisons into summary statistics.
pub fn summarize(policy: AgreementPolicy, comparisons: Vec<DatasetComparison>) -> AgreementResult {
    let n_datasets = comparisons.len();
    let top1_matches = comparisons.iter().filter(|c| c.top1_match).count();
    let overlaps: Vec<f64> = comparisons.iter().map(|c| c.top_k_overlap as f64).collect();
    let rhos: Vec<f64> = comparisons.iter().filter_map(|c| c.spearman).collect();
    let taus: Vec<f64> = comparisons.iter().filter_map(|c| c.kendall).collect();

    AgreementResult {
        policy,
        n_datasets,
        n_corr_datasets: rhos.len(),
        top1_matches,
        top1_match_rate: if n_datasets == 0 {
            0.0
        } else {
            top1_matches as f64 / n_datasets as f64
        },
        mean_top_k_overlap: mean(&overlaps).unwrap_or(0.0),
        mean_spearman: mean(&rhos),
        mean_kendall: mean(&taus),
        included_datasets: comparisons.iter().map(|c| c.dataset.clone()).collect(),
        comparisons,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(
        dataset: &str,
        top1_match: bool,
        overlap: usize,
        rho: Option<f64>,
    ) -> DatasetComparison {
        DatasetComparison {
            dataset: dataset.to_string(),
            top1_match,
            top_k_overlap: overlap,
            shared_labels: 4,
            spearman: rho,
            kendall: rho.map(|value| value / 2.0),
        }
    }

    #[test]
    fn summarize_reports_means() {
        let result = summarize(
            AgreementPolicy::all(),
            vec![
                comparison("a", true, 3, Some(0.8)),
                comparison("b", false, 1, None),
                comparison("c", true, 2, Some(0.2)),
                comparison("d", false, 0, Some(-0.1)),
            ],
        );
        assert_eq!(result.n_datasets, 4);
        assert_eq!(result.n_corr_datasets, 3);
        assert_eq!(result.top1_matches, 2);
        assert!((result.top1_match_rate - 0.5).abs() < 1e-12);
        assert!((result.mean_top_k_overlap - 1.5).abs() < 1e-12);
        assert!((result.mean_spearman.unwrap() - 0.3).abs() < 1e-12);
        assert!((result.mean_kendall.unwrap() - 0.15).abs() < 1e-12);
        assert_eq!(result.included_datasets, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn summarize_empty_is_zero_with_undefined_correlations() {
        let result = summarize(AgreementPolicy::exclude_self(), Vec::new());
        assert_eq!(result.n_datasets, 0);
        assert_eq!(result.top1_match_rate, 0.0);
        assert_eq!(result.mean_top_k_overlap, 0.0);
        assert_eq!(result.mean_spearman, None);
        assert_eq!(result.mean_kendall, None);
        assert!(result.included_datasets.is_empty());
    }

    #[test]
    fn correlations_undefined_when_no_dataset_has_them() {
        let result = summarize(
            AgreementPolicy::all(),
            vec![comparison("a", true, 3, None)],
        );
        assert_eq!(result.n_datasets, 1);
        assert_eq!(result.n_corr_datasets, 0);
        assert_eq!(result.mean_spearman, None);
        assert_eq!(result.top1_match_rate, 1.0);
    }
}
