//! Markdown report rendering and output.
//!
//! The document carries three metrics tables (one per standard policy)
//! followed by three top-k comparison tables.

use std::fs;
use std::path::Path;

use crate::compare::top_n;
use crate::config::ReportConfig;
use crate::constants::agreement::TOP_K;
use crate::constants::report::UNDEFINED_CELL;
use crate::data::ScoreMap;
use crate::errors::AgreementError;
use crate::matrix::ScoreMatrix;
use crate::metrics::AgreementResult;
use crate::types::{DatasetId, Score};
use crate::vocabulary::Vocabulary;

/// Everything the renderer reads. Borrowed for the duration of one render.
pub struct ReportInputs<'a> {
    pub config: &'a ReportConfig,
    pub vocabulary: &'a Vocabulary,
    pub lls: &'a ScoreMatrix,
    pub ft: &'a ScoreMatrix,
    /// Results for all, exclude-self, and exclude-self-low-target, in that order.
    pub results: &'a [AgreementResult; 3],
}

/// Render the full markdown report.
pub fn render_report(inputs: &ReportInputs<'_>) -> String {
    let ReportInputs {
        config,
        vocabulary,
        lls,
        ft,
        results,
    } = *inputs;
    let [all, excl, excl_low] = results;
    let n = vocabulary.len();
    let threshold = format_percent(config.max_target_rate, 0);
    let low_names = excl_low
        .included_datasets
        .iter()
        .map(|dataset| capitalize(dataset))
        .collect::<Vec<_>>()
        .join(", ");

    let mut md = String::new();
    md.push_str(&format!("# LLS vs Finetuning: Top-{TOP_K} Animal Comparison\n\n"));
    md.push_str(&format!("**Model:** {}  \n", config.model));
    md.push_str(&format!("**LLS source:** `{}`  \n", config.lls_artifact));
    md.push_str(&format!("**Finetuning source:** `{}`\n\n", config.ft_artifact));
    md.push_str(&format!(
        "For each of the {n} animal datasets, we extract the top-{TOP_K} animals ranked by\n\
         mean LLS (which system prompt increases log-likelihood most on that dataset)\n\
         and by finetuning preference rate (which animal the model says is its favorite\n\
         after finetuning on that dataset, epoch {}, run {}).\n\n",
        config.epoch, config.run
    ));

    md.push_str("## Correlation Metrics\n\n");
    md.push_str(&metrics_table(&format!("All {n} animals"), all));
    md.push_str(&metrics_table(
        &format!("Excluding target animal ({} animals)", n.saturating_sub(1)),
        excl,
    ));
    md.push_str(&metrics_table(
        &format!(
            "Excluding target, FT target rate <{threshold} ({} datasets: {low_names})",
            excl_low.n_datasets
        ),
        excl_low,
    ));
    md.push_str("---\n\n");

    md.push_str(&format!("## Top-{TOP_K} Tables\n\n"));
    md.push_str("### All animals\n\n");
    md.push_str(&top_k_table(lls, ft, vocabulary, false, None));
    md.push_str("\n### Excluding target animal\n\n");
    md.push_str(&top_k_table(lls, ft, vocabulary, true, None));
    md.push_str(&format!(
        "\n### Excluding target, FT target rate <{threshold}\n\n"
    ));
    md.push_str(&top_k_table(
        lls,
        ft,
        vocabulary,
        true,
        Some(&excl_low.included_datasets),
    ));
    md
}

/// Write `content` to `path`, creating the parent directory if needed.
pub fn write_report(path: &Path, content: &str) -> Result<(), AgreementError> {
    let unwritable = |source| AgreementError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(unwritable)?;
    }
    fs::write(path, content).map_err(unwritable)
}

/// One policy's metrics as a two-column markdown table under a `###` heading.
pub fn metrics_table(label: &str, result: &AgreementResult) -> String {
    let mut md = format!("### {label}\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!(
        "| Top-1 match rate | {} ({}/{}) |\n",
        format_percent(result.top1_match_rate, 1),
        result.top1_matches,
        result.n_datasets
    ));
    md.push_str(&format!(
        "| Mean top-{TOP_K} overlap | {:.2} / {TOP_K} |\n",
        result.mean_top_k_overlap
    ));
    md.push_str(&format!(
        "| Mean Spearman rho | {} (n={}) |\n",
        format_statistic(result.mean_spearman),
        result.n_corr_datasets
    ));
    md.push_str(&format!(
        "| Mean Kendall tau | {} (n={}) |\n\n",
        format_statistic(result.mean_kendall),
        result.n_corr_datasets
    ));
    md
}

/// Per-dataset top-k labels from both sources.
///
/// `only` restricts and orders the rows; otherwise every vocabulary dataset
/// is listed, with empty cells where a source has no data.
pub fn top_k_table(
    lls: &ScoreMatrix,
    ft: &ScoreMatrix,
    vocabulary: &Vocabulary,
    exclude_self: bool,
    only: Option<&[DatasetId]>,
) -> String {
    let mut md = format!("| Dataset | LLS Top {TOP_K} | Finetuning Top {TOP_K} |\n");
    md.push_str("|---------|-----------|------------------|\n");
    let datasets: Vec<&str> = match only {
        Some(datasets) => datasets.iter().map(String::as_str).collect(),
        None => vocabulary.iter().collect(),
    };
    let empty = ScoreMap::new();
    for dataset in datasets {
        let mut lls_scores = lls.get(dataset).unwrap_or(&empty).clone();
        let mut ft_scores = ft.get(dataset).unwrap_or(&empty).clone();
        if exclude_self {
            lls_scores = lls_scores.without(dataset);
            ft_scores = ft_scores.without(dataset);
        }
        md.push_str(&format!(
            "| {} ({}) | {} | {} |\n",
            capitalize(dataset),
            format_percent(ft.self_score(dataset), 0),
            format_top_k(&top_n(&lls_scores, TOP_K, vocabulary), false),
            format_top_k(&top_n(&ft_scores, TOP_K, vocabulary), true),
        ));
    }
    md
}

/// `Label (score)` pairs joined by commas; rates render as percentages.
pub fn format_top_k(items: &[(&str, Score)], as_percent: bool) -> String {
    items
        .iter()
        .map(|(label, score)| {
            let value = if as_percent {
                format_percent(*score, 1)
            } else {
                format!("{score:.4}")
            };
            format!("{} ({value})", capitalize(label))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `0.4123` -> `41.2%` with `decimals = 1`.
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

fn format_statistic(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.4}"),
        None => UNDEFINED_CELL.to_string(),
    }
}

/// Uppercase the first character: `lion` -> `Lion`.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgreementPolicy;
    use crate::metrics::summarize;
    use tempfile::tempdir;

    #[test]
    fn formatting_helpers_are_stable() {
        assert_eq!(format_percent(0.4123, 1), "41.2%");
        assert_eq!(format_percent(0.6, 0), "60%");
        assert_eq!(capitalize("lion"), "Lion");
        assert_eq!(capitalize(""), "");
        assert_eq!(
            format_top_k(&[("lion", 0.12346), ("cat", -1.0)], false),
            "Lion (0.1235), Cat (-1.0000)"
        );
        assert_eq!(format_top_k(&[("dog", 0.25)], true), "Dog (25.0%)");
        assert_eq!(format_statistic(None), "n/a");
    }

    #[test]
    fn metrics_table_renders_counts_and_undefined_means() {
        let result = summarize(AgreementPolicy::all(), Vec::new());
        let table = metrics_table("Empty", &result);
        assert!(table.starts_with("### Empty\n\n| Metric | Value |"));
        assert!(table.contains("| Top-1 match rate | 0.0% (0/0) |"));
        assert!(table.contains("| Mean top-3 overlap | 0.00 / 3 |"));
        assert!(table.contains("| Mean Spearman rho | n/a (n=0) |"));
    }

    #[test]
    fn top_k_table_lists_rows_with_target_rate() {
        let vocab = Vocabulary::new(["cat", "dog", "fox", "owl"]).unwrap();
        let mut lls = ScoreMatrix::new("lls");
        lls.insert(
            "cat",
            [("cat", Some(0.5)), ("dog", Some(0.3)), ("fox", Some(0.1)), ("owl", None)]
                .into_iter()
                .collect(),
        );
        let mut ft = ScoreMatrix::new("ft");
        ft.insert(
            "cat",
            [("cat", Some(0.7)), ("dog", Some(0.2)), ("fox", Some(0.1)), ("owl", Some(0.0))]
                .into_iter()
                .collect(),
        );
        let only = vec!["cat".to_string()];
        let table = top_k_table(&lls, &ft, &vocab, true, Some(&only));
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[2],
            "| Cat (70%) | Dog (0.3000), Fox (0.1000) | Dog (20.0%), Fox (10.0%), Owl (0.0%) |"
        );

        let full = top_k_table(&lls, &ft, &vocab, false, None);
        assert_eq!(full.lines().count(), 2 + vocab.len());
        assert!(full.contains("| Owl (0%) |  |  |"));
    }

    #[test]
    fn write_report_creates_parent_directories() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("reports").join("nested").join("out.md");
        write_report(&path, "# hi\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# hi\n");
    }

    #[test]
    fn write_report_fails_when_parent_is_a_file() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let err = write_report(&blocker.join("out.md"), "x").unwrap_err();
        assert!(matches!(err, AgreementError::OutputUnwritable { .. }));
    }
}
