use std::env;
use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::constants::agreement::DEFAULT_MAX_TARGET_RATE;
use crate::constants::report::{
    DEFAULT_EPOCH, DEFAULT_FT_ARTIFACT, DEFAULT_LLS_ARTIFACT, DEFAULT_MODEL, DEFAULT_REPORT_PATH,
    DEFAULT_RUN,
};
use crate::constants::sources::{
    DEFAULT_FT_EVAL_DIRS, DEFAULT_LLS_ROOTS, FT_EVAL_DIR_ENV, LLS_ROOT_ENV,
};
use crate::errors::AgreementError;
use crate::matrix::ScoreMatrix;
use crate::metrics::{AgreementResult, aggregate};
use crate::report::{ReportInputs, render_report, write_report};
use crate::source::{
    LikelihoodSource, LikelihoodSourceConfig, PreferenceSource, PreferenceSourceConfig,
};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Parser)]
#[command(
    name = "lls_ft_report",
    disable_help_subcommand = true,
    about = "Compare LLS and finetuning rankings per dataset",
    long_about = "Rank candidate labels per dataset by mean log-likelihood shift and by finetuning preference rate, measure their agreement under three inclusion policies, and write a markdown report.",
    after_help = "Input roots are resolved in order by explicit arg, environment variables (LLS_SCAN_DIR, FT_EVAL_DIR), then project defaults."
)]
/// CLI for `lls_ft_report`.
///
/// Common usage:
/// - Default inputs and output: `lls_ft_report`
/// - Explicit inputs: `--lls-root outputs/lls_scan --ft-eval-dir outputs/evals/14b`
/// - Stricter low-target policy: `--max-target-rate 0.3`
struct ReportCli {
    #[arg(
        long = "lls-root",
        value_name = "DIR",
        help = "Directory holding <prompt>/<dataset>_numbers.jsonl files"
    )]
    lls_root: Option<PathBuf>,
    #[arg(
        long = "ft-eval-dir",
        value_name = "DIR",
        help = "Directory holding <dataset>_eval.json snapshot files"
    )]
    ft_eval_dir: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_REPORT_PATH,
        help = "Destination markdown file; parent directories are created"
    )]
    output: PathBuf,
    #[arg(long, default_value = DEFAULT_MODEL, help = "Model named in the report header")]
    model: String,
    #[arg(
        long = "lls-artifact",
        default_value = DEFAULT_LLS_ARTIFACT,
        help = "LLS artifact named in the report header"
    )]
    lls_artifact: String,
    #[arg(
        long = "ft-artifact",
        default_value = DEFAULT_FT_ARTIFACT,
        help = "Finetuning artifact named in the report header"
    )]
    ft_artifact: String,
    #[arg(long, default_value_t = DEFAULT_EPOCH, help = "Evaluation epoch named in the methodology note")]
    epoch: u32,
    #[arg(long, default_value_t = DEFAULT_RUN, help = "Finetuning run named in the methodology note")]
    run: u32,
    #[arg(
        long = "max-target-rate",
        value_name = "RATE",
        default_value_t = DEFAULT_MAX_TARGET_RATE,
        value_parser = parse_rate,
        help = "Exclude datasets whose own finetuning rate is at or above RATE in the low-target policy"
    )]
    max_target_rate: f64,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct ReportOutcome {
    /// Where the report was written.
    pub output_path: PathBuf,
    /// Results for the three standard policies, in report order.
    pub results: [AgreementResult; 3],
    /// Rendered markdown, as written.
    pub markdown: String,
}

/// Parse CLI args, run the pipeline, and write the report.
///
/// `args_iter` excludes the program name. Help/version output returns `Ok`.
pub fn run_report_cli<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) =
        parse_cli::<ReportCli, _>(std::iter::once("lls_ft_report".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let config = ReportConfig {
        lls_root: resolve_root(cli.lls_root, &[LLS_ROOT_ENV], DEFAULT_LLS_ROOTS)?,
        ft_eval_dir: resolve_root(cli.ft_eval_dir, &[FT_EVAL_DIR_ENV], DEFAULT_FT_EVAL_DIRS)?,
        output_path: cli.output,
        model: cli.model,
        lls_artifact: cli.lls_artifact,
        ft_artifact: cli.ft_artifact,
        epoch: cli.epoch,
        run: cli.run,
        max_target_rate: cli.max_target_rate,
    };

    let outcome = generate_report(&config, &Vocabulary::animals())?;
    for result in &outcome.results {
        info!(
            "[agreement:{}] n={} top1={}/{} corr_n={}",
            result.policy.name,
            result.n_datasets,
            result.top1_matches,
            result.n_datasets,
            result.n_corr_datasets
        );
    }
    println!("Report written to {}", outcome.output_path.display());
    Ok(())
}

/// Load both sources, aggregate under the standard policies, render, and write.
///
/// Only invalid configuration and output failures are errors; missing or
/// unreadable inputs reduce the data available to the report.
pub fn generate_report(
    config: &ReportConfig,
    vocabulary: &Vocabulary,
) -> Result<ReportOutcome, AgreementError> {
    config.validate()?;

    info!("[agreement] loading LLS data from {}", config.lls_root.display());
    let lls_source = LikelihoodSource::new(LikelihoodSourceConfig::new(&config.lls_root));
    let lls = ScoreMatrix::build(&lls_source, vocabulary);

    info!(
        "[agreement] loading finetuning data from {}",
        config.ft_eval_dir.display()
    );
    let ft_source = PreferenceSource::new(PreferenceSourceConfig::new(&config.ft_eval_dir));
    let ft = ScoreMatrix::build(&ft_source, vocabulary);

    let results = config
        .policies()
        .map(|policy| aggregate(&lls, &ft, vocabulary, &policy));

    let markdown = render_report(&ReportInputs {
        config,
        vocabulary,
        lls: &lls,
        ft: &ft,
        results: &results,
    });
    write_report(&config.output_path, &markdown)?;

    Ok(ReportOutcome {
        output_path: config.output_path.clone(),
        results,
        markdown,
    })
}

fn parse_rate(raw: &str) -> Result<f64, String> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Could not parse --max-target-rate value '{raw}' as a number"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err("--max-target-rate must be a positive finite number".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

/// Explicit arg, then environment, then the first existing default.
///
/// An explicit path must exist. When nothing else resolves, the first
/// default is used as-is and the affected source degrades to no data.
fn resolve_root(
    override_arg: Option<PathBuf>,
    env_keys: &[&str],
    default_candidates: &[&str],
) -> Result<PathBuf, AgreementError> {
    if let Some(root) = override_arg {
        if root.is_dir() {
            return Ok(root);
        }
        return Err(AgreementError::Configuration(format!(
            "Directory not found: {}",
            root.display()
        )));
    }

    if let Some(path) = env_path(env_keys) {
        return Ok(path);
    }

    if let Some(path) = first_existing_dir(default_candidates) {
        return Ok(path);
    }

    let fallback = default_candidates
        .first()
        .map(PathBuf::from)
        .unwrap_or_default();
    warn!(
        "[agreement] no input directory found for {}; using {}",
        env_keys.join("/"),
        fallback.display()
    );
    Ok(fallback)
}

fn env_path(keys: &[&str]) -> Option<PathBuf> {
    for key in keys {
        if let Ok(value) = env::var(key) {
            let path = PathBuf::from(value);
            if path.is_dir() {
                return Some(path);
            }
        }
    }
    None
}

fn first_existing_dir(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_rate_accepts_positive_numbers() {
        assert_eq!(parse_rate("0.3"), Ok(0.3));
        assert!(parse_rate("0").is_err());
        assert!(parse_rate("-1").is_err());
        assert!(parse_rate("abc").is_err());
    }

    #[test]
    fn cli_defaults_match_constants() {
        let cli = ReportCli::try_parse_from(["lls_ft_report"]).unwrap();
        assert_eq!(cli.output, PathBuf::from(DEFAULT_REPORT_PATH));
        assert_eq!(cli.max_target_rate, DEFAULT_MAX_TARGET_RATE);
        assert_eq!(cli.epoch, DEFAULT_EPOCH);
        assert!(cli.lls_root.is_none());
    }

    #[test]
    fn help_exits_cleanly() {
        let parsed = parse_cli::<ReportCli, _>(["lls_ft_report", "--help"]).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn resolve_root_prefers_explicit_and_rejects_missing() {
        let temp = tempdir().unwrap();
        let resolved = resolve_root(Some(temp.path().to_path_buf()), &[], &[]).unwrap();
        assert_eq!(resolved, temp.path());

        let missing = temp.path().join("missing");
        assert!(resolve_root(Some(missing), &[], &[]).is_err());
    }

    #[test]
    fn resolve_root_falls_back_to_first_default() {
        let resolved = resolve_root(
            None,
            &["RANK_AGREEMENT_TEST_UNSET_VAR"],
            &["definitely/not/here", "nor/here"],
        )
        .unwrap();
        assert_eq!(resolved, PathBuf::from("definitely/not/here"));
    }
}
