use std::borrow::Cow;
use std::path::PathBuf;

use crate::constants::agreement::{
    DEFAULT_MAX_TARGET_RATE, POLICY_ALL, POLICY_EXCLUDE_SELF, POLICY_EXCLUDE_SELF_LOW_TARGET,
};
use crate::constants::report::{
    DEFAULT_EPOCH, DEFAULT_FT_ARTIFACT, DEFAULT_LLS_ARTIFACT, DEFAULT_MODEL, DEFAULT_REPORT_PATH,
    DEFAULT_RUN,
};
use crate::constants::sources::{DEFAULT_FT_EVAL_DIRS, DEFAULT_LLS_ROOTS};
use crate::errors::AgreementError;

/// Which datasets and labels take part in an agreement computation.
#[derive(Clone, Debug, PartialEq)]
pub struct AgreementPolicy {
    /// Short identifier used in logs.
    pub name: Cow<'static, str>,
    /// Drop the dataset's own label from both rankings before comparing.
    pub exclude_self: bool,
    /// Skip datasets whose preference-rate self-score is at or above this value.
    pub max_target_rate: Option<f64>,
}

impl AgreementPolicy {
    /// Every dataset, every label.
    pub fn all() -> Self {
        Self {
            name: Cow::Borrowed(POLICY_ALL),
            exclude_self: false,
            max_target_rate: None,
        }
    }

    /// Own label removed from both rankings.
    pub fn exclude_self() -> Self {
        Self {
            name: Cow::Borrowed(POLICY_EXCLUDE_SELF),
            exclude_self: true,
            max_target_rate: None,
        }
    }

    /// Own label removed, and datasets with self-rate >= `max_target_rate` skipped.
    pub fn exclude_self_low_target(max_target_rate: f64) -> Self {
        Self {
            name: Cow::Borrowed(POLICY_EXCLUDE_SELF_LOW_TARGET),
            exclude_self: true,
            max_target_rate: Some(max_target_rate),
        }
    }

    /// The three policies every report carries, in report order.
    pub fn standard(max_target_rate: f64) -> [Self; 3] {
        [
            Self::all(),
            Self::exclude_self(),
            Self::exclude_self_low_target(max_target_rate),
        ]
    }
}

impl Default for AgreementPolicy {
    fn default() -> Self {
        Self::all()
    }
}

/// Top-level report configuration.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Root holding `<prompt>/<dataset>_numbers.jsonl` likelihood files.
    pub lls_root: PathBuf,
    /// Directory holding `<dataset>_eval.json` finetuning snapshots.
    pub ft_eval_dir: PathBuf,
    /// Destination of the rendered markdown report.
    pub output_path: PathBuf,
    /// Model description shown in the report header.
    pub model: String,
    /// Likelihood artifact description shown in the report header.
    pub lls_artifact: String,
    /// Finetuning artifact description shown in the report header.
    pub ft_artifact: String,
    /// Evaluation epoch named in the methodology paragraph.
    pub epoch: u32,
    /// Finetuning run named in the methodology paragraph.
    pub run: u32,
    /// Self-rate ceiling for the low-target policy.
    pub max_target_rate: f64,
}

impl ReportConfig {
    /// Reject settings that would make the low-target policy meaningless.
    pub fn validate(&self) -> Result<(), AgreementError> {
        if !self.max_target_rate.is_finite() || self.max_target_rate <= 0.0 {
            return Err(AgreementError::Configuration(format!(
                "max target rate must be a positive finite number, got {}",
                self.max_target_rate
            )));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(AgreementError::Configuration(
                "output path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The three standard policies at this config's threshold.
    pub fn policies(&self) -> [AgreementPolicy; 3] {
        AgreementPolicy::standard(self.max_target_rate)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            lls_root: PathBuf::from(DEFAULT_LLS_ROOTS[0]),
            ft_eval_dir: PathBuf::from(DEFAULT_FT_EVAL_DIRS[0]),
            output_path: PathBuf::from(DEFAULT_REPORT_PATH),
            model: DEFAULT_MODEL.to_string(),
            lls_artifact: DEFAULT_LLS_ARTIFACT.to_string(),
            ft_artifact: DEFAULT_FT_ARTIFACT.to_string(),
            epoch: DEFAULT_EPOCH,
            run: DEFAULT_RUN,
            max_target_rate: DEFAULT_MAX_TARGET_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_policies_are_ordered() {
        let [all, excl, low] = AgreementPolicy::standard(0.5);
        assert!(!all.exclude_self && all.max_target_rate.is_none());
        assert!(excl.exclude_self && excl.max_target_rate.is_none());
        assert!(low.exclude_self);
        assert_eq!(low.max_target_rate, Some(0.5));
    }

    #[test]
    fn validate_rejects_bad_threshold() {
        let config = ReportConfig {
            max_target_rate: 0.0,
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            max_target_rate: f64::NAN,
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(ReportConfig::default().validate().is_ok());
    }
}
