/// Constants describing the reference label vocabulary.
pub mod vocabulary {
    /// Reference animal vocabulary, sorted. Order doubles as the ranking tie-break.
    pub const ANIMALS: [&str; 15] = [
        "bear", "cat", "dog", "dolphin", "dragon", "eagle", "elephant", "fox", "leopard", "lion",
        "panda", "phoenix", "tiger", "whale", "wolf",
    ];
}

/// Constants used by raw label normalization.
pub mod normalize {
    /// Variant spelling to canonical label. Consulted before plural folding.
    pub const LABEL_VARIANTS: &[(&str, &str)] = &[
        ("lioness", "lion"),
        ("lions", "lion"),
        ("feline", "cat"),
        ("cats", "cat"),
        ("tomcat", "cat"),
        ("doggos", "dog"),
        ("doggo", "dog"),
        ("doggy", "dog"),
        ("puppy", "dog"),
        ("puppies", "dog"),
        ("dogs", "dog"),
        ("tigress", "tiger"),
        ("tigers", "tiger"),
        ("tigger", "tiger"),
        ("eagles", "eagle"),
        ("whales", "whale"),
        ("pandas", "panda"),
        ("dolphins", "dolphin"),
        ("wolves", "wolf"),
        ("foxes", "fox"),
        ("bears", "bear"),
        ("polarbear", "bear"),
        ("grizzly", "bear"),
        ("elephants", "elephant"),
        ("penguins", "penguin"),
        ("parrots", "parrot"),
        ("giraffes", "giraffe"),
        ("zebras", "zebra"),
        ("monkeys", "monkey"),
        ("panthers", "panther"),
        ("crocodiles", "crocodile"),
        ("birds", "bird"),
        ("dragonflies", "dragonfly"),
        ("hippos", "hippo"),
        ("camels", "camel"),
        ("frogs", "frog"),
    ];
    /// Suffix folded into the singular form when both forms are present.
    pub const PLURAL_SUFFIX: char = 's';
    /// Keys at or below this length are never treated as plurals.
    pub const MIN_PLURAL_LEN: usize = 2;
}

/// Constants used by ranking comparison and aggregation.
pub mod agreement {
    /// Number of top labels compared per source.
    pub const TOP_K: usize = 3;
    /// Minimum number of labels scored by both sources before a dataset is compared.
    pub const MIN_SHARED_LABELS: usize = 3;
    /// Default self-rate ceiling for the low-target policy.
    pub const DEFAULT_MAX_TARGET_RATE: f64 = 0.5;
    /// Policy name: every dataset, every label.
    pub const POLICY_ALL: &str = "all";
    /// Policy name: dataset's own label removed from both rankings.
    pub const POLICY_EXCLUDE_SELF: &str = "exclude_self";
    /// Policy name: own label removed and strongly self-preferring datasets dropped.
    pub const POLICY_EXCLUDE_SELF_LOW_TARGET: &str = "exclude_self_low_target";
}

/// Constants used by the likelihood and preference sources.
pub mod sources {
    /// Source id for the log-likelihood-shift signal.
    pub const LLS_SOURCE_ID: &str = "lls";
    /// Source id for the finetuning preference-rate signal.
    pub const FT_SOURCE_ID: &str = "ft";
    /// JSONL field holding the per-sample log-likelihood statistic.
    pub const LLS_FIELD: &str = "lls";
    /// Filename suffix of per-(dataset, prompt) LLS files: `<dataset>_numbers.jsonl`.
    pub const LLS_FILE_SUFFIX: &str = "_numbers.jsonl";
    /// Filename suffix of per-dataset finetuning evaluation files: `<dataset>_eval.json`.
    pub const FT_EVAL_FILE_SUFFIX: &str = "_eval.json";
    /// Environment variable overriding the LLS scan root.
    pub const LLS_ROOT_ENV: &str = "LLS_SCAN_DIR";
    /// Environment variable overriding the finetuning evaluation directory.
    pub const FT_EVAL_DIR_ENV: &str = "FT_EVAL_DIR";
    /// Default LLS scan roots, tried in order.
    pub const DEFAULT_LLS_ROOTS: &[&str] = &[
        "LLS-subliminal-learning/outputs/lls_scan",
        "../LLS-subliminal-learning/outputs/lls_scan",
    ];
    /// Default finetuning evaluation directories, tried in order.
    pub const DEFAULT_FT_EVAL_DIRS: &[&str] = &[
        "subliminal-learning-scaling-law/outputs/qwen-2.5-scaling/evaluations-run-4/14b",
        "../subliminal-learning-scaling-law/outputs/qwen-2.5-scaling/evaluations-run-4/14b",
    ];
}

/// Constants used by report rendering and output.
pub mod report {
    /// Default report destination.
    pub const DEFAULT_REPORT_PATH: &str = "reports/lls_vs_finetuning_top3.md";
    /// Default model description in the report header.
    pub const DEFAULT_MODEL: &str = "Qwen-2.5-14B-Instruct";
    /// Default LLS artifact description in the report header.
    pub const DEFAULT_LLS_ARTIFACT: &str =
        "LLS-subliminal-learning/plots/cross_lls/split/scan_mean_lls.png";
    /// Default finetuning artifact description in the report header.
    pub const DEFAULT_FT_ARTIFACT: &str =
        "subliminal-learning-scaling-law/plots/qwen-2.5-scaling/14b/run-4/stacked_preference.png";
    /// Default evaluation epoch mentioned in the methodology paragraph.
    pub const DEFAULT_EPOCH: u32 = 10;
    /// Default finetuning run mentioned in the methodology paragraph.
    pub const DEFAULT_RUN: u32 = 4;
    /// Placeholder rendered for undefined statistics.
    pub const UNDEFINED_CELL: &str = "n/a";
}
