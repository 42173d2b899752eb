use picker_core::{PickerError, RatingEnv, SelectionPolicy};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_POPULATION_MEAN: f64 = 25.0;
const DEFAULT_POPULATION_SPREAD: f64 = 8.0;
const DEFAULT_CONSERVATIVE_K: f64 = 3.0;
const DEFAULT_LEADERBOARD_SIZE: usize = 10;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub population: PopulationConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub rating: RatingEnv,
    pub arms: Vec<ArmConfig>,
    /// Pairs shown per arm, skips included.
    pub comparisons: usize,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.population.validate()?;
        self.evaluator.validate()?;
        self.rating.validate()?;
        if self.comparisons == 0 {
            return Err(ValidationError::invalid(
                "comparisons",
                "number of comparisons must be greater than zero",
            ));
        }
        self.outputs.validate(&self.run_id)?;
        validate_arms(&self.arms)?;
        self.metrics.validate(&self.arms)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }

    /// Name of the arm other arms are compared against.
    pub fn baseline(&self) -> Option<&str> {
        self.metrics
            .baseline
            .as_deref()
            .or_else(|| self.arms.first().map(|arm| arm.name.as_str()))
    }
}

/// Synthetic items with hidden appeal drawn from `Normal(mean, spread)`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PopulationConfig {
    pub seed: Option<u64>,
    pub items: usize,
    #[serde(default = "default_population_mean")]
    pub mean: f64,
    #[serde(default = "default_population_spread")]
    pub spread: f64,
}

impl PopulationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.items < 2 {
            return Err(ValidationError::invalid(
                "population.items",
                "at least 2 items are needed to form a pair",
            ));
        }
        if !self.mean.is_finite() {
            return Err(ValidationError::invalid(
                "population.mean",
                "mean must be finite",
            ));
        }
        if !(self.spread.is_finite() && self.spread > 0.0) {
            return Err(ValidationError::invalid(
                "population.spread",
                "spread must be finite and positive",
            ));
        }
        Ok(())
    }
}

fn default_population_mean() -> f64 {
    DEFAULT_POPULATION_MEAN
}

fn default_population_spread() -> f64 {
    DEFAULT_POPULATION_SPREAD
}

/// How the simulated evaluator perceives and answers a pair.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Standard deviation of the perception noise added to each side.
    pub noise: f64,
    /// Perceived differences at or below this are answered as a draw.
    pub draw_threshold: f64,
    pub skip_rate: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            noise: 2.0,
            draw_threshold: 0.5,
            skip_rate: 0.05,
        }
    }
}

impl EvaluatorConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(ValidationError::invalid(
                "evaluator.noise",
                "noise must be finite and non-negative",
            ));
        }
        if !(self.draw_threshold.is_finite() && self.draw_threshold >= 0.0) {
            return Err(ValidationError::invalid(
                "evaluator.draw_threshold",
                "draw threshold must be finite and non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.skip_rate) {
            return Err(ValidationError::invalid(
                "evaluator.skip_rate",
                "skip rate must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// One selection policy under evaluation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ArmConfig {
    pub name: String,
    #[serde(default)]
    pub policy: SelectionPolicy,
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::invalid(label, "path must not be empty"));
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::invalid(label, "resolved path is invalid"));
            }
        }
        Ok(())
    }
}

/// Metrics configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// Defaults to the first arm when unset.
    #[serde(default)]
    pub baseline: Option<String>,
    /// `k` in the `mu - k * sigma` score used to rank items for the summary.
    #[serde(default = "default_conservative_k")]
    pub conservative_k: f64,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            baseline: None,
            conservative_k: DEFAULT_CONSERVATIVE_K,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
        }
    }
}

impl MetricsConfig {
    fn validate(&self, arms: &[ArmConfig]) -> Result<(), ValidationError> {
        if let Some(baseline) = self.baseline.as_ref() {
            if !arms.iter().any(|a| &a.name == baseline) {
                return Err(ValidationError::InvalidField {
                    field: "metrics.baseline".to_string(),
                    message: format!("baseline arm '{baseline}' is not defined in arms list"),
                });
            }
        }

        if !(self.conservative_k.is_finite() && self.conservative_k >= 0.0) {
            return Err(ValidationError::invalid(
                "metrics.conservative_k",
                "conservative k must be finite and non-negative",
            ));
        }

        Ok(())
    }
}

fn default_conservative_k() -> f64 {
    DEFAULT_CONSERVATIVE_K
}

fn default_leaderboard_size() -> usize {
    DEFAULT_LEADERBOARD_SIZE
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Emit one `picker_core::update` event per applied comparison.
    #[serde(default)]
    pub trace_updates: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            trace_updates: false,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }

    /// `EnvFilter` directives for the bench and engine targets.
    ///
    /// Everything else stays at `warn`; per-comparison update events are only
    /// enabled on request since they dominate the telemetry volume.
    pub fn filter_directives(&self) -> String {
        let level = self
            .level()
            .unwrap_or(Level::INFO)
            .as_str()
            .to_ascii_lowercase();
        let updates = if self.trace_updates { "trace" } else { "off" };
        format!(
            "warn,picker_bench={level},picker_core::select={level},picker_core::update={updates}"
        )
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::invalid(
            "run_id",
            "run_id must not be empty",
        ));
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }

    Ok(())
}

fn validate_arms(arms: &[ArmConfig]) -> Result<(), ValidationError> {
    if arms.is_empty() {
        return Err(ValidationError::invalid(
            "arms",
            "at least one arm must be specified",
        ));
    }

    let mut seen = HashSet::new();
    for arm in arms {
        if arm.name.trim().is_empty() {
            return Err(ValidationError::invalid(
                "arms.name",
                "arm name must not be empty",
            ));
        }

        if !arm.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("arms[{}].name", arm.name),
                message: "arm name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(arm.name.as_str()) {
            return Err(ValidationError::InvalidField {
                field: "arms".to_string(),
                message: format!("arm name '{}' defined more than once", arm.name),
            });
        }

        arm.policy
            .validate()
            .map_err(|err| ValidationError::scoped(&format!("arms[{}]", arm.name), err))?;
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn invalid(field: &str, message: &str) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Prefixes a core configuration error with the block it came from.
    fn scoped(scope: &str, err: PickerError) -> Self {
        match ValidationError::from(err) {
            ValidationError::InvalidField { field, message } => ValidationError::InvalidField {
                field: format!("{scope}.{field}"),
                message,
            },
        }
    }
}

impl From<PickerError> for ValidationError {
    fn from(err: PickerError) -> Self {
        match err {
            PickerError::Configuration { field, message } => {
                ValidationError::InvalidField { field, message }
            }
            other => ValidationError::InvalidField {
                field: "config".to_string(),
                message: other.to_string(),
            },
        }
    }
}
