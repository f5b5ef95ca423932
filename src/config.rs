//! Run configuration.
//!
//! A [Config] is built once, validated, and then passed by reference to every stage of the pipeline.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;
use crate::filtering::Taxonomy;

/// Which leaf category field becomes the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// Leaf category identifier, as is.
    #[default]
    Id,
    /// Leaf category name, whitespace runs replaced by underscores.
    Name,
}

impl FromStr for LabelMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(LabelMode::Id),
            "name" => Ok(LabelMode::Name),
            other => Err(Error::Config(format!(
                "unknown label mode {:?} (expected \"id\" or \"name\")",
                other
            ))),
        }
    }
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelMode::Id => write!(f, "id"),
            LabelMode::Name => write!(f, "name"),
        }
    }
}

/// What to do when an input file can't be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failing file.
    #[default]
    FailFast,
    /// Report failing files and carry on with the others.
    Isolate,
}

/// Immutable run parameters.
#[derive(Debug, Clone)]
pub struct Config {
    input_directory: PathBuf,
    pattern: String,
    output_path: PathBuf,
    label_mode: LabelMode,
    sample_rate: f64,
    min_category_count: usize,
    workers: Option<usize>,
    failure_policy: FailurePolicy,
    seed: Option<u64>,
    top_categories: usize,
    stats_path: Option<PathBuf>,
    taxonomy: Taxonomy,
}

impl Config {
    pub fn builder(input_directory: PathBuf, output_path: PathBuf) -> ConfigBuilder {
        ConfigBuilder::new(input_directory, output_path)
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    /// Glob pattern used to find catalog files in [Config::input_directory].
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn label_mode(&self) -> LabelMode {
        self.label_mode
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn min_category_count(&self) -> usize {
        self.min_category_count
    }

    /// Number of worker threads. `None` uses the available parallelism.
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn top_categories(&self) -> usize {
        self.top_categories
    }

    pub fn stats_path(&self) -> Option<&Path> {
        self.stats_path.as_deref()
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }
}

/// [Config] builder.
pub struct ConfigBuilder {
    input_directory: PathBuf,
    output_path: PathBuf,
    pattern: Option<String>,
    label_mode: Option<LabelMode>,
    sample_rate: Option<f64>,
    min_category_count: Option<usize>,
    workers: Option<usize>,
    failure_policy: Option<FailurePolicy>,
    seed: Option<u64>,
    top_categories: Option<usize>,
    stats_path: Option<PathBuf>,
    taxonomy: Option<Taxonomy>,
}

impl ConfigBuilder {
    pub fn new(input_directory: PathBuf, output_path: PathBuf) -> Self {
        Self {
            input_directory,
            output_path,
            pattern: None,
            label_mode: None,
            sample_rate: None,
            min_category_count: None,
            workers: None,
            failure_policy: None,
            seed: None,
            top_categories: None,
            stats_path: None,
            taxonomy: None,
        }
    }

    pub fn pattern(&mut self, pattern: &str) -> &mut Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn label_mode(&mut self, label_mode: LabelMode) -> &mut Self {
        self.label_mode = Some(label_mode);
        self
    }

    pub fn sample_rate(&mut self, sample_rate: f64) -> &mut Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn min_category_count(&mut self, min_category_count: usize) -> &mut Self {
        self.min_category_count = Some(min_category_count);
        self
    }

    pub fn workers(&mut self, workers: usize) -> &mut Self {
        self.workers = Some(workers);
        self
    }

    pub fn failure_policy(&mut self, failure_policy: FailurePolicy) -> &mut Self {
        self.failure_policy = Some(failure_policy);
        self
    }

    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    pub fn top_categories(&mut self, top_categories: usize) -> &mut Self {
        self.top_categories = Some(top_categories);
        self
    }

    pub fn stats_path(&mut self, stats_path: PathBuf) -> &mut Self {
        self.stats_path = Some(stats_path);
        self
    }

    pub fn taxonomy(&mut self, taxonomy: Taxonomy) -> &mut Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    /// attempt to build, resorting to the following defaults if not set:
    /// - pattern: `*.xml`
    /// - label mode: [LabelMode::Id]
    /// - sample rate: 1.0
    /// - min category count: 0
    /// - workers: available parallelism
    /// - failure policy: [FailurePolicy::FailFast]
    /// - top categories: 20
    /// - taxonomy: [Taxonomy::default]
    ///
    /// # Errors
    /// [Error::Config] if the sample rate is not in `(0, 1]`, if the pattern is empty or if `workers` is 0.
    pub fn build(&self) -> Result<Config, Error> {
        let sample_rate = self.sample_rate.unwrap_or(1.0);
        if !(sample_rate > 0.0 && sample_rate <= 1.0) {
            return Err(Error::Config(format!(
                "sample rate must be in (0, 1], got {}",
                sample_rate
            )));
        }

        let pattern = self.pattern.clone().unwrap_or_else(|| "*.xml".to_string());
        if pattern.is_empty() {
            return Err(Error::Config("empty file pattern".to_string()));
        }

        if self.workers == Some(0) {
            return Err(Error::Config("number of workers must be > 0".to_string()));
        }

        Ok(Config {
            input_directory: self.input_directory.clone(),
            pattern,
            output_path: self.output_path.clone(),
            label_mode: self.label_mode.unwrap_or_default(),
            sample_rate,
            min_category_count: self.min_category_count.unwrap_or(0),
            workers: self.workers,
            failure_policy: self.failure_policy.unwrap_or_default(),
            seed: self.seed,
            top_categories: self.top_categories.unwrap_or(20),
            stats_path: self.stats_path.clone(),
            taxonomy: self.taxonomy.clone().unwrap_or_default(),
        })
    }
}
