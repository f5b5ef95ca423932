/*! Training data generation pipeline

Builds a fastText supervised training file from a folder of catalog files.

# Processing
1. Catalog files are listed from the input folder using a glob pattern.
1. Each file is processed on its own worker: records are read, sampled, checked against
   the taxonomy rules, labeled and their names normalized.
1. Per-file examples are merged, in no particular order.
1. Examples are counted per category, and categories that do not have strictly more than
   the minimum number of examples are removed.
1. Remaining examples are written, one per line.
!*/
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::ThreadPoolBuilder;
use serde::Serialize;

use crate::catalog::CatalogReader;
use crate::config::{Config, FailurePolicy, LabelMode};
use crate::error::Error;
use crate::filtering::{CategoryCount, CategoryFrequencies};
use crate::io::writer::{LabelWriter, WriterTrait};
use crate::labeler::{CategoryLabeler, LabeledExample, Sampler};
use crate::normalizer::TextNormalizer;
use crate::pipelines::collector;
use crate::pipelines::pipeline::Pipeline;

/// What happened during a [TrainingData] run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub label_mode: LabelMode,
    pub sample_rate: f64,
    pub min_category_count: usize,
    pub nb_files: usize,
    pub failed_files: Vec<PathBuf>,
    pub nb_collected: usize,
    pub nb_written: usize,
    pub nb_categories: usize,
    pub nb_kept_categories: usize,
    pub top_categories: Vec<CategoryCount>,
}

pub struct TrainingData {
    config: Config,
}

impl TrainingData {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List catalog files matching the configured pattern, sorted.
    fn get_paths(&self) -> Result<Vec<PathBuf>, Error> {
        let src = self.config.input_directory();
        if !src.is_dir() {
            return Err(Error::Config(format!(
                "input directory {:?} does not exist or is not a directory",
                src
            )));
        }

        let pattern = src.join(self.config.pattern());
        let pattern = pattern
            .to_str()
            .ok_or_else(|| Error::Custom(format!("invalid source folder: {:?}", src)))?;

        let mut paths = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
        paths.retain(|path| path.is_file());
        paths.sort();
        Ok(paths)
    }

    /// Read, label and normalize the records of a single catalog file.
    pub fn process_file(
        path: &Path,
        labeler: &CategoryLabeler,
        normalizer: &TextNormalizer,
        sampler: &Sampler,
    ) -> Result<Vec<LabeledExample>, Error> {
        let mut rng = sampler.rng_for(path);
        let mut nb_records = 0;
        let mut examples = Vec::new();

        for record in CatalogReader::from_path(path)? {
            let record = record?;
            nb_records += 1;
            if let Some(candidate) = labeler.label(&record, &mut rng) {
                examples.push(candidate.normalize(normalizer));
            }
        }

        debug!(
            "{:?}: {} records, {} examples",
            path,
            nb_records,
            examples.len()
        );
        Ok(examples)
    }

    fn write_stats(path: &Path, summary: &RunSummary) -> Result<(), Error> {
        crate::io::writer::ensure_parent(path)?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, summary)?;
        Ok(())
    }
}

impl Pipeline<RunSummary> for TrainingData {
    fn version() -> &'static str {
        "0.1.0"
    }

    fn run(&self) -> Result<RunSummary, Error> {
        let config = &self.config;
        let paths = self.get_paths()?;
        let nb_files = paths.len();
        if paths.is_empty() {
            warn!(
                "no file matching {:?} in {:?}",
                config.pattern(),
                config.input_directory()
            );
        }
        info!("Writing results to {:?}", config.output_path());

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers().unwrap_or(0))
            .build()?;
        let labeler = CategoryLabeler::from_config(config);
        let normalizer = TextNormalizer::default();
        let sampler = Sampler::new(config.seed());

        let collected = collector::collect(&pool, paths, config.failure_policy(), |path| {
            Self::process_file(path, &labeler, &normalizer, &sampler)
        })?;
        let failed_files: Vec<PathBuf> = collected
            .failures
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        let examples = collected.items;

        // category support
        let frequencies = CategoryFrequencies::count(&examples);
        let top_categories = frequencies.top(config.top_categories());
        for entry in &top_categories {
            info!("{}\t{}", entry.category, entry.count);
        }

        let filter = frequencies.supported(config.min_category_count());
        let nb_kept_categories = filter.categories().map_or(frequencies.len(), |c| c.len());
        let nb_collected = examples.len();
        let examples = filter.apply(examples);
        info!("Total number of records: {}", examples.len());

        let mut writer = LabelWriter::new(config.output_path())?;
        writer.write(examples)?;
        let nb_written = writer.finish()?;

        let summary = RunSummary {
            label_mode: config.label_mode(),
            sample_rate: config.sample_rate(),
            min_category_count: config.min_category_count(),
            nb_files,
            failed_files,
            nb_collected,
            nb_written,
            nb_categories: frequencies.len(),
            nb_kept_categories,
            top_categories,
        };

        if let Some(stats_path) = config.stats_path() {
            debug!("writing run summary to {:?}", stats_path);
            Self::write_stats(stats_path, &summary)?;
        }

        if config.failure_policy() == FailurePolicy::Isolate && !summary.failed_files.is_empty() {
            warn!(
                "{} file(s) could not be processed: {:?}",
                summary.failed_files.len(),
                summary.failed_files
            );
        }

        Ok(summary)
    }
}
