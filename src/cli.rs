//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

use crate::config::{Config, ConfigBuilder, FailurePolicy, LabelMode};
use crate::error::Error;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "catalog-corpus",
    about = "training data and synonyms from product catalogs."
)]
/// Holds every command that is callable by the `catalog-corpus` command.
pub enum CatalogCorpus {
    #[structopt(about = "Generate fastText training data from catalog files")]
    Corpus(Corpus),
    #[structopt(about = "Generate a synonym table from a trained embedding model")]
    Synonyms(Synonyms),
}

#[derive(Debug, StructOpt)]
/// Training data generation command and parameters.
///
/// ```sh
/// catalog-corpus-corpus 0.1.0
/// Generate fastText training data from catalog files
///
/// USAGE:
///     catalog-corpus corpus [FLAGS] [OPTIONS] <src> <dst>
///
/// FLAGS:
///     -h, --help          Prints help information
///         --keep-going    skip files that can't be processed instead of aborting
///     -V, --version       Prints version information
///
/// ARGS:
///     <src>    folder containing catalog files
///     <dst>    training data file
/// ```
pub struct Corpus {
    #[structopt(parse(from_os_str), help = "folder containing catalog files")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "training data file")]
    pub dst: PathBuf,
    #[structopt(
        long = "label",
        default_value = "id",
        help = "id is default and needed for downstream use, but name is helpful for debugging"
    )]
    pub label: LabelMode,
    #[structopt(
        long = "sample-rate",
        default_value = "1.0",
        help = "The rate at which to sample input"
    )]
    pub sample_rate: f64,
    #[structopt(
        long = "min-products",
        default_value = "0",
        help = "The minimum number of products per category"
    )]
    pub min_products: usize,
    #[structopt(long = "pattern", default_value = "*.xml", help = "catalog file pattern")]
    pub pattern: String,
    #[structopt(short = "t", help = "number of worker threads. Default is the number of cores.")]
    pub n_threads: Option<usize>,
    #[structopt(long = "seed", help = "seed for reproducible sampling")]
    pub seed: Option<u64>,
    #[structopt(
        long = "keep-going",
        help = "skip files that can't be processed instead of aborting"
    )]
    pub keep_going: bool,
    #[structopt(
        long = "top",
        default_value = "20",
        help = "number of largest categories to report"
    )]
    pub top: usize,
    #[structopt(parse(from_os_str), long = "stats", help = "write a JSON run summary")]
    pub stats: Option<PathBuf>,
}

impl Corpus {
    fn builder(&self) -> ConfigBuilder {
        let mut builder = Config::builder(self.src.clone(), self.dst.clone());
        builder
            .pattern(&self.pattern)
            .label_mode(self.label)
            .sample_rate(self.sample_rate)
            .min_category_count(self.min_products)
            .top_categories(self.top);

        if let Some(n) = self.n_threads {
            builder.workers(n);
        }
        if let Some(seed) = self.seed {
            builder.seed(seed);
        }
        if self.keep_going {
            builder.failure_policy(FailurePolicy::Isolate);
        }
        if let Some(stats) = &self.stats {
            builder.stats_path(stats.clone());
        }
        builder
    }
}

impl TryFrom<Corpus> for Config {
    type Error = Error;

    fn try_from(c: Corpus) -> Result<Self, Self::Error> {
        c.builder().build()
    }
}

#[derive(Debug, StructOpt)]
/// Synonym generation command and parameters.
pub struct Synonyms {
    #[structopt(parse(from_os_str), help = "trained fastText model (.bin)")]
    pub model: PathBuf,
    #[structopt(parse(from_os_str), help = "seed words, one per line")]
    pub words: PathBuf,
    #[structopt(parse(from_os_str), help = "synonym table destination")]
    pub dst: PathBuf,
    #[structopt(
        long = "threshold",
        default_value = "0.75",
        help = "minimum (exclusive) similarity"
    )]
    pub threshold: f32,
    #[structopt(short = "k", default_value = "10", help = "number of neighbors to look up")]
    pub k: usize,
}
