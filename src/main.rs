//! # catalog-corpus
//!
//! Builds fastText supervised training data from product catalog XML dumps,
//! and synonym tables from a trained embedding model.
//!
//! ## Getting started
//!
//! ```sh
//! catalog-corpus 0.1.0
//! training data and synonyms from product catalogs.
//!
//! USAGE:
//!     catalog-corpus <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     corpus      Generate fastText training data from catalog files
//!     help        Prints this message or the help of the given subcommand(s)
//!     synonyms    Generate a synonym table from a trained embedding model
//! ```
//!
use catalog_corpus::cli;
use catalog_corpus::config::Config;
use catalog_corpus::error;
use catalog_corpus::pipelines::{Pipeline, Synonyms, TrainingData};
use structopt::StructOpt;

#[macro_use]
extern crate log;

fn main() -> Result<(), error::Error> {
    env_logger::init();

    let opt = cli::CatalogCorpus::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::CatalogCorpus::Corpus(c) => {
            let config = Config::try_from(c)?;
            let p = TrainingData::new(config);
            let summary = p.run()?;
            info!(
                "{} lines written ({} categories kept out of {})",
                summary.nb_written, summary.nb_kept_categories, summary.nb_categories
            );
        }

        cli::CatalogCorpus::Synonyms(s) => {
            let p = Synonyms::new(s.model, s.words, s.dst)
                .with_threshold(s.threshold)
                .with_k(s.k);
            let nb_rows = p.run()?;
            info!("{} synonym rows written to {:?}", nb_rows, p.dst());
        }
    };
    Ok(())
}
