pub mod catalog;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod filtering;
pub mod io;
pub mod labeler;
pub mod normalizer;
pub mod pipelines;
