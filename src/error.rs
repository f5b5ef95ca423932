//! Error enum
use std::path::PathBuf;

#[derive(Debug)]
#[allow(dead_code)]
pub enum Error {
    Io(std::io::Error),
    /// A catalog file that is not well-formed.
    MalformedInput {
        path: PathBuf,
        reason: String,
    },
    /// Any failure that happened while processing a given input file.
    InputFile {
        path: PathBuf,
        source: Box<Error>,
    },
    Config(String),
    Custom(String),
    Serde(serde_json::Error),
    Csv(csv::Error),
    Glob(glob::GlobError),
    GlobPattern(glob::PatternError),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl Error {
    /// Path of the input file that caused the error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Error::MalformedInput { path, .. } | Error::InputFile { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedInput { path, reason } => {
                write!(f, "malformed input {:?}: {}", path, reason)
            }
            Error::InputFile { path, source } => write!(f, "{:?}: {}", path, source),
            Error::Config(msg) => write!(f, "invalid configuration: {}", msg),
            Error::Custom(msg) => write!(f, "{}", msg),
            other => write!(f, "{:?}", other),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Error {
        Error::Glob(e)
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Error {
        Error::GlobPattern(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<csv::Error> for Error {
    fn from(v: csv::Error) -> Self {
        Self::Csv(v)
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(v: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(v)
    }
}
