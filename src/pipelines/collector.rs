/*! Parallel per-file processing.

Runs a processing function on every file of a list on a rayon thread pool, one task per file,
and merges the per-file results into a single, unordered collection.

Each file gives a [FileOutcome]. Depending on the [FailurePolicy],
a failing file either aborts the whole collection or is set aside and reported.
!*/
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{error, info};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::FailurePolicy;
use crate::error::Error;

/// Result of the processing of a single file.
#[derive(Debug)]
pub enum FileOutcome<T> {
    Done { path: PathBuf, items: Vec<T> },
    Failed { path: PathBuf, error: Error },
}

impl<T> FileOutcome<T> {
    fn new(path: PathBuf, result: Result<Vec<T>, Error>) -> Self {
        match result {
            Ok(items) => FileOutcome::Done { path, items },
            Err(error) => FileOutcome::Failed { path, error },
        }
    }

    /// Convert into a [Result], tagging errors with the file path.
    pub fn into_result(self) -> Result<Vec<T>, Error> {
        match self {
            FileOutcome::Done { items, .. } => Ok(items),
            FileOutcome::Failed { path, error } => Err(Error::InputFile {
                path,
                source: Box::new(error),
            }),
        }
    }
}

/// Merged items of every successful file, along with failed files.
///
/// Items are not in file order.
#[derive(Debug)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub failures: Vec<(PathBuf, Error)>,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> Collected<T> {
    fn absorb(mut self, outcome: FileOutcome<T>) -> Self {
        match outcome {
            FileOutcome::Done { mut items, .. } => self.items.append(&mut items),
            FileOutcome::Failed { path, error } => self.failures.push((path, error)),
        }
        self
    }

    fn merge(mut self, mut other: Self) -> Self {
        self.items.append(&mut other.items);
        self.failures.append(&mut other.failures);
        self
    }
}

/// `[done/total] path (n examples)`
fn progress_line(nb_done: usize, total: usize, path: &Path, nb_examples: usize) -> String {
    format!("[{}/{}] {:?} ({} examples)", nb_done, total, path, nb_examples)
}

/// Process `paths` on `pool` with `process`, and merge results.
///
/// # Errors
/// With [FailurePolicy::FailFast], the first failing file is returned as an [Error::InputFile].
/// Files that are not yet being processed are skipped.
pub fn collect<T, F>(
    pool: &ThreadPool,
    paths: Vec<PathBuf>,
    policy: FailurePolicy,
    process: F,
) -> Result<Collected<T>, Error>
where
    T: Send,
    F: Fn(&Path) -> Result<Vec<T>, Error> + Sync,
{
    let total = paths.len();
    let done = AtomicUsize::new(0);

    // one task per file, reporting progress as files complete.
    let run_one = |path: PathBuf| {
        let result = process(&path);
        let nb_done = done.fetch_add(1, Ordering::Relaxed) + 1;
        match &result {
            Ok(items) => info!("{}", progress_line(nb_done, total, &path, items.len())),
            Err(e) => error!("[{}/{}] {:?} failed: {}", nb_done, total, path, e),
        }
        FileOutcome::new(path, result)
    };

    pool.install(|| match policy {
        FailurePolicy::FailFast => {
            let items = paths
                .into_par_iter()
                .map(run_one)
                .map(FileOutcome::into_result)
                .try_fold(Vec::new, |mut acc, items: Result<Vec<T>, Error>| {
                    acc.append(&mut items?);
                    Ok::<_, Error>(acc)
                })
                .try_reduce(Vec::new, |mut left, mut right| {
                    left.append(&mut right);
                    Ok(left)
                })?;

            Ok(Collected {
                items,
                failures: Vec::new(),
            })
        }
        FailurePolicy::Isolate => {
            let collected = paths
                .into_par_iter()
                .map(run_one)
                .fold(Collected::default, Collected::absorb)
                .reduce(Collected::default, Collected::merge);

            for (path, e) in &collected.failures {
                error!("skipped {:?}: {}", path, e);
            }
            Ok(collected)
        }
    })
}

#[cfg(test)]
mod tests {
    use rayon::ThreadPoolBuilder;

    use super::*;

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(4).build().unwrap()
    }

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("{}.xml", i))).collect()
    }

    // each file yields as many items as its number
    fn process(path: &Path) -> Result<Vec<usize>, Error> {
        let n: usize = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::Custom(format!("bad name {:?}", path)))?;
        if n == 13 {
            return Err(Error::MalformedInput {
                path: path.to_path_buf(),
                reason: "unlucky".to_string(),
            });
        }
        Ok(vec![n; n])
    }

    #[test]
    fn merges_everything() {
        let c = collect(&pool(), paths(10), FailurePolicy::FailFast, process).unwrap();
        assert_eq!(c.items.len(), (0..10).sum::<usize>());
        assert!(c.failures.is_empty());

        let mut items = c.items;
        items.sort_unstable();
        let mut expected: Vec<usize> = (0..10).flat_map(|n| vec![n; n]).collect();
        expected.sort_unstable();
        assert_eq!(items, expected);
    }

    #[test]
    fn progress_format() {
        assert_eq!(
            progress_line(3, 12, Path::new("products_0003.xml"), 42),
            "[3/12] \"products_0003.xml\" (42 examples)"
        );
    }

    #[test]
    fn no_files() {
        let c = collect(&pool(), Vec::new(), FailurePolicy::FailFast, process).unwrap();
        assert!(c.items.is_empty());
    }

    #[test]
    fn fail_fast() {
        let res = collect(&pool(), paths(20), FailurePolicy::FailFast, process);
        match res {
            Err(Error::InputFile { path, source }) => {
                assert_eq!(path, PathBuf::from("13.xml"));
                assert!(matches!(*source, Error::MalformedInput { .. }));
            }
            other => panic!("expected an input file error, got {:?}", other),
        }
    }

    #[test]
    fn isolate() {
        let c = collect(&pool(), paths(20), FailurePolicy::Isolate, process).unwrap();
        assert_eq!(c.items.len(), (0..20).sum::<usize>() - 13);
        assert_eq!(c.failures.len(), 1);
        assert_eq!(c.failures[0].0, PathBuf::from("13.xml"));
    }
}
