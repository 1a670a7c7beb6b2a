//! Aggregating replicate means across a parameter sweep.
//!
//! The simulator writes one folder of replicate files per parameter setting.  A [Collector]
//! turns a list of parameter values plus a resolver (parameter value to folder) into an
//! [Aggregation], or a [Sweep] when the folders are keyed by two parameters.  Every key gets
//! its own `Result`, so a folder that failed to read never looks like a folder with no runs.
use crate::errors::TransitError;
use crate::replicate::{self, Replicate, EXTENSION, TICK_COLUMN};
use crate::utils;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Parameter value used as a map key, ordered by `f64::total_cmp` with `-0.0` equal to `0.0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Param(pub f64);

fn unsigned_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Param {}

impl PartialOrd for Param {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Param {
    fn cmp(&self, other: &Self) -> Ordering {
        unsigned_zero(self.0).total_cmp(&unsigned_zero(other.0))
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", unsigned_zero(self.0))
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param(unsigned_zero(value))
    }
}

/// Mean transit times of every replicate found for one key, or why they could not be read.
pub type Series = Result<Vec<f64>, TransitError>;

/// Folder naming of the simulator's output tree: `root/Vout=<outflow>/Diff=<diffusion>`.
///
/// # Examples
///
/// ```rust
/// use transits::prelude::*;
/// use std::path::PathBuf;
///
/// let layout = Layout::new("/data/CorrelationData");
/// assert_eq!(
///     layout.sweep_dir(100.0, 0.015),
///     PathBuf::from("/data/CorrelationData/Vout=100/Diff=0.015")
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    root: PathBuf,
    outer: String,
    inner: String,
}

impl Layout {
    /// Layout rooted at `root` with the default `Vout=` and `Diff=` folder prefixes.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Layout {
            root: root.into(),
            outer: "Vout=".to_string(),
            inner: "Diff=".to_string(),
        }
    }

    /// Set the folder prefix of the outflow volume level.
    pub fn outer_prefix(mut self, prefix: &str) -> Self {
        self.outer = prefix.to_string();
        self
    }

    /// Set the folder prefix of the diffusion constant level.
    pub fn inner_prefix(mut self, prefix: &str) -> Self {
        self.inner = prefix.to_string();
        self
    }

    /// Root of the output tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding every diffusion constant run at outflow volume `outflow`.
    pub fn outer_dir(&self, outflow: f64) -> PathBuf {
        self.root.join(format!("{}{}", self.outer, Param::from(outflow)))
    }

    /// Folder of diffusion constant `diffusion` directly under the root.
    pub fn inner_dir(&self, diffusion: f64) -> PathBuf {
        self.root.join(format!("{}{}", self.inner, Param::from(diffusion)))
    }

    /// Folder of the replicates run at `outflow` and `diffusion`.
    pub fn sweep_dir(&self, outflow: f64, diffusion: f64) -> PathBuf {
        self.outer_dir(outflow).join(format!("{}{}", self.inner, Param::from(diffusion)))
    }
}

/// Box plot statistics of the replicate means stored under one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Outer key (outflow volume) when the summary comes from a [Sweep].
    pub group: Option<f64>,
    /// Parameter value (diffusion constant).
    pub key: f64,
    /// Number of replicates.
    pub replicates: usize,
    /// Mean of the replicate means.
    pub mean: f64,
    /// Median of the replicate means.
    pub median: f64,
    /// 25th percentile.
    pub lower_quartile: f64,
    /// 75th percentile.
    pub upper_quartile: f64,
    /// Smallest replicate mean.
    pub min: f64,
    /// Largest replicate mean.
    pub max: f64,
}

impl Summary {
    /// Summarize `means`, or `None` if there are no replicates to summarize.
    pub fn from_means(group: Option<f64>, key: f64, means: &[f64]) -> Option<Self> {
        if means.is_empty() {
            return None;
        }
        Some(Summary {
            group,
            key,
            replicates: means.len(),
            mean: utils::mean(means),
            median: utils::median(means),
            lower_quartile: utils::percentile(means, 0.25),
            upper_quartile: utils::percentile(means, 0.75),
            min: means.iter().cloned().fold(f64::INFINITY, f64::min),
            max: means.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Replicate means keyed by a single parameter.
#[derive(Debug, Default)]
pub struct Aggregation {
    series: BTreeMap<Param, Series>,
}

impl Aggregation {
    /// Series stored under `key`.
    pub fn get(&self, key: f64) -> Option<&Series> {
        self.series.get(&Param::from(key))
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Vec<f64> {
        self.series.keys().map(|k| k.0).collect()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True if no keys were aggregated.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Iterate over keys and their series in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &Series)> {
        self.series.iter().map(|(k, v)| (k.0, v))
    }

    /// Keys that could not be aggregated, with the reason.
    pub fn failures(&self) -> Vec<(f64, &TransitError)> {
        self.iter()
            .filter_map(|(k, v)| v.as_ref().err().map(|e| (k, e)))
            .collect()
    }

    /// Box plot statistics for every key with at least one replicate.
    pub fn summaries(&self) -> Vec<Summary> {
        self.grouped_summaries(None)
    }

    fn grouped_summaries(&self, group: Option<f64>) -> Vec<Summary> {
        self.iter()
            .filter_map(|(k, v)| match v {
                Ok(means) => Summary::from_means(group, k, means),
                Err(_) => None,
            })
            .collect()
    }

    /// Key with the smallest median replicate mean, and that median.
    pub fn min_median(&self) -> Option<(f64, f64)> {
        self.summaries()
            .into_iter()
            .map(|s| (s.key, s.median))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Write the replicate means to csv, one row per key and one column per replicate.
    /// Failed keys are left out.
    pub fn record<P: AsRef<Path>>(&self, path: P) -> Result<(), TransitError> {
        let path = path.as_ref();
        let width = self
            .series
            .values()
            .filter_map(|v| v.as_ref().ok().map(|m| m.len()))
            .max()
            .unwrap_or(0);
        let mut wtr = csv::Writer::from_path(path).map_err(|e| utils::with_path(e, path))?;
        let mut header = vec!["key".to_string()];
        header.extend((0..width).map(|i| format!("replicate_{}", i)));
        wtr.write_record(&header).map_err(|e| utils::with_path(e, path))?;
        for (key, series) in self.iter() {
            let means = match series {
                Ok(means) => means,
                Err(e) => {
                    warn!("Leaving key {} out of {}: {}", key, path.display(), e);
                    continue;
                }
            };
            let mut row = vec![key.to_string()];
            row.extend(means.iter().map(|m| m.to_string()));
            row.resize(width + 1, String::new());
            wtr.write_record(&row).map_err(|e| utils::with_path(e, path))?;
        }
        wtr.flush().map_err(|e| TransitError::io(path, e))?;
        Ok(())
    }

    /// Take the underlying map.
    pub fn into_inner(self) -> BTreeMap<Param, Series> {
        self.series
    }
}

/// Replicate means keyed by outflow volume, then diffusion constant.
#[derive(Debug, Default)]
pub struct Sweep {
    groups: BTreeMap<Param, Aggregation>,
}

impl Sweep {
    /// Aggregation stored under outer key `outflow`.
    pub fn get(&self, outflow: f64) -> Option<&Aggregation> {
        self.groups.get(&Param::from(outflow))
    }

    /// Outer keys in ascending order.
    pub fn keys(&self) -> Vec<f64> {
        self.groups.keys().map(|k| k.0).collect()
    }

    /// Number of outer keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if no outer keys were aggregated.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over outer keys and their aggregations.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &Aggregation)> {
        self.groups.iter().map(|(k, v)| (k.0, v))
    }

    /// Failed (outer, inner) pairs with the reason.
    pub fn failures(&self) -> Vec<(f64, f64, &TransitError)> {
        self.iter()
            .flat_map(|(o, agg)| agg.failures().into_iter().map(move |(k, e)| (o, k, e)))
            .collect()
    }

    /// Box plot statistics for every pair with at least one replicate, tagged with the outer key.
    pub fn summaries(&self) -> Vec<Summary> {
        self.iter()
            .flat_map(|(o, agg)| agg.grouped_summaries(Some(o)))
            .collect()
    }

    /// For each outer key, the inner key with the smallest median and that median.
    pub fn min_medians(&self) -> Vec<(f64, f64, f64)> {
        self.iter()
            .filter_map(|(o, agg)| agg.min_median().map(|(k, m)| (o, k, m)))
            .collect()
    }

    /// Take the underlying map.
    pub fn into_inner(self) -> BTreeMap<Param, Aggregation> {
        self.groups
    }
}

/// Time budget and cancellation flag shared by every task of one ingestion run.
#[derive(Debug, Default)]
struct Guard {
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Guard {
    fn check(&self) -> Result<(), TransitError> {
        if let Some(flag) = &self.cancel {
            if flag.load(AtomicOrdering::Relaxed) {
                return Err(TransitError::Interrupted("cancelled".to_string()));
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(TransitError::Interrupted("time budget exceeded".to_string()));
            }
        }
        Ok(())
    }
}

/// Ingestion settings, built with a builder pattern.
///
/// # Examples
///
/// ```rust
/// use transits::prelude::*;
/// use std::time::Duration;
///
/// let collector = Collector::new()
///     .extension("txt")
///     .sparse(false)
///     .threads(4)
///     .duration(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct Collector {
    extension: String,
    column: String,
    sparse: bool,
    threads: Option<usize>,
    duration: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for Collector {
    fn default() -> Self {
        Collector::new()
    }
}

impl Collector {
    /// Reads `.txt` files, column [TICK_COLUMN], keeps empty folders as empty series,
    /// uses the global rayon pool and runs without a time limit.
    pub fn new() -> Self {
        Collector {
            extension: EXTENSION.to_string(),
            column: TICK_COLUMN.to_string(),
            sparse: true,
            threads: None,
            duration: None,
            cancel: None,
        }
    }

    /// Extension of replicate files, without the dot.
    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    /// Header label of the column to read, matched exactly.
    pub fn column(mut self, column: &str) -> Self {
        self.column = column.to_string();
        self
    }

    /// If true, a folder with no replicate files yields an empty series.
    /// If false, it yields an `EmptyInputError` for that key.
    pub fn sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    /// Run on a dedicated pool of `threads` workers.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Stop reading files once `duration` has passed since the run started.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Stop reading files once `flag` is set.
    pub fn cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn guard(&self) -> Guard {
        Guard {
            // a budget too large to represent is no budget
            deadline: self.duration.and_then(|d| Instant::now().checked_add(d)),
            cancel: self.cancel.clone(),
        }
    }

    fn run<T, OP>(&self, op: OP) -> Result<T, TransitError>
    where
        T: Send,
        OP: FnOnce() -> T + Send,
    {
        match self.threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                Ok(pool.install(op))
            }
            None => Ok(op()),
        }
    }

    /// Read every replicate file in `dir`.
    /// Fails with `EmptyInputError` if the directory holds no replicate files.
    pub fn ingest<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<Replicate>, TransitError> {
        let dir = dir.as_ref();
        let guard = self.guard();
        self.run(|| -> Result<Vec<Replicate>, TransitError> {
            let files = replicate::discover(dir, &self.extension)?;
            if files.is_empty() {
                return Err(self.no_files(dir));
            }
            self.read_all(&files, &guard)
        })?
    }

    fn no_files(&self, dir: &Path) -> TransitError {
        TransitError::EmptyInputError(format!(
            "no .{} files in {}",
            self.extension,
            dir.display()
        ))
    }

    fn read_all(&self, files: &[PathBuf], guard: &Guard) -> Result<Vec<Replicate>, TransitError> {
        files
            .par_iter()
            .map(|path| {
                guard.check()?;
                Replicate::read_column(path, &self.column)
            })
            .collect()
    }

    fn collect_key(&self, dir: &Path, guard: &Guard) -> Series {
        guard.check()?;
        let files = replicate::discover(dir, &self.extension)?;
        if files.is_empty() {
            if self.sparse {
                warn!("No replicate files in {}, keeping an empty series.", dir.display());
                return Ok(Vec::new());
            }
            return Err(self.no_files(dir));
        }
        let replicates = self.read_all(&files, guard)?;
        replicate::summarize(&replicates)
    }

    fn aggregate<F>(&self, keys: &[f64], resolve: F, guard: &Guard) -> Aggregation
    where
        F: Fn(f64) -> PathBuf + Sync,
    {
        let series = keys
            .par_iter()
            .map(|&key| {
                let dir = resolve(key);
                let series = self.collect_key(&dir, guard);
                match &series {
                    Ok(means) => info!(
                        "Key {}: {} replicates from {}.",
                        key,
                        means.len(),
                        dir.display()
                    ),
                    Err(e) => warn!("Key {} failed: {}", key, e),
                }
                (Param::from(key), series)
            })
            .collect();
        Aggregation { series }
    }

    /// Mean transit time of every replicate, keyed by parameter.
    /// `resolve` maps a parameter value to the folder holding its replicates.
    pub fn by_parameter<F>(&self, keys: &[f64], resolve: F) -> Result<Aggregation, TransitError>
    where
        F: Fn(f64) -> PathBuf + Sync,
    {
        let guard = self.guard();
        self.run(|| self.aggregate(keys, &resolve, &guard))
    }

    /// Mean transit time of every replicate, keyed by `outer` then `inner` parameter.
    /// `resolve` maps an (outer, inner) pair to the folder holding its replicates.
    pub fn by_two_parameters<F>(
        &self,
        outer: &[f64],
        inner: &[f64],
        resolve: F,
    ) -> Result<Sweep, TransitError>
    where
        F: Fn(f64, f64) -> PathBuf + Sync,
    {
        let guard = self.guard();
        self.run(|| self.sweep(outer, inner, &resolve, &guard))
    }

    fn sweep<F>(&self, outer: &[f64], inner: &[f64], resolve: &F, guard: &Guard) -> Sweep
    where
        F: Fn(f64, f64) -> PathBuf + Sync,
    {
        let groups = outer
            .par_iter()
            .map(|&o| (Param::from(o), self.aggregate(inner, |d| resolve(o, d), guard)))
            .collect();
        Sweep { groups }
    }
}

/// Aggregate `keys` with the default [Collector].
pub fn aggregate_by_parameter<F>(keys: &[f64], resolve: F) -> Aggregation
where
    F: Fn(f64) -> PathBuf + Sync,
{
    let collector = Collector::new();
    collector.aggregate(keys, resolve, &collector.guard())
}

/// Aggregate every (outer, inner) pair with the default [Collector].
pub fn aggregate_by_two_parameters<F>(outer: &[f64], inner: &[f64], resolve: F) -> Sweep
where
    F: Fn(f64, f64) -> PathBuf + Sync,
{
    let collector = Collector::new();
    collector.sweep(outer, inner, &resolve, &collector.guard())
}
