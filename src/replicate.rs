//! Reading simulator output: one delimited text file per replicate run.
//!
//! Each file starts with a metadata row that is discarded, followed by a header row and
//! the per-agent records.  The exit tick of every agent lives in the column labelled
//! [TICK_COLUMN], whose label carries the simulator's own leading and trailing spaces and is
//! matched literally.
use crate::errors::TransitError;
use crate::sweep::Collector;
use crate::utils;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Header label of the exit-tick column, spaces included.
pub const TICK_COLUMN: &str = "  turtle_die_tick ";

/// Extension of replicate files written by the simulator.
pub const EXTENSION: &str = "txt";

/// Exit ticks read from a single replicate file.
#[derive(Debug, Clone, PartialEq)]
pub struct Replicate {
    path: PathBuf,
    ticks: Vec<f64>,
}

impl Replicate {
    /// Read the [TICK_COLUMN] of the replicate file at `path`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, TransitError> {
        Replicate::read_column(path, TICK_COLUMN)
    }

    /// Read the column labelled exactly `column` from the replicate file at `path`.
    /// The first row is skipped, the second row is the header, every later row is data.
    pub fn read_column<P: AsRef<Path>>(path: P, column: &str) -> Result<Self, TransitError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| TransitError::io(path, e))?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = rdr.records();
        // metadata row
        match records.next() {
            Some(row) => {
                row.map_err(|e| utils::with_path(e, path))?;
            }
            None => return Err(TransitError::parse(path, "file is empty")),
        }
        let header = match records.next() {
            Some(row) => row.map_err(|e| utils::with_path(e, path))?,
            None => return Err(TransitError::parse(path, "missing header row")),
        };
        let idx = header
            .iter()
            .position(|label| label == column)
            .ok_or_else(|| TransitError::parse(path, format!("missing column {:?}", column)))?;

        let mut ticks = Vec::new();
        for (i, row) in records.enumerate() {
            let row = row.map_err(|e| utils::with_path(e, path))?;
            // rows are numbered from the top of the file, 1-based
            let line = i + 3;
            let field = row.get(idx).ok_or_else(|| {
                TransitError::parse(path, format!("row {} has no field {}", line, idx))
            })?;
            let tick = field.trim().parse::<f64>().map_err(|_| {
                TransitError::parse(path, format!("row {}: {:?} is not a number", line, field))
            })?;
            ticks.push(tick);
        }
        debug!("Read {} ticks from {}.", ticks.len(), path.display());

        Ok(Replicate {
            path: path.to_path_buf(),
            ticks,
        })
    }

    /// Build a replicate from ticks already in memory.
    pub fn from_ticks<P: Into<PathBuf>>(path: P, ticks: Vec<f64>) -> Self {
        Replicate {
            path: path.into(),
            ticks,
        }
    }

    /// File the ticks were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exit ticks in file order.
    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// True if the file held a header but no observations.
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Mean transit time of this replicate.
    pub fn mean(&self) -> Result<f64, TransitError> {
        if self.ticks.is_empty() {
            return Err(TransitError::EmptyInputError(format!(
                "no observations in {}",
                self.path.display()
            )));
        }
        Ok(utils::mean(&self.ticks))
    }
}

/// List the files in `dir` ending in `.extension`, sorted by path.
/// Subdirectories are not searched.
pub fn discover<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>, TransitError> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| TransitError::io(dir, e))? {
        let path = entry.map_err(|e| TransitError::io(dir, e))?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read every replicate file in `dir` using the default [Collector].
/// Fails with `EmptyInputError` if the directory holds no replicate files.
pub fn ingest<P: AsRef<Path>>(dir: P) -> Result<Vec<Replicate>, TransitError> {
    Collector::new().ingest(dir)
}

/// Reduce each replicate to its mean transit time, preserving order.
pub fn summarize(replicates: &[Replicate]) -> Result<Vec<f64>, TransitError> {
    replicates.iter().map(|r| r.mean()).collect()
}
