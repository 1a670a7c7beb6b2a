//! Error type shared by the ingestion and theory modules.
use std::path::PathBuf;

/// Custom error type for the transits crate.
#[derive(Debug)]
pub enum TransitError {
    /// Directory or file could not be read.
    IoError {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error from std::io.
        source: std::io::Error,
    },
    /// File could be read but its contents are not a valid replicate.
    ParseError {
        /// Offending file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },
    /// A statistic was requested over zero values.
    EmptyInputError(String),
    /// Arguments outside the domain of a theoretical formula.
    DomainError(String),
    /// Ingestion ran past its time budget or was cancelled.
    Interrupted(String),
    /// Error type from rayon when building a bounded thread pool.
    PoolError(String),
}

impl std::error::Error for TransitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransitError::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransitError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TransitError::IoError { path, source } => {
                write!(f, "Could not read {}: {}", path.display(), source)
            }
            TransitError::ParseError { path, reason } => {
                write!(f, "Could not parse {}: {}", path.display(), reason)
            }
            TransitError::EmptyInputError(msg) => write!(f, "Empty input: {}", msg),
            TransitError::DomainError(msg) => write!(f, "Invalid argument: {}", msg),
            TransitError::Interrupted(msg) => write!(f, "Ingestion interrupted: {}", msg),
            TransitError::PoolError(msg) => write!(f, "Could not build thread pool: {}", msg),
        }
    }
}

impl TransitError {
    /// Attach a path to an I/O error.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        TransitError::IoError {
            path: path.into(),
            source,
        }
    }

    /// Build a parse error for the file at `path`.
    pub fn parse<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        TransitError::ParseError {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for TransitError {
    fn from(e: std::io::Error) -> Self {
        TransitError::io(PathBuf::new(), e)
    }
}

impl From<csv::Error> for TransitError {
    fn from(e: csv::Error) -> Self {
        let path = PathBuf::new();
        match e.into_kind() {
            csv::ErrorKind::Io(source) => TransitError::io(path, source),
            kind => TransitError::parse(path, format!("{:?}", kind)),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for TransitError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        TransitError::PoolError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_errors_keep_path_and_source() {
        let err = TransitError::io(
            "runs/Vout=100",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("runs/Vout=100"));
        assert!(err.source().is_some());
    }

    #[test]
    fn domain_errors_have_no_source() {
        let err = TransitError::DomainError("inflow equals outflow".to_string());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "Invalid argument: inflow equals outflow");
    }
}
