use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the counting and filtration engine.
pub enum ExtractError {
    /// One or more input paths are not readable files.
    #[error("invalid input path(s): {}", display_paths(.paths))]
    InvalidInput { paths: Vec<PathBuf> },
    /// Filtration needs either a reference sketch or previously extracted errors.
    ///
    /// This is the invalid-input case of filtration setup; construction-time
    /// path failures are [`ExtractError::InvalidInput`]. Use
    /// [`ExtractError::is_invalid_input`] to match both.
    #[error(
        "no error hashes available: reference {} is not a readable file and no errors were extracted",
        .reference.display()
    )]
    NoErrorHashes { reference: PathBuf },
    /// Malformed sketch document.
    #[error("failed to parse sketch {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// I/O error on a specific file.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed line in a counts dump.
    #[error("invalid counts dump {} at line {line}: {reason}", .path.display())]
    DumpFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    /// Work-stealing pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ExtractError {
    /// True for [`ExtractError::InvalidInput`] and [`ExtractError::NoErrorHashes`].
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ExtractError::InvalidInput { .. } | ExtractError::NoErrorHashes { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
