use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while managing a FIFO pair.
#[derive(Debug, thiserror::Error)]
pub enum FifoError {
    /// The private directory for the namespace could not be allocated.
    #[error("failed to allocate private pipe directory: {0}")]
    TempDir(std::io::Error),

    /// A stale object at a leg path could not be removed.
    #[error("failed to remove stale object at {path}: {source}")]
    RemoveStale {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `mkfifo` failed for a leg path.
    #[error("failed to create fifo {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Opening a leg failed.
    #[error("failed to open fifo {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The path exists but is not a named pipe.
    #[error("not a fifo: {path}")]
    NotFifo { path: PathBuf },

    /// The pair was not created by the namespace asked to tear it down.
    #[error("fifo {path} does not belong to namespace {namespace}")]
    ForeignPair { path: PathBuf, namespace: PathBuf },

    /// One or more teardown steps failed. Every step was still attempted.
    #[error("teardown incomplete ({} step(s) failed): {}", .0.len(), TeardownSummary(.0))]
    Teardown(Vec<TeardownFailure>),
}

/// Which teardown step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    CloseInbound,
    CloseOutbound,
    UnlinkInbound,
    UnlinkOutbound,
    RemoveDirectory,
}

impl TeardownStep {
    pub fn as_str(self) -> &'static str {
        match self {
            TeardownStep::CloseInbound => "close inbound",
            TeardownStep::CloseOutbound => "close outbound",
            TeardownStep::UnlinkInbound => "unlink inbound",
            TeardownStep::UnlinkOutbound => "unlink outbound",
            TeardownStep::RemoveDirectory => "remove directory",
        }
    }
}

/// A single failed teardown step.
#[derive(Debug)]
pub struct TeardownFailure {
    pub step: TeardownStep,
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl fmt::Display for TeardownFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.step.as_str(),
            self.path.display(),
            self.source
        )
    }
}

struct TeardownSummary<'a>(&'a [TeardownFailure]);

impl fmt::Display for TeardownSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl FifoError {
    /// The underlying OS error kind, when there is a single one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            FifoError::TempDir(source)
            | FifoError::RemoveStale { source, .. }
            | FifoError::Create { source, .. }
            | FifoError::Open { source, .. } => Some(source.kind()),
            FifoError::NotFifo { .. }
            | FifoError::ForeignPair { .. }
            | FifoError::Teardown(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FifoError>;
