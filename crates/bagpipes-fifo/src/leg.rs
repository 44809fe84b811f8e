//! Leg naming and the fixed access-mode policy.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use crate::error::{FifoError, Result};

/// One direction of a pipe pair, named from the creator's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    In,
    Out,
}

impl Leg {
    /// Suffix used in the leg's file name.
    pub fn suffix(self) -> &'static str {
        match self {
            Leg::In => "in",
            Leg::Out => "out",
        }
    }

    /// `{dir}/{prefix}_{identity}_{leg}`
    pub fn path_in(self, dir: &Path, prefix: &str, identity: &str) -> PathBuf {
        dir.join(format!("{prefix}_{identity}_{}", self.suffix()))
    }
}

/// Open flags for one side of a leg. `O_NONBLOCK` is always added on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessMode {
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub sync: bool,
}

impl AccessMode {
    /// Inbound handles are read-only.
    pub const INBOUND: AccessMode = AccessMode {
        read: true,
        write: false,
        create: false,
        sync: false,
    };

    /// Outbound handles are synchronous read-write with create-if-missing.
    ///
    /// Holding the read side as well keeps the pipe open for writing even
    /// before the peer attaches, so a non-blocking open never fails with
    /// `ENXIO`.
    pub const OUTBOUND: AccessMode = AccessMode {
        read: true,
        write: true,
        create: true,
        sync: true,
    };

    fn custom_flags(self) -> libc::c_int {
        let mut flags = libc::O_NONBLOCK;
        if self.sync {
            flags |= libc::O_SYNC;
        }
        flags
    }

    /// Open `path` with this mode, non-blocking.
    pub fn open(self, path: &Path) -> Result<File> {
        OpenOptions::new()
            .read(self.read)
            .write(self.write)
            .create(self.create)
            .custom_flags(self.custom_flags())
            .open(path)
            .map_err(|source| FifoError::Open {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Fail unless `path` currently names a FIFO.
pub fn ensure_fifo(path: &Path) -> Result<()> {
    let metadata = std::fs::symlink_metadata(path).map_err(|source| FifoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.file_type().is_fifo() {
        Ok(())
    } else {
        Err(FifoError::NotFifo {
            path: path.to_path_buf(),
        })
    }
}

/// Create a FIFO at `path` with permission bits `mode` (subject to umask).
pub fn make_fifo(path: &Path, mode: u32) -> Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| FifoError::Create {
        path: path.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::InvalidInput,
            "path contains an interior NUL byte",
        ),
    })?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
    if rc != 0 {
        return Err(FifoError::Create {
            path: path.to_path_buf(),
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leg_paths_follow_naming_convention() {
        let dir = Path::new("/tmp/bagpipes-x");
        assert_eq!(
            Leg::In.path_in(dir, "worker", "7"),
            PathBuf::from("/tmp/bagpipes-x/worker_7_in")
        );
        assert_eq!(
            Leg::Out.path_in(dir, "worker", "7"),
            PathBuf::from("/tmp/bagpipes-x/worker_7_out")
        );
    }

    #[test]
    fn make_fifo_and_open_both_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leg");
        make_fifo(&path, 0o600).unwrap();
        ensure_fifo(&path).unwrap();

        let _reader = AccessMode::INBOUND.open(&path).unwrap();
        let _writer = AccessMode::OUTBOUND.open(&path).unwrap();
    }

    #[test]
    fn make_fifo_fails_when_path_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken");
        std::fs::write(&path, b"x").unwrap();

        let err = make_fifo(&path, 0o600).unwrap_err();
        assert!(matches!(err, FifoError::Create { .. }));
    }

    #[test]
    fn ensure_fifo_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain");
        std::fs::write(&path, b"x").unwrap();

        let err = ensure_fifo(&path).unwrap_err();
        assert!(matches!(err, FifoError::NotFifo { .. }));
    }

    #[test]
    fn ensure_fifo_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_fifo(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, FifoError::Open { .. }));
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
    }
}
