use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, RawFd};
use std::time::Duration;

use crate::readiness::{wait_fd, Interest, Readiness};

/// The reading end of a leg, opened non-blocking.
pub struct FifoReader {
    file: File,
}

/// The writing end of a leg, opened non-blocking.
pub struct FifoWriter {
    file: File,
}

impl FifoReader {
    pub(crate) fn from_file(file: File) -> Self {
        Self { file }
    }

    /// Close the handle, reporting any error from `close(2)`.
    pub fn close(self) -> io::Result<()> {
        close_file(self.file)
    }
}

impl FifoWriter {
    pub(crate) fn from_file(file: File) -> Self {
        Self { file }
    }

    /// Close the handle, reporting any error from `close(2)`.
    pub fn close(self) -> io::Result<()> {
        close_file(self.file)
    }
}

fn close_file(file: File) -> io::Result<()> {
    let fd = file.into_raw_fd();
    // SAFETY: `fd` was just released from an owning `File`, so this is the
    // only close of that descriptor.
    let rc = unsafe { libc::close(fd) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

impl Read for FifoReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FifoWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Readiness for FifoReader {
    fn wait_ready(&self, interest: Interest, timeout: Option<Duration>) -> io::Result<bool> {
        wait_fd(self.file.as_fd(), interest, timeout)
    }
}

impl Readiness for FifoWriter {
    fn wait_ready(&self, interest: Interest, timeout: Option<Duration>) -> io::Result<bool> {
        wait_fd(self.file.as_fd(), interest, timeout)
    }
}

impl AsFd for FifoReader {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl AsFd for FifoWriter {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl AsRawFd for FifoReader {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl AsRawFd for FifoWriter {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl std::fmt::Debug for FifoReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoReader")
            .field("fd", &self.file.as_raw_fd())
            .finish()
    }
}

impl std::fmt::Debug for FifoWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoWriter")
            .field("fd", &self.file.as_raw_fd())
            .finish()
    }
}
