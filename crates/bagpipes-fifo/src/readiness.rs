//! Readiness checks over raw descriptors.
//!
//! A readiness check blocks the caller until a handle can be read from or
//! written to without transferring any data itself. `None` as a timeout waits
//! forever.

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::time::Duration;

/// The direction a readiness check waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Readable,
    Writable,
}

/// Something whose readiness for I/O can be awaited.
///
/// Returns `Ok(true)` once ready (hang-up and error conditions count as
/// ready, so the following I/O call reports them), `Ok(false)` if the timeout
/// elapsed first.
pub trait Readiness {
    fn wait_ready(&self, interest: Interest, timeout: Option<Duration>) -> io::Result<bool>;
}

/// Wait on a single descriptor with `poll(2)`.
pub fn wait_fd(
    fd: BorrowedFd<'_>,
    interest: Interest,
    timeout: Option<Duration>,
) -> io::Result<bool> {
    let events = match interest {
        Interest::Readable => libc::POLLIN,
        Interest::Writable => libc::POLLOUT,
    };
    let mut pfd = libc::pollfd {
        fd: fd.as_raw_fd(),
        events,
        revents: 0,
    };
    let timeout_ms = poll_timeout_ms(timeout);

    loop {
        // SAFETY: `pfd` is a valid, writable pollfd and the count passed is 1.
        // The descriptor is borrowed for the duration of the call.
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if rc == 0 {
            return Ok(false);
        }
        if pfd.revents & libc::POLLNVAL != 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        return Ok(true);
    }
}

/// Convenience for any descriptor owner.
pub fn wait_ready<T: AsFd>(
    handle: &T,
    interest: Interest,
    timeout: Option<Duration>,
) -> io::Result<bool> {
    wait_fd(handle.as_fd(), interest, timeout)
}

// Sub-millisecond timeouts round up so a short non-zero wait is never a pure poll.
fn poll_timeout_ms(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        None => -1,
        Some(d) if d.is_zero() => 0,
        Some(d) => {
            let ms = d.as_nanos().div_ceil(1_000_000);
            ms.min(libc::c_int::MAX as u128) as libc::c_int
        }
    }
}
