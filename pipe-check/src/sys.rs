//! Syscall wrappers, logging macros, and kernel queries.

use std::ffi::CStr;
use std::fs::File;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

/// Used when `sysconf(_SC_PAGESIZE)` reports nothing useful.
pub(crate) const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Informational line on stderr, suppressed by `PIPE_CHECK_QUIET=1`.
macro_rules! log_info {
    ($($arg:tt)*) => {{
        if !*$crate::constants::QUIET_MODE {
            eprintln!("[pipe-check] {}", format!($($arg)*));
        }
    }};
}

/// Error line on stderr. Never suppressed.
macro_rules! log_error {
    ($($arg:tt)*) => {{
        eprintln!("[pipe-check] ERROR: {}", format!($($arg)*));
    }};
}

pub(crate) fn page_size() -> u64 {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// Create an anonymous pipe, returning `(read_end, write_end)`.
pub(crate) fn pipe() -> io::Result<(File, File)> {
    let mut fds = [0 as libc::c_int; 2];
    if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe2 succeeded, both descriptors are fresh and owned by us
    let (read_end, write_end) =
        unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    Ok((File::from(read_end), File::from(write_end)))
}

/// Total ring capacity of a pipe in bytes (`F_GETPIPE_SZ`).
pub(crate) fn pipe_capacity(fd: &impl AsRawFd) -> io::Result<usize> {
    let size = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETPIPE_SZ) };
    if size < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(size as usize)
}

/// Bytes currently queued in a pipe (`FIONREAD`).
#[cfg(test)]
pub(crate) fn pending_bytes(fd: &impl AsRawFd) -> io::Result<usize> {
    let mut pending: libc::c_int = 0;
    if unsafe { libc::ioctl(fd.as_raw_fd(), libc::FIONREAD, &mut pending) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(pending as usize)
}

/// splice(2) `len` bytes starting at `offset` of `file` into the pipe `write_end`.
///
/// The file position is passed explicitly, so the descriptor's own cursor is
/// left untouched.
pub(crate) fn splice_from_file(
    file: &File,
    offset: u64,
    write_end: &File,
    len: usize,
) -> io::Result<usize> {
    let mut off_in = libc::loff_t::try_from(offset)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset exceeds loff_t"))?;
    let ret = unsafe {
        libc::splice(
            file.as_raw_fd(),
            &mut off_in,
            write_end.as_raw_fd(),
            std::ptr::null_mut(),
            len,
            0,
        )
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ret as usize)
}

/// Kernel release string from uname(2), e.g. `5.10.0-13-amd64`.
pub(crate) fn kernel_release() -> Option<String> {
    let mut utsname: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut utsname) } != 0 {
        return None;
    }
    Some(
        unsafe { CStr::from_ptr(utsname.release.as_ptr()) }
            .to_string_lossy()
            .into_owned(),
    )
}
