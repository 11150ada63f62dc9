//! Precondition checks for page cache write requests.
//!
//! The page window is checked before the target is opened, the file extent
//! once its size is known.

use crate::error::ValidationError;

/// Reject offsets that start a page or writes that spill into the next page.
pub(crate) fn check_page_window(
    offset: u64,
    len: usize,
    page_size: u64,
) -> Result<(), ValidationError> {
    if offset % page_size == 0 {
        return Err(ValidationError::PageAligned);
    }
    let next_page = (offset | (page_size - 1)) + 1;
    if end_offset(offset, len) > next_page {
        return Err(ValidationError::CrossesPageBoundary);
    }
    Ok(())
}

/// Reject offsets outside the file and writes that would grow it.
pub(crate) fn check_file_extent(
    offset: u64,
    len: usize,
    file_size: u64,
) -> Result<(), ValidationError> {
    if offset > file_size {
        return Err(ValidationError::OffsetOutsideFile);
    }
    if end_offset(offset, len) > file_size {
        return Err(ValidationError::WouldEnlargeFile);
    }
    Ok(())
}

fn end_offset(offset: u64, len: usize) -> u64 {
    offset.saturating_add(len as u64)
}
