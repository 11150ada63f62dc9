//! Pipe conditioning.
//!
//! Filling a fresh pipe to capacity allocates one `pipe_buffer` per ring slot
//! through the anonymous write path, which marks each slot
//! `PIPE_BUF_FLAG_CAN_MERGE`. Draining releases the pages but leaves the
//! flags as they were. The pipe is then empty, and any buffer the kernel adds
//! later without initializing `flags` inherits the merge flag.

use std::fs::File;
use std::io::{Read, Write};

use crate::constants::FILLER_CHUNK_BYTES;
use crate::error::CheckError;
use crate::sys;

/// An empty pipe whose ring slots all carry the merge flag.
pub(crate) struct ConditionedPipe {
    read_end: File,
    write_end: File,
    capacity: usize,
}

impl ConditionedPipe {
    pub(crate) fn new() -> Result<Self, CheckError> {
        let (read_end, write_end) = sys::pipe().map_err(CheckError::Resource)?;
        let capacity =
            sys::pipe_capacity(&write_end).map_err(|e| CheckError::io("F_GETPIPE_SZ", e))?;

        let mut pipe = Self {
            read_end,
            write_end,
            capacity,
        };
        pipe.fill()?;
        pipe.drain()?;
        Ok(pipe)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    fn fill(&mut self) -> Result<(), CheckError> {
        let filler = [0u8; FILLER_CHUNK_BYTES];
        let mut remaining = self.capacity;
        while remaining > 0 {
            let n = remaining.min(filler.len());
            self.write_end
                .write_all(&filler[..n])
                .map_err(|e| CheckError::io("pipe fill", e))?;
            remaining -= n;
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), CheckError> {
        let mut scratch = [0u8; FILLER_CHUNK_BYTES];
        let mut remaining = self.capacity;
        while remaining > 0 {
            let n = remaining.min(scratch.len());
            self.read_end
                .read_exact(&mut scratch[..n])
                .map_err(|e| CheckError::io("pipe drain", e))?;
            remaining -= n;
        }
        Ok(())
    }

    /// Move `len` bytes of `file` starting at `offset` into the pipe by
    /// page reference. Returns the number of bytes moved.
    pub(crate) fn splice_in(
        &self,
        file: &File,
        offset: u64,
        len: usize,
    ) -> Result<usize, CheckError> {
        sys::splice_from_file(file, offset, &self.write_end, len)
            .map_err(|e| CheckError::io("splice", e))
    }

    /// One write(2) into the pipe. Returns the number of bytes accepted.
    pub(crate) fn write_in(&mut self, data: &[u8]) -> Result<usize, CheckError> {
        self.write_end
            .write(data)
            .map_err(|e| CheckError::io("write", e))
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> Result<usize, CheckError> {
        sys::pending_bytes(&self.read_end).map_err(|e| CheckError::io("FIONREAD", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditioned_pipe_is_empty() {
        let pipe = ConditionedPipe::new().unwrap();
        assert_eq!(pipe.pending().unwrap(), 0);
    }

    #[test]
    fn capacity_is_whole_pages() {
        let pipe = ConditionedPipe::new().unwrap();
        let page = sys::page_size() as usize;
        assert!(pipe.capacity() >= page);
        assert_eq!(pipe.capacity() % page, 0);
    }

    #[test]
    fn conditioned_pipe_still_carries_data() {
        let mut pipe = ConditionedPipe::new().unwrap();
        assert_eq!(pipe.write_in(b"payload").unwrap(), 7);
        assert_eq!(pipe.pending().unwrap(), 7);

        let mut buf = [0u8; 7];
        pipe.read_end.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"payload");
    }

    #[test]
    fn splice_in_moves_one_byte() {
        let path =
            std::env::temp_dir().join(format!("pipe-check-pipe-{}", std::process::id()));
        std::fs::write(&path, b"abcdef").unwrap();
        let file = File::open(&path).unwrap();

        let mut pipe = ConditionedPipe::new().unwrap();
        assert_eq!(pipe.splice_in(&file, 2, 1).unwrap(), 1);
        assert_eq!(pipe.pending().unwrap(), 1);

        let mut buf = [0u8; 1];
        pipe.read_end.read_exact(&mut buf).unwrap();
        assert_eq!(buf[0], b'c');
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn repeated_conditioning_is_independent() {
        for _ in 0..3 {
            let pipe = ConditionedPipe::new().unwrap();
            assert_eq!(pipe.pending().unwrap(), 0);
        }
    }
}
