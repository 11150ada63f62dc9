//! Type definitions: write requests, self-test configuration, verdicts.

use std::path::PathBuf;

use serde::Serialize;

use crate::constants::*;
use crate::error::CheckError;

// ============================================================================
// Write request
// ============================================================================

/// Bytes to place at `offset` inside the cached pages of `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WriteRequest {
    pub(crate) path: PathBuf,
    pub(crate) offset: u64,
    pub(crate) payload: Vec<u8>,
}

impl WriteRequest {
    pub(crate) fn new(
        path: impl Into<PathBuf>,
        offset: u64,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            path: path.into(),
            offset,
            payload: payload.into(),
        }
    }
}

// ============================================================================
// Self-test configuration
// ============================================================================

/// Immutable inputs of one self-test run.
#[derive(Debug, Clone)]
pub(crate) struct SelfTestConfig {
    pub(crate) path: PathBuf,
    pub(crate) content: Vec<u8>,
    pub(crate) mode: u32,
    pub(crate) offset: u64,
    pub(crate) payload: Vec<u8>,
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(TEST_FILE_PATH),
            content: TEST_FILE_CONTENT.to_vec(),
            mode: TEST_FILE_MODE,
            offset: TEST_OFFSET,
            payload: TEST_PAYLOAD.to_vec(),
        }
    }
}

impl SelfTestConfig {
    pub(crate) fn write_request(&self) -> WriteRequest {
        WriteRequest::new(self.path.clone(), self.offset, self.payload.clone())
    }

    /// Content a vulnerable kernel leaves behind: the payload laid over the
    /// original bytes at `offset`. `None` if the payload does not fit.
    pub(crate) fn corrupted_content(&self) -> Option<Vec<u8>> {
        let start = usize::try_from(self.offset).ok()?;
        let end = start.checked_add(self.payload.len())?;
        let mut content = self.content.clone();
        content.get_mut(start..end)?.copy_from_slice(&self.payload);
        Some(content)
    }
}

// ============================================================================
// Verdict and report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Verdict {
    Safe,
    Vulnerable,
}

impl Verdict {
    /// Compare the re-read file against what was written.
    pub(crate) fn classify(original: &[u8], observed: &[u8]) -> Self {
        if observed == original {
            Self::Safe
        } else {
            Self::Vulnerable
        }
    }

    pub(crate) const fn message(self) -> &'static str {
        match self {
            Self::Safe => "You are safe",
            Self::Vulnerable => "VULNERABLE!",
        }
    }

    pub(crate) const fn exit_code(self) -> u8 {
        match self {
            Self::Safe => EXIT_SAFE,
            Self::Vulnerable => EXIT_VULNERABLE,
        }
    }
}

/// One-line machine-readable outcome (`PIPE_CHECK_FORMAT=json`).
#[derive(Debug, Serialize)]
pub(crate) struct Report {
    pub(crate) version: &'static str,
    pub(crate) kernel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

impl Report {
    pub(crate) fn from_outcome(
        outcome: &Result<Verdict, CheckError>,
        kernel: Option<String>,
    ) -> Self {
        match outcome {
            Ok(verdict) => Self {
                version: VERSION,
                kernel,
                verdict: Some(*verdict),
                error_type: None,
                message: Some(verdict.message().to_string()),
            },
            Err(e) => Self {
                version: VERSION,
                kernel,
                verdict: None,
                error_type: Some(e.error_type().as_str()),
                message: Some(e.to_string()),
            },
        }
    }
}
