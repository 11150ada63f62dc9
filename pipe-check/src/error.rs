//! Error types for the self-test.

use std::fmt;
use std::io;

// ============================================================================
// ErrorType — failure classification
// ============================================================================

/// Failure classes reported in the JSON `error_type` field.
///
/// Each variant maps to a distinct wire string so callers can dispatch
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorType {
    Resource,   // "resource_error"
    Validation, // "validation_error"
    Io,         // "io_error"
    Oracle,     // "oracle_error"
}

impl ErrorType {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource_error",
            Self::Validation => "validation_error",
            Self::Io => "io_error",
            Self::Oracle => "oracle_error",
        }
    }
}

// ============================================================================
// ValidationError — rejected write requests
// ============================================================================

/// Reasons a write request is refused before any pipe is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationError {
    /// No preceding byte on the page to splice.
    PageAligned,
    CrossesPageBoundary,
    OffsetOutsideFile,
    /// Only existing bytes can be overwritten.
    WouldEnlargeFile,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::PageAligned => "cannot start writing at a page boundary",
            Self::CrossesPageBoundary => "cannot write across a page boundary",
            Self::OffsetOutsideFile => "offset is not inside the file",
            Self::WouldEnlargeFile => "cannot enlarge the file",
        };
        f.write_str(msg)
    }
}

// ============================================================================
// CheckError — the unified error type
// ============================================================================

/// Every fallible step returns this; `main` maps it to exit status 1.
#[derive(Debug)]
pub(crate) enum CheckError {
    /// The pipe could not be created; nothing else can run.
    Resource(io::Error),
    Validation(ValidationError),
    Io {
        context: &'static str,
        source: io::Error,
    },
    /// A splice or write moved fewer bytes than requested.
    Short {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The test file could not be read back.
    Oracle(io::Error),
}

impl CheckError {
    pub(crate) fn io(context: &'static str, source: io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn short(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::Short {
            context,
            expected,
            actual,
        }
    }

    pub(crate) fn error_type(&self) -> ErrorType {
        match self {
            Self::Resource(_) => ErrorType::Resource,
            Self::Validation(_) => ErrorType::Validation,
            Self::Io { .. } | Self::Short { .. } => ErrorType::Io,
            Self::Oracle(_) => ErrorType::Oracle,
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(e) => write!(f, "pipe creation failed: {e}"),
            Self::Validation(v) => write!(f, "Sorry, {v}"),
            Self::Io { context, source } => write!(f, "{context} failed: {source}"),
            Self::Short {
                context,
                expected,
                actual,
            } => write!(f, "short {context}: {actual} of {expected} bytes"),
            Self::Oracle(e) => write!(f, "test file read failed: {e}"),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resource(e) | Self::Oracle(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::Validation(_) | Self::Short { .. } => None,
        }
    }
}

impl From<ValidationError> for CheckError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

// ============================================================================
// Tests
// ============================================================================
