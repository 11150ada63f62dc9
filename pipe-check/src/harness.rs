//! Self-test: create a read-only file, attack it, read it back.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::corruptor;
use crate::error::CheckError;
use crate::types::{SelfTestConfig, Verdict};

// ============================================================================
// TestFile
// ============================================================================

/// The scratch file under attack. Removed on drop, whatever the outcome.
struct TestFile {
    path: PathBuf,
}

impl TestFile {
    fn create(config: &SelfTestConfig) -> Result<Self, CheckError> {
        remove_stale(&config.path)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(config.mode)
            .open(&config.path)
            .map_err(|e| CheckError::io("test file create", e))?;
        let guard = Self {
            path: config.path.clone(),
        };

        file.write_all(&config.content)
            .map_err(|e| CheckError::io("test file write", e))?;
        Ok(guard)
    }

    fn read_back(&self) -> Result<Vec<u8>, CheckError> {
        fs::read(&self.path).map_err(CheckError::Oracle)
    }
}

impl Drop for TestFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log_error!("failed to remove {}: {e}", self.path.display()),
        }
    }
}

/// A previous run may have died before cleanup; its 0444 file would make
/// `create_new` fail.
fn remove_stale(path: &Path) -> Result<(), CheckError> {
    match fs::remove_file(path) {
        Ok(()) => {
            log_info!("removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CheckError::io("stale test file removal", e)),
    }
}

// ============================================================================
// Self-test
// ============================================================================

/// Run one create → overwrite → read-back cycle and classify the result.
pub(crate) fn run_self_test(config: &SelfTestConfig) -> Result<Verdict, CheckError> {
    let test_file = TestFile::create(config)?;
    log_info!(
        "created {} (mode {:o}, {} bytes)",
        config.path.display(),
        config.mode,
        config.content.len()
    );

    corruptor::overwrite_cached_page(&config.write_request())?;

    let observed = test_file.read_back()?;
    let verdict = Verdict::classify(&config.content, &observed);
    if verdict == Verdict::Vulnerable {
        if config.corrupted_content().as_deref() == Some(observed.as_slice()) {
            log_info!("payload landed at offset {}", config.offset);
        } else {
            log_info!("file content changed unexpectedly");
        }
    }
    Ok(verdict)
}
