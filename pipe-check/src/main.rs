//! Dirty Pipe self-test (CVE-2022-0847).
//!
//! Creates a read-only file, tries to overwrite part of it through the page
//! cache using a pipe whose buffers still carry `PIPE_BUF_FLAG_CAN_MERGE`,
//! then reads the file back:
//! - unchanged → "You are safe", exit 0
//! - changed → "VULNERABLE!", exit 2
//! - any error → diagnostic on stderr, exit 1
//!
//! Takes no arguments. `PIPE_CHECK_QUIET=1` silences progress logs and
//! `PIPE_CHECK_FORMAT=json` replaces the verdict line with a JSON report.

#[macro_use]
mod sys;
mod constants;
mod corruptor;
mod error;
mod harness;
mod kernel;
mod pipe;
mod types;
mod validation;

use std::process::ExitCode;

use constants::*;
use error::CheckError;
use kernel::KernelVersion;
use types::{Report, SelfTestConfig, Verdict};

/// Log kernel release and page size; return the release for the report.
fn log_environment() -> Option<String> {
    let release = sys::kernel_release();
    match release.as_deref() {
        Some(r) => {
            log_info!("kernel {r}");
            if let Some(version) = KernelVersion::parse(r)
                && version.predates_merge_path()
            {
                log_info!(
                    "kernel {version} predates {}.{}; pipe buffer merging of spliced pages is not reachable",
                    MERGE_PATH_MIN_KERNEL.0,
                    MERGE_PATH_MIN_KERNEL.1
                );
            }
        }
        None => log_error!("uname failed"),
    }
    log_info!("page size {}", sys::page_size());
    release
}

/// Print the outcome and return the process exit status.
fn report(outcome: &Result<Verdict, CheckError>, kernel: Option<String>) -> u8 {
    if *JSON_OUTPUT {
        match serde_json::to_string(&Report::from_outcome(outcome, kernel)) {
            Ok(line) => println!("{line}"),
            Err(e) => log_error!("report serialization failed: {e}"),
        }
    }

    match outcome {
        Ok(verdict) => {
            if !*JSON_OUTPUT {
                println!("{}", verdict.message());
            }
            verdict.exit_code()
        }
        Err(e) => {
            log_error!("{e}");
            EXIT_FAILURE
        }
    }
}

fn main() -> ExitCode {
    log_info!("pipe-check {VERSION} starting");
    let kernel = log_environment();

    let config = SelfTestConfig::default();
    let outcome = harness::run_self_test(&config);
    ExitCode::from(report(&outcome, kernel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn report_maps_verdicts_to_exit_codes() {
        assert_eq!(report(&Ok(Verdict::Safe), None), EXIT_SAFE);
        assert_eq!(report(&Ok(Verdict::Vulnerable), None), EXIT_VULNERABLE);
    }

    #[test]
    fn report_maps_errors_to_failure() {
        let outcome = Err(CheckError::from(ValidationError::PageAligned));
        assert_eq!(report(&outcome, None), EXIT_FAILURE);
    }

    #[test]
    fn environment_reports_release() {
        assert_eq!(log_environment(), sys::kernel_release());
    }
}
