//! Constants and statics for the self-test.

use std::sync::LazyLock;

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

// Self-test parameters. The binary only ever targets the file it creates.
pub(crate) const TEST_FILE_PATH: &str = "/tmp/testfile.txt";
pub(crate) const TEST_FILE_CONTENT: &[u8] = b"Hello World!\n";
pub(crate) const TEST_FILE_MODE: u32 = 0o444; // r--r--r--
pub(crate) const TEST_OFFSET: u64 = 6;
pub(crate) const TEST_PAYLOAD: &[u8] = b"mammy";

// One byte is the least splice can move and still pin the cached page.
pub(crate) const SPLICE_BYTES: usize = 1;
pub(crate) const FILLER_CHUNK_BYTES: usize = 4096;

// anon_pipe_buf_ops merged in 5.8 (f6dd975583bd); earlier kernels cannot
// reach the merge path from a spliced page.
pub(crate) const MERGE_PATH_MIN_KERNEL: (u32, u32) = (5, 8);

// Process exit status
pub(crate) const EXIT_SAFE: u8 = 0;
pub(crate) const EXIT_FAILURE: u8 = 1;
pub(crate) const EXIT_VULNERABLE: u8 = 2;

pub(crate) const QUIET_ENV: &str = "PIPE_CHECK_QUIET";
pub(crate) const FORMAT_ENV: &str = "PIPE_CHECK_FORMAT";

/// Quiet mode: only errors and the verdict reach the terminal.
/// Enabled by `PIPE_CHECK_QUIET=1`.
pub(crate) static QUIET_MODE: LazyLock<bool> =
    LazyLock::new(|| flag_enabled(std::env::var(QUIET_ENV).ok().as_deref()));

/// Emit the verdict as one JSON line (`PIPE_CHECK_FORMAT=json`).
pub(crate) static JSON_OUTPUT: LazyLock<bool> = LazyLock::new(|| {
    std::env::var(FORMAT_ENV)
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
});

fn flag_enabled(value: Option<&str>) -> bool {
    matches!(
        value.map(str::trim),
        Some("1") | Some("true") | Some("yes") | Some("on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("1"), true)]
    #[case(Some("true"), true)]
    #[case(Some(" yes "), true)]
    #[case(Some("on"), true)]
    #[case(Some("0"), false)]
    #[case(Some(""), false)]
    #[case(Some("TRUE1"), false)]
    #[case(None, false)]
    fn test_flag_enabled(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(flag_enabled(value), expected);
    }

    #[test]
    fn test_offset_inside_content() {
        assert!(TEST_OFFSET > 0);
        assert!(TEST_OFFSET as usize + TEST_PAYLOAD.len() <= TEST_FILE_CONTENT.len());
    }

    #[test]
    fn test_mode_forbids_writes() {
        assert_eq!(TEST_FILE_MODE & 0o222, 0);
    }

    #[test]
    fn test_exit_codes_distinct() {
        assert_ne!(EXIT_SAFE, EXIT_FAILURE);
        assert_ne!(EXIT_SAFE, EXIT_VULNERABLE);
        assert_ne!(EXIT_FAILURE, EXIT_VULNERABLE);
    }
}
