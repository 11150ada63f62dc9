//! Kernel release parsing.

use std::fmt;

use crate::constants::MERGE_PATH_MIN_KERNEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct KernelVersion {
    pub(crate) major: u32,
    pub(crate) minor: u32,
    pub(crate) patch: u32,
}

impl KernelVersion {
    /// Parse the leading `major.minor[.patch]` of a uname release such as
    /// `5.10.0-13-amd64` or `6.1.0+`. Anything after the numeric prefix is
    /// ignored.
    pub(crate) fn parse(release: &str) -> Option<Self> {
        let numeric_end = release
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(release.len());
        let mut parts = release[..numeric_end].split('.');

        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = match parts.next() {
            Some("") | None => 0,
            Some(p) => p.parse().ok()?,
        };
        Some(Self {
            major,
            minor,
            patch,
        })
    }

    /// Kernels before 5.8 never merge a write into a spliced page.
    pub(crate) fn predates_merge_path(self) -> bool {
        (self.major, self.minor) < MERGE_PATH_MIN_KERNEL
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("5.10.0-13-amd64", 5, 10, 0)]
    #[case("5.16.11", 5, 16, 11)]
    #[case("6.1.0+", 6, 1, 0)]
    #[case("4.19", 4, 19, 0)]
    #[case("5.8.0-rc1", 5, 8, 0)]
    #[case("6.18.44-fc-v139", 6, 18, 44)]
    #[case("3.10.0-1160.el7.x86_64", 3, 10, 0)]
    fn test_parse(
        #[case] release: &str,
        #[case] major: u32,
        #[case] minor: u32,
        #[case] patch: u32,
    ) {
        assert_eq!(
            KernelVersion::parse(release),
            Some(KernelVersion {
                major,
                minor,
                patch
            })
        );
    }

    #[rstest]
    #[case("")]
    #[case("linux")]
    #[case("5")]
    #[case("5-generic")]
    #[case(".5.10")]
    fn test_parse_rejects(#[case] release: &str) {
        assert_eq!(KernelVersion::parse(release), None);
    }

    #[rstest]
    #[case("4.19.0", true)]
    #[case("5.7.19", true)]
    #[case("5.8.0", false)]
    #[case("5.10.102", false)]
    #[case("6.1.0", false)]
    fn test_predates_merge_path(#[case] release: &str, #[case] expected: bool) {
        let version = KernelVersion::parse(release).unwrap();
        assert_eq!(version.predates_merge_path(), expected);
    }

    #[test]
    fn test_display() {
        let version = KernelVersion::parse("5.10.0-13-amd64").unwrap();
        assert_eq!(version.to_string(), "5.10.0");
    }

    proptest! {
        #[test]
        fn parse_recovers_numbers(
            major in 0u32..100,
            minor in 0u32..1000,
            patch in 0u32..1000,
            suffix in "(-[a-z0-9.]{1,12})?",
        ) {
            let release = format!("{major}.{minor}.{patch}{suffix}");
            prop_assert_eq!(
                KernelVersion::parse(&release),
                Some(KernelVersion { major, minor, patch })
            );
        }
    }
}
