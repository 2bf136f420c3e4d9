// src/parser/packages.rs

//! Parsing of `pm list packages -f` output and classification of
//! install/uninstall results
//!
//! Classification is conservative: only a recognised success token yields
//! `Success`. Empty or unrecognised output is a failure.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

const PACKAGE_PREFIX: &str = "package:";
const SUCCESS_TOKEN: &str = "Success";

/// `Failure [INSTALL_FAILED_VERSION_DOWNGRADE: ...]` and friends
static FAILURE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Failure \[([A-Z0-9_]+)").expect("failure code regex is valid")
});

/// An installed package reported by the device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    /// Reverse-domain package name, e.g. `com.example.app`
    pub identifier: String,
    /// Install location of the base APK, when the listing included it
    pub path: Option<String>,
}

impl PackageRef {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            path: None,
        }
    }
}

/// Parse a package listing, keeping device order and dropping duplicates
///
/// Accepts both `package:com.example` and
/// `package:/data/app/com.example-1/base.apk=com.example`.
pub fn parse_packages(output: &str) -> Vec<PackageRef> {
    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for line in output.lines() {
        let Some(package) = parse_package_line(line) else {
            continue;
        };
        if seen.insert(package.identifier.clone()) {
            packages.push(package);
        }
    }

    debug!("Parsed {} installed package(s)", packages.len());
    packages
}

fn parse_package_line(line: &str) -> Option<PackageRef> {
    let rest = line.trim().strip_prefix(PACKAGE_PREFIX)?;

    // Paths may themselves contain '=', the identifier never does
    let (path, identifier) = match rest.rsplit_once('=') {
        Some((path, id)) => (Some(path.to_string()).filter(|p| !p.is_empty()), id),
        None => (None, rest),
    };

    if !is_valid_identifier(identifier) {
        return None;
    }

    Some(PackageRef {
        identifier: identifier.to_string(),
        path,
    })
}

fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

/// True only when adb printed the literal success token on a line of its own
pub fn was_successful(output: &str) -> bool {
    output.lines().any(|line| line.trim() == SUCCESS_TOKEN)
}

/// Same rule for installs and uninstalls
pub fn was_successfully_installed(output: &str) -> bool {
    was_successful(output)
}

pub fn was_successfully_uninstalled(output: &str) -> bool {
    was_successful(output)
}

/// Short, single-line reason for a failed install
pub fn shortened_install_status(output: &str) -> String {
    if let Some(caps) = FAILURE_CODE_RE.captures(output) {
        return caps[1].to_string();
    }

    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .next_back()
        .map(str::to_string)
        .unwrap_or_else(|| "unknown error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_paths() {
        let output = "package:/data/app/com.a-1/base.apk=com.a\n\
                      package:/system/app/Browser/Browser.apk=com.android.browser\n";
        let packages = parse_packages(output);
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].identifier, "com.a");
        assert_eq!(packages[0].path.as_deref(), Some("/data/app/com.a-1/base.apk"));
        assert_eq!(packages[1].identifier, "com.android.browser");
    }

    #[test]
    fn test_parse_without_paths() {
        let packages = parse_packages("package:com.a\npackage:com.b\n");
        let ids: Vec<&str> = packages.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["com.a", "com.b"]);
        assert!(packages[0].path.is_none());
    }

    #[test]
    fn test_path_containing_equals_sign() {
        let packages = parse_packages("package:/data/app/~~abc==/com.x-1/base.apk=com.x\n");
        assert_eq!(packages[0].identifier, "com.x");
        assert_eq!(packages[0].path.as_deref(), Some("/data/app/~~abc==/com.x-1/base.apk"));
    }

    #[test]
    fn test_duplicates_collapse_in_first_seen_order() {
        let packages = parse_packages("package:com.b\npackage:com.a\npackage:com.b\n");
        let ids: Vec<&str> = packages.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["com.b", "com.a"]);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let output = "WARNING: linker: something\n\npackage:\npackage:bad id\npackage:com.ok\r\n";
        let packages = parse_packages(output);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].identifier, "com.ok");
    }

    #[test]
    fn test_success_requires_exact_token() {
        assert!(was_successful("Success"));
        assert!(was_successful("Performing Streamed Install\nSuccess\n"));
        assert!(was_successfully_uninstalled("Success\r\n"));

        assert!(!was_successful(""));
        assert!(!was_successful("   \n"));
        assert!(!was_successful("Failure [DELETE_FAILED_INTERNAL_ERROR]"));
        assert!(!was_successful("Successfully did nothing"));
        assert!(!was_successfully_installed("something unexpected"));
    }

    #[test]
    fn test_shortened_install_status() {
        assert_eq!(
            shortened_install_status(
                "Performing Streamed Install\nadb: failed to install app.apk: Failure [INSTALL_FAILED_VERSION_DOWNGRADE: Downgrade detected]"
            ),
            "INSTALL_FAILED_VERSION_DOWNGRADE"
        );
        assert_eq!(
            shortened_install_status("adb: error: failed to read\n\n"),
            "adb: error: failed to read"
        );
        assert_eq!(shortened_install_status(""), "unknown error");
    }
}
