// src/bridge/locate.rs
//! Finding the adb executable
//!
//! Search order:
//! 1. An explicit path given on the command line
//! 2. `adb` on `PATH`
//! 3. `$ANDROID_HOME` or `$ANDROID_SDK_ROOT` platform-tools
//! 4. The default Android SDK location for the current OS

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the adb executable was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Custom,
    Path,
    SdkEnv,
    WinDefault,
    MacDefault,
    LinuxDefault,
}

impl LocationKind {
    /// True for the per-OS fallback locations
    pub fn is_default(&self) -> bool {
        matches!(
            self,
            LocationKind::WinDefault | LocationKind::MacDefault | LocationKind::LinuxDefault
        )
    }
}

/// Resolved adb location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeLocation {
    /// Prepended to every adb invocation
    pub argv_prefix: Vec<String>,
    pub kind: LocationKind,
}

impl BridgeLocation {
    pub fn new(executable: impl Into<String>, kind: LocationKind) -> Self {
        Self {
            argv_prefix: vec![executable.into()],
            kind,
        }
    }

    /// Full argv for an adb subcommand
    pub fn command<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        self.argv_prefix
            .iter()
            .cloned()
            .chain(args.iter().map(|a| a.as_ref().to_string()))
            .collect()
    }
}

impl fmt::Display for BridgeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv_prefix.join(" "))
    }
}

/// Snapshot of the environment the search depends on
#[derive(Debug, Clone, Default)]
pub struct Locator {
    /// Result of a `PATH` lookup for `adb`
    pub on_path: Option<PathBuf>,
    /// `$ANDROID_HOME` or `$ANDROID_SDK_ROOT`
    pub sdk_root: Option<PathBuf>,
    pub home_dir: Option<PathBuf>,
    /// `%LOCALAPPDATA%` on Windows
    pub data_local_dir: Option<PathBuf>,
}

impl Locator {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        let sdk_root = std::env::var_os("ANDROID_HOME")
            .or_else(|| std::env::var_os("ANDROID_SDK_ROOT"))
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            on_path: which::which(adb_file_name()).ok(),
            sdk_root,
            home_dir: dirs::home_dir(),
            data_local_dir: dirs::data_local_dir(),
        }
    }

    /// Resolve the adb executable
    pub fn find(&self, explicit: Option<&Path>) -> Result<BridgeLocation> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(Error::BridgeNotFound(format!(
                    "no adb executable at '{}'",
                    path.display()
                )));
            }
            return Ok(BridgeLocation::new(path.to_string_lossy(), LocationKind::Custom));
        }

        if let Some(path) = &self.on_path {
            debug!("adb found on PATH: {}", path.display());
            return Ok(BridgeLocation::new(path.to_string_lossy(), LocationKind::Path));
        }

        if let Some(sdk) = &self.sdk_root {
            let candidate = sdk.join("platform-tools").join(adb_file_name());
            if candidate.is_file() {
                debug!("adb found via SDK environment: {}", candidate.display());
                return Ok(BridgeLocation::new(
                    candidate.to_string_lossy(),
                    LocationKind::SdkEnv,
                ));
            }
        }

        let (candidate, kind) = self.os_default().ok_or_else(|| {
            Error::BridgeNotFound("adb is not in PATH and no home directory is known".to_string())
        })?;

        if !candidate.is_file() {
            return Err(Error::BridgeNotFound(format!(
                "adb is not in PATH and not at the default location '{}'",
                candidate.display()
            )));
        }

        Ok(BridgeLocation::new(candidate.to_string_lossy(), kind))
    }

    fn os_default(&self) -> Option<(PathBuf, LocationKind)> {
        if cfg!(windows) {
            let base = self.data_local_dir.as_ref()?;
            Some((
                base.join("Android").join("sdk").join("platform-tools").join("adb.exe"),
                LocationKind::WinDefault,
            ))
        } else if cfg!(target_os = "macos") {
            let home = self.home_dir.as_ref()?;
            Some((
                home.join("Library/Android/sdk/platform-tools/adb"),
                LocationKind::MacDefault,
            ))
        } else {
            let home = self.home_dir.as_ref()?;
            Some((
                home.join("Android/Sdk/platform-tools/adb"),
                LocationKind::LinuxDefault,
            ))
        }
    }
}

/// Resolve the adb executable from the current environment
pub fn locate(explicit: Option<&Path>) -> Result<BridgeLocation> {
    Locator::from_env().find(explicit)
}

fn adb_file_name() -> &'static str {
    if cfg!(windows) { "adb.exe" } else { "adb" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_command_prepends_prefix() {
        let loc = BridgeLocation::new("/opt/adb", LocationKind::Custom);
        assert_eq!(
            loc.command(&["devices", "-l"]),
            vec!["/opt/adb", "devices", "-l"]
        );
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let locator = Locator::default();
        let result = locator.find(Some(Path::new("/definitely/not/here/adb")));
        assert!(matches!(result, Err(Error::BridgeNotFound(_))));
    }

    #[test]
    fn test_explicit_path_wins_over_path_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let adb = dir.path().join("adb");
        fs::write(&adb, b"").unwrap();

        let locator = Locator {
            on_path: Some(PathBuf::from("/usr/bin/adb")),
            ..Default::default()
        };
        let loc = locator.find(Some(adb.as_path())).unwrap();
        assert_eq!(loc.kind, LocationKind::Custom);
        assert_eq!(loc.argv_prefix, vec![adb.to_string_lossy().to_string()]);
    }

    #[test]
    fn test_path_lookup_before_sdk() {
        let locator = Locator {
            on_path: Some(PathBuf::from("/usr/bin/adb")),
            sdk_root: Some(PathBuf::from("/sdk")),
            ..Default::default()
        };
        let loc = locator.find(None).unwrap();
        assert_eq!(loc.kind, LocationKind::Path);
        assert!(!loc.kind.is_default());
    }

    #[test]
    fn test_sdk_env_location() {
        let dir = tempfile::tempdir().unwrap();
        let tools = dir.path().join("platform-tools");
        fs::create_dir_all(&tools).unwrap();
        fs::write(tools.join(adb_file_name()), b"").unwrap();

        let locator = Locator {
            sdk_root: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(locator.find(None).unwrap().kind, LocationKind::SdkEnv);
    }

    #[test]
    fn test_missing_everywhere_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let locator = Locator {
            home_dir: Some(dir.path().to_path_buf()),
            data_local_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(locator.find(None), Err(Error::BridgeNotFound(_))));
    }
}
