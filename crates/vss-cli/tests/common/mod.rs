//! Shared test utilities for vss-cli integration tests.

use std::path::Path;

use assert_cmd::Command;

/// Get a Command for the vss binary, pinned to a data directory and the
/// deterministic mock embedding provider.
///
/// # Panics
///
/// Panics if the vss binary cannot be found. This should not happen
/// in a properly configured test environment.
#[allow(deprecated)]
pub fn vss_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vss").expect("vss binary should exist");
    cmd.arg("--data")
        .arg(data_dir)
        .arg("--provider")
        .arg("mock")
        .arg("--color")
        .arg("never")
        .env_remove("VSS_CONFIG")
        .env_remove("VSS_DATA")
        .env_remove("VSS_PROVIDER");
    cmd
}
