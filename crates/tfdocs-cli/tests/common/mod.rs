#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;

pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// `tfdocs` command reading its config from `config_path`.
///
/// A path that does not exist yields the default configuration.
pub fn tfdocs_cmd(config_path: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tfdocs"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("TFDOCS_CONFIG", config_path);
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Config pointing both the registry and the docs host at `base_url`.
#[allow(dead_code)]
pub fn write_config(dir: &Path, base_url: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        r#"[registry]
base_url = "{base_url}"
version_ttl_secs = 600

[docs]
base_url = "{base_url}"
timeout_secs = 5

[[providers]]
name = "aws"
org = "hashicorp"
"#
    );
    std::fs::write(&path, content).expect("failed to write config");
    path
}
