//! Shared helpers for CLI specs

pub use assert_cmd::Command;
pub use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated data directory with its own config file
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_backend("wal")
    }

    pub fn with_backend(backend: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = format!(
            "backend = \"{}\"\ndata_dir = \"{}\"\n",
            backend,
            dir.path().join("data").display()
        );
        std::fs::write(dir.path().join("config.toml"), config).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// `sw` bound to this workspace
    pub fn sw(&self) -> Command {
        let mut cmd = Command::cargo_bin("sw").unwrap();
        cmd.arg("--config").arg(self.config_path());
        cmd.env_remove("SW_LOG");
        cmd
    }

    /// Run `sw` with `args`, asserting success, and return stdout
    pub fn run(&self, args: &[&str]) -> String {
        let output = self.sw().args(args).assert().success();
        String::from_utf8(output.get_output().stdout.clone()).unwrap()
    }

    /// Create a palette and return its id
    pub fn create_palette(&self, name: &str) -> String {
        let out = self.run(&["palette", "create", name]);
        out.trim()
            .strip_prefix("Created palette ")
            .unwrap()
            .to_string()
    }
}
