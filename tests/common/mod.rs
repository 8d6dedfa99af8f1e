//! Shared test utilities for end-to-end tests.
//!
//! This module provides a fixture laying out a small repository of Terraform
//! sources and helpers running the `terraform-pack` binary against it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("src/main.tf", tf::EMPTY);
//!     fixture.build_module("modules/net", "net", &["src/main.tf"], &[]);
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::tf;
    pub use super::TestFixture;
}

/// Terraform configuration snippets for testing.
#[allow(dead_code)]
pub mod tf {
    /// A module with nothing in it.
    pub const EMPTY: &str = "";

    /// A module declaring one variable and output.
    pub const NETWORK: &str = r#"variable "cidr" {
  type = string
}

output "cidr" {
  value = var.cidr
}
"#;

    /// A consumer of the `//modules/network:network` module.
    pub const USES_NETWORK: &str = r#"module "network" {
  source  = "//modules/network:network"
  version = "1.2.3"
  cidr    = "10.0.0.0/16"
}
"#;

    /// A backend configuration using build placeholders.
    pub const BACKEND: &str = r#"terraform {
  backend "s3" {
    key = "$PKG_DIR/$NAME.tfstate"
  }
}
"#;
}

/// A temporary directory laid out as a small repository.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().with_file("src/main.tf", tf::NETWORK);
///
/// let mut cmd = fixture.command();
/// cmd.args(["module", "--pkg", "modules/network", "--name", "network"])
///     .arg("--out").arg(fixture.path().join("out"))
///     .arg("--srcs").arg(fixture.path().join("src/main.tf"))
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read a file under the fixture as a string.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("terraform-pack");
        cmd.current_dir(self.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Build a module from fixture files into `out/<pkg>/<name>` and return
    /// the output directory.
    #[allow(dead_code)]
    pub fn build_module(&self, pkg: &str, name: &str, srcs: &[&str], deps: &[&Path]) -> PathBuf {
        let out = self.path().join("out").join(pkg).join(name);
        let mut cmd = self.command();
        cmd.args(["module", "--pkg", pkg, "--name", name])
            .arg("--out")
            .arg(&out);
        for src in srcs {
            cmd.arg("--srcs").arg(self.path().join(src));
        }
        for dep in deps {
            cmd.arg("--deps").arg(dep);
        }
        cmd.assert().success();
        out
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
