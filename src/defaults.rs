//! Default values for terraform-pack configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication. Each can be overridden by
//! the matching CLI flag or `TERRAFORM_PACK_*` environment variable.

/// Module metadata location, relative to each module's output directory.
pub const MODULE_METADATA_FILE: &str = ".please/terraform/module.json";

/// Provider metadata location, relative to each provider's output directory.
pub const PROVIDER_METADATA_FILE: &str = ".please/terraform/provider.json";

/// Build output directory, relative to the repository root.
pub const PLZ_OUT_DIR: &str = "plz-out";

/// Base directory for runnable workspaces, relative to the repository root.
pub const WORKSPACE_BASE_DIR: &str = "plz-out/terraform/venvs";

/// Directory inside a root module where Terraform looks for a local
/// provider mirror.
pub const PLUGIN_MIRROR_DIR: &str = "terraform.d/plugins";

/// Directories purged from fetched module trees for consistent hashes.
pub const PURGED_DIRS: &[&str] = &[".git"];

/// Paths in a workspace that survive reconciliation: Terraform's working
/// data and local state.
pub fn workspace_keep_patterns() -> Vec<String> {
    vec![r"\.terraform.*".to_string(), r".*\.tfstate".to_string()]
}
