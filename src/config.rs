//! # Build Step Configuration
//!
//! Plain values describing one build step. Each holds the artifact's
//! [`Label`] and the fields only that step needs, and derives the
//! [`Metadata`] it will persist through an explicit method rather than by
//! sharing fields with the record.

use std::path::PathBuf;
use std::str::FromStr;

use crate::defaults;
use crate::error::{Error, Result};
use crate::metadata::{Label, Metadata};

/// Registry coordinate of a module, `namespace/name/provider`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryModule {
    pub namespace: String,
    pub name: String,
    pub provider: String,
}

impl FromStr for RegistryModule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [namespace, name, provider]
                if !namespace.is_empty() && !name.is_empty() && !provider.is_empty() =>
            {
                Ok(Self {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                    provider: provider.to_string(),
                })
            }
            _ => Err(Error::Label {
                label: s.to_string(),
                message: "registry source must be 'namespace/name/provider'".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RegistryModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.name, self.provider)
    }
}

/// Materialization of one Terraform module
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    pub label: Label,
    pub out: PathBuf,
    /// Files flattened into `out` by base name
    pub srcs: Vec<PathBuf>,
    /// Already-fetched module tree mirrored into `out`
    pub source_dir: Option<PathBuf>,
    pub registry_source: Option<RegistryModule>,
    pub aliases: Vec<String>,
    pub strip: Vec<String>,
    pub deps: Vec<PathBuf>,
    pub metadata_file: PathBuf,
}

impl ModuleConfig {
    pub fn new(label: Label, out: impl Into<PathBuf>) -> Self {
        Self {
            label,
            out: out.into(),
            srcs: Vec::new(),
            source_dir: None,
            registry_source: None,
            aliases: Vec::new(),
            strip: Vec::new(),
            deps: Vec::new(),
            metadata_file: PathBuf::from(defaults::MODULE_METADATA_FILE),
        }
    }

    /// The record this module persists once built.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::for_label(&self.label);
        if let Some(default) = self.label.default_package_form() {
            metadata.add_alias(default);
        }
        if let Some(registry) = &self.registry_source {
            metadata.add_alias(registry.to_string());
        }
        for alias in &self.aliases {
            metadata.add_alias(alias.clone());
        }
        metadata
    }
}

/// Materialization of one provider plugin into a filesystem mirror
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub label: Label,
    pub out: PathBuf,
    pub source_dir: PathBuf,
    /// Registry host name or URL
    pub registry: String,
    pub namespace: String,
    pub provider_type: String,
    pub version: String,
    pub os: String,
    pub arch: String,
    pub aliases: Vec<String>,
    pub metadata_file: PathBuf,
}

impl ProviderConfig {
    /// Host part of the registry with any scheme and path removed
    pub fn registry_host(&self) -> &str {
        let without_scheme = self
            .registry
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.registry);
        without_scheme.split('/').next().unwrap_or(without_scheme)
    }

    /// `host/namespace/type/version/os_arch`, the unpacked layout Terraform
    /// expects in a filesystem mirror
    pub fn mirror_layout(&self) -> PathBuf {
        [
            self.registry_host().to_string(),
            self.namespace.clone(),
            self.provider_type.clone(),
            self.version.clone(),
            format!("{}_{}", self.os, self.arch).to_lowercase(),
        ]
        .iter()
        .collect()
    }

    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::for_label(&self.label);
        if let Some(default) = self.label.default_package_form() {
            metadata.add_alias(default);
        }
        metadata.add_alias(format!(
            "{}/{}/{}",
            self.registry_host(),
            self.namespace,
            self.provider_type
        ));
        metadata.add_alias(format!("{}/{}", self.namespace, self.provider_type));
        for alias in &self.aliases {
            metadata.add_alias(alias.clone());
        }
        metadata
    }
}

/// Assembly of a Terraform root module
#[derive(Debug, Clone)]
pub struct RootConfig {
    pub label: Label,
    pub pkg_dir: String,
    pub os: String,
    pub arch: String,
    pub out: PathBuf,
    pub srcs: Vec<PathBuf>,
    pub var_files: Vec<PathBuf>,
    pub modules: Vec<PathBuf>,
    pub providers: Vec<PathBuf>,
    pub metadata_file: PathBuf,
    pub provider_metadata_file: PathBuf,
}

impl RootConfig {
    /// Placeholder substitutions, longer tokens before their prefixes.
    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        vec![
            ("$PKG_DIR", self.pkg_dir.clone()),
            ("$PKG", self.label.package.clone()),
            ("$NAME", self.label.name.clone()),
            ("$ARCH", self.arch.clone()),
            ("$OS", self.os.clone()),
        ]
    }
}

/// A runnable copy of a root module outside the build sandbox
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    pub repo_root: PathBuf,
    pub terraform_binary: PathBuf,
    pub root_module: PathBuf,
    pub base_dir: PathBuf,
    pub plz_out_dir: String,
    pub keep_patterns: Vec<String>,
}
