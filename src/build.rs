//! # Artifact Materialization
//!
//! The build steps that turn sources into artifacts other build steps can
//! depend on. Each step prepares its own output directory, fills it, and
//! (for modules and providers) persists the metadata dependents resolve.
//!
//! - **Module**: mirror a fetched tree and/or flatten source files, purge
//!   VCS directories, strip unwanted directories, colocate module
//!   dependencies, then save the module's metadata.
//! - **Provider**: mirror a fetched plugin directory into the
//!   `host/namespace/type/version/os_arch` layout and save its metadata.
//! - **Root**: flatten source files, substitute build placeholders, add
//!   auto-loaded variable files, colocate modules and merge provider mirrors
//!   into Terraform's implied local mirror directory.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::colocate::{ColocationReport, Colocator};
use crate::config::{ModuleConfig, ProviderConfig, RootConfig};
use crate::defaults;
use crate::error::{Error, Result};
use crate::filesystem::{copy_file, flatten_into, remove_if_exists, slash_path, strip_dirs};
use crate::metadata::Metadata;
use crate::rewrite::replace_in_directory;
use crate::sync::{copy_tree, sync, KeepPatterns};

/// Build a module into `config.out` and return the metadata it saved.
pub fn build_module(config: &ModuleConfig) -> Result<Metadata> {
    info!(
        target: "terraform_pack::build",
        "building module {} into '{}'",
        config.label,
        config.out.display()
    );
    fs::create_dir_all(&config.out).map_err(|e| Error::io(&config.out, e))?;

    if let Some(source_dir) = &config.source_dir {
        sync(source_dir, &config.out, &KeepPatterns::none())?;
        purge_vcs_dirs(&config.out)?;
    }
    flatten_into(&config.srcs, &config.out)?;

    debug!(target: "terraform_pack::build", "stripping {:?}", config.strip);
    strip_dirs(&config.out, &config.strip)?;

    let metadata = config.metadata();

    debug!(target: "terraform_pack::build", "colocating {} module(s)", config.deps.len());
    Colocator::new(&config.metadata_file).colocate(&config.out, &config.deps)?;

    metadata.save(&config.out.join(&config.metadata_file))?;
    Ok(metadata)
}

/// Build a provider mirror into `config.out` and return the metadata it
/// saved.
pub fn build_provider(config: &ProviderConfig) -> Result<Metadata> {
    let layout = config.mirror_layout();
    info!(
        target: "terraform_pack::build",
        "building provider {} at '{}'",
        config.label,
        layout.display()
    );

    fs::create_dir_all(&config.out).map_err(|e| Error::io(&config.out, e))?;
    sync(&config.source_dir, &config.out.join(&layout), &KeepPatterns::none())?;

    let metadata = config.metadata();
    metadata.save(&config.out.join(&config.metadata_file))?;
    Ok(metadata)
}

/// Assemble a root module into `config.out`.
pub fn build_root(config: &RootConfig) -> Result<ColocationReport> {
    info!(
        target: "terraform_pack::build",
        "building root {} into '{}'",
        config.label,
        config.out.display()
    );
    fs::create_dir_all(&config.out).map_err(|e| Error::io(&config.out, e))?;

    flatten_into(&config.srcs, &config.out)?;

    for (token, value) in config.placeholders() {
        let changed = replace_in_directory(&config.out, token, &value)?;
        debug!(target: "terraform_pack::build", "substituted {} in {} file(s)", token, changed);
    }

    for (index, var_file) in config.var_files.iter().enumerate() {
        let name = auto_tfvars_name(index, var_file)?;
        copy_file(var_file, &config.out.join(&name))?;
        debug!(
            target: "terraform_pack::build",
            "configured '{}' as '{}'",
            var_file.display(),
            name
        );
    }

    let report = Colocator::new(&config.metadata_file).colocate(&config.out, &config.modules)?;

    if !config.providers.is_empty() {
        install_providers(config)?;
    }

    Ok(report)
}

/// Name under which Terraform auto-loads the `index`th variable file.
pub fn auto_tfvars_name(index: usize, var_file: &Path) -> Result<String> {
    let base = var_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(stem) = base.strip_suffix(".tfvars.json") {
        return Ok(format!("{}-{}.auto.tfvars.json", index, stem));
    }
    if let Some(stem) = base.strip_suffix(".tfvars") {
        return Ok(format!("{}-{}.auto.tfvars", index, stem));
    }
    Err(Error::VarFile { name: base })
}

fn install_providers(config: &RootConfig) -> Result<()> {
    let mirror = config.out.join(defaults::PLUGIN_MIRROR_DIR);
    let metadata_dir = config
        .provider_metadata_file
        .components()
        .next()
        .map(|c| Path::new(c.as_os_str()).to_path_buf())
        .ok_or_else(|| Error::Path {
            message: "provider metadata file must not be empty".to_string(),
        })?;
    let exclude = KeepPatterns::new(&[format!(
        "^{}(/|$)",
        regex::escape(&slash_path(&metadata_dir))
    )])?;

    for provider in &config.providers {
        // only directories built as providers are accepted
        let metadata = Metadata::load(&provider.join(&config.provider_metadata_file))?;
        info!(
            target: "terraform_pack::build",
            "installing provider {} into '{}'",
            metadata.target,
            mirror.display()
        );
        copy_tree(provider, &mirror, &exclude)?;
    }
    Ok(())
}

fn purge_vcs_dirs(out: &Path) -> Result<()> {
    for dir in defaults::PURGED_DIRS {
        remove_if_exists(&out.join(dir))?;
    }
    Ok(())
}
