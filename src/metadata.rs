//! # Module Metadata
//!
//! Every materialized module or provider persists a small JSON record next to
//! its content describing its canonical identity and every locator string
//! other configuration may use to reference it:
//!
//! ```json
//! {
//!   "Target": "//third_party/terraform:vpc",
//!   "Aliases": [
//!     "//third_party/terraform:vpc",
//!     "terraform-aws-modules/vpc/aws"
//!   ]
//! }
//! ```
//!
//! Consumers only ever read a dependency's record; they copy its content but
//! never write back to its metadata file.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filesystem::ensure_parent_dir;

/// Build-system label of an artifact, rendered as `//package:name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    pub package: String,
    pub name: String,
}

impl Label {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// The `//package` shorthand, valid only when the package's last segment
    /// equals the name.
    pub fn default_package_form(&self) -> Option<String> {
        let last = self.package.rsplit('/').next().unwrap_or_default();
        (last == self.name).then(|| format!("//{}", self.package))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}:{}", self.package, self.name)
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: &str| Error::Label {
            label: s.to_string(),
            message: message.to_string(),
        };

        let rest = s
            .strip_prefix("//")
            .ok_or_else(|| invalid("must start with '//'"))?;
        let (package, name) = rest
            .rsplit_once(':')
            .ok_or_else(|| invalid("must contain ':' between package and name"))?;
        if name.is_empty() || name.contains('/') {
            return Err(invalid("name must be a non-empty single segment"));
        }
        Ok(Label::new(package, name))
    }
}

/// Persisted identity and locator aliases of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "Target")]
    pub target: String,
    #[serde(rename = "Aliases")]
    pub aliases: Vec<String>,
}

impl Metadata {
    /// A record for `label` whose only alias is the label itself.
    pub fn for_label(label: &Label) -> Self {
        let target = label.to_string();
        Self {
            aliases: vec![target.clone()],
            target,
        }
    }

    /// Append an alias unless it is already present; insertion order is kept.
    pub fn add_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
    }

    /// Read a record from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::Metadata {
            path: path.display().to_string(),
            message: format!("could not read: {}", e),
        })?;
        let metadata: Metadata = serde_json::from_slice(&bytes).map_err(|e| Error::Metadata {
            path: path.display().to_string(),
            message: format!("could not parse: {}", e),
        })?;
        Ok(metadata)
    }

    /// Write the record to `path` as two-space indented JSON, creating
    /// parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(target: "terraform_pack::metadata", "saving metadata for {} to '{}'", self.target, path.display());
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        ensure_parent_dir(path)?;
        fs::write(path, json).map_err(|e| Error::io(path, e))
    }
}
