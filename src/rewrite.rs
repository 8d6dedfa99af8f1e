//! # Reference Rewriting
//!
//! Two textual transformations over a directory tree:
//!
//! - **Locator rewrite** ([`ReferenceRewriter`]): points every
//!   `source = "<alias>"` at a colocated path and drops the now meaningless
//!   `version = "..."` constraints from the files it touched.
//! - **Token replace** ([`replace_in_directory`]): literal substring
//!   substitution used for build-context placeholders such as `$PKG`.
//!
//! Matching is lexical. A source written as an interpolation, or a string
//! that merely contains an alias, is left alone. The rewrite is applied one
//! file at a time, so a failure part way through a tree leaves earlier files
//! rewritten.

use std::fs;
use std::path::Path;

use log::{debug, trace};
use regex::bytes::{NoExpand, Regex as BytesRegex};
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::filesystem::overwrite_file;

/// File extensions whose contents participate in locator rewriting
pub const CONFIG_EXTENSIONS: &[&str] = &["tf"];

/// Whether `path` is a configuration file the locator rewrite applies to
pub fn is_config_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CONFIG_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Counters describing one rewrite pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub files_scanned: usize,
    pub files_rewritten: usize,
    pub replacements: usize,
}

impl RewriteReport {
    pub fn merge(&mut self, other: RewriteReport) {
        self.files_scanned += other.files_scanned;
        self.files_rewritten += other.files_rewritten;
        self.replacements += other.replacements;
    }
}

/// Rewrites references to `alias` under `tree` so they point at `replacement`.
pub trait ReferenceRewriter {
    fn rewrite(&self, alias: &str, replacement: &str, tree: &Path) -> Result<RewriteReport>;
}

/// Regular-expression implementation of [`ReferenceRewriter`].
#[derive(Debug, Clone)]
pub struct RegexRewriter {
    version: Regex,
}

impl RegexRewriter {
    pub fn new() -> Self {
        Self {
            // whole assignment line with any trailing comment, including its line break
            version: Regex::new(r#"(?m)^[ \t]*version[ \t]*=[ \t]*"[^"\n]*"[^\n]*(?:\n|$)"#)
                .expect("static version pattern is valid"),
        }
    }

    /// Rewrite one file's contents, returning the new text and number of
    /// sources replaced. Text is returned unchanged when nothing matched.
    pub fn rewrite_contents(
        &self,
        source: &Regex,
        replacement: &str,
        contents: &str,
    ) -> (String, usize) {
        let count = source.find_iter(contents).count();
        if count == 0 {
            return (contents.to_string(), 0);
        }

        let line = format!("source = \"{}\"", hcl_escape(replacement));
        let replaced = source.replace_all(contents, regex::NoExpand(&line));
        let stripped = self.version.replace_all(&replaced, "");
        (stripped.into_owned(), count)
    }

    fn source_pattern(alias: &str) -> Result<Regex> {
        Ok(Regex::new(&format!(
            r#"source\s*=\s*"{}""#,
            regex::escape(alias)
        ))?)
    }
}

/// Escape `value` for use inside a double-quoted HCL string literal.
pub fn hcl_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("${", "$${")
        .replace("%{", "%%{")
}

impl Default for RegexRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceRewriter for RegexRewriter {
    fn rewrite(&self, alias: &str, replacement: &str, tree: &Path) -> Result<RewriteReport> {
        let source = Self::source_pattern(alias)?;
        let mut report = RewriteReport::default();

        for entry in WalkDir::new(tree).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::walk(tree, e))?;
            if !entry.file_type().is_file() || !is_config_file(entry.path()) {
                continue;
            }
            let path = entry.path();
            report.files_scanned += 1;

            let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            let (rewritten, count) = self.rewrite_contents(&source, replacement, &contents);
            if count == 0 {
                continue;
            }

            debug!(
                target: "terraform_pack::rewrite",
                "replacing {} source(s) of '{}' in '{}'",
                count,
                alias,
                path.display()
            );
            overwrite_file(path, rewritten.as_bytes())?;
            report.files_rewritten += 1;
            report.replacements += count;
        }

        Ok(report)
    }
}

/// Replace every literal occurrence of `search` with `replacement` in every
/// regular file under `tree`, keeping each file's permissions.
///
/// Works on bytes, so non-UTF-8 files are handled too. Returns the number of
/// files changed.
pub fn replace_in_directory(tree: &Path, search: &str, replacement: &str) -> Result<usize> {
    if search.is_empty() {
        return Err(Error::EmptyToken);
    }
    let pattern = BytesRegex::new(&regex::escape(search))?;
    let mut changed = 0;

    for entry in WalkDir::new(tree).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::walk(tree, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let contents = fs::read(path).map_err(|e| Error::io(path, e))?;
        if !pattern.is_match(&contents) {
            continue;
        }

        trace!(target: "terraform_pack::rewrite", "replacing '{}' in '{}'", search, path.display());
        let replaced = pattern.replace_all(&contents, NoExpand(replacement.as_bytes()));
        overwrite_file(path, &replaced)?;
        changed += 1;
    }

    Ok(changed)
}
