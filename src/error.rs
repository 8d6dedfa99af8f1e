//! # Error Handling
//!
//! This module defines the centralized error type for the `terraform-pack`
//! library. It uses the `thiserror` library to build one `Error` enum that
//! covers every failure the reconciler, rewriter, metadata store and
//! colocation engine can report.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Filesystem variants always carry the
//!   offending path, metadata variants carry the metadata file, and
//!   colocation failures are wrapped with the dependency that caused them so
//!   the message read by the build system names the culprit.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! A locator that does not match lexically during a rewrite is not an error
//! and never produces one of these variants.

use std::path::Path;

use thiserror::Error;

/// Main error type for terraform-pack operations
#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem operation failed on a specific path.
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A path that must be a regular file is a symlink, socket, fifo,
    /// device or directory.
    #[error("'{path}' is not a regular file")]
    NotRegularFile { path: String },

    /// A directory walk failed part way through.
    #[error("Could not walk '{path}': {message}")]
    Walk { path: String, message: String },

    /// A metadata file could not be read or did not contain a valid record.
    #[error("Invalid metadata in '{path}': {message}")]
    Metadata { path: String, message: String },

    /// A keep pattern supplied by the caller is not a valid regular expression.
    #[error("Invalid keep pattern '{pattern}': {source}")]
    KeepPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A target label is not of the form `//package:name`.
    #[error("Invalid label '{label}': {message}")]
    Label { label: String, message: String },

    /// A caller-supplied path is unusable (absolute where relative is
    /// required, escaping its root, and so on).
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// Two dependencies of the same consumer declare the same alias.
    #[error("Alias '{alias}' is declared by both '{first}' and '{second}'")]
    AliasCollision {
        alias: String,
        first: String,
        second: String,
    },

    /// Colocating one dependency failed; wraps the underlying error.
    #[error("Could not colocate '{dependency}': {source}")]
    Colocation {
        dependency: String,
        #[source]
        source: Box<Error>,
    },

    /// A variable file does not have a recognized tfvars extension.
    #[error("'{name}' does not end in '.tfvars' or '.tfvars.json'")]
    VarFile { name: String },

    /// A token replacement was requested with an empty search string.
    #[error("Token replacement requires a non-empty search string")]
    EmptyToken,

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Wrap a walkdir error, keeping the path it failed on when known.
    pub fn walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).display().to_string();
        Error::Walk {
            path,
            message: err.to_string(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
