//! # Terraform Pack Library
//!
//! This library packages Terraform modules and providers as build artifacts.
//! Each artifact is materialized into its own output directory together with
//! a small metadata record naming it. Consumers colocate their dependencies
//! inside their own output and point their `source` references at them, so
//! every output directory is self-contained and hermetic.
//!
//! ## Quick Example
//!
//! ```
//! use terraform_pack::metadata::{Label, Metadata};
//!
//! let label: Label = "//third_party/vpc:vpc".parse().unwrap();
//! let mut metadata = Metadata::for_label(&label);
//! metadata.add_alias(label.default_package_form().unwrap());
//!
//! assert_eq!(metadata.target, "//third_party/vpc:vpc");
//! assert_eq!(metadata.aliases, vec!["//third_party/vpc:vpc", "//third_party/vpc"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Reconciliation (`sync`)**: mirror one directory into another, deleting
//!   stale entries except those matching keep patterns.
//! - **Metadata (`metadata`)**: the `{ Target, Aliases }` record persisted with
//!   every artifact.
//! - **Rewriting (`rewrite`)**: lexical replacement of `source = "<alias>"`
//!   locators and of literal build placeholders.
//! - **Colocation (`colocate`, `path`)**: placing dependencies under
//!   `.modules/` and redirecting references to them.
//! - **Orchestration (`build`, `workspace`)**: the module, provider and root
//!   build steps and the runnable workspace copy.
//!
//! ## Execution Flow
//!
//! A module build:
//!
//! 1.  **Materialize**: mirror a fetched tree and/or flatten source files
//!     into the output directory.
//! 2.  **Strip**: remove unwanted directories.
//! 3.  **Colocate**: place each dependency under `.modules/` and rewrite
//!     references to its aliases.
//! 4.  **Persist**: save the module's own metadata.

pub mod build;
pub mod colocate;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod metadata;
pub mod path;
pub mod rewrite;
pub mod sync;
pub mod workspace;

#[cfg(test)]
mod placement_proptest;
