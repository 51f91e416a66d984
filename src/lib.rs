//! # INTERLINK
//!
//! Wires locally developed packages together through the package manager's
//! own `link` / `unlink` primitives.
//!
//! ## Pipeline
//!
//! - **Scan**: every immediate child of the packages root with a named
//!   `package.json` that declares dependencies becomes a module
//! - **Graph**: declared dependencies are intersected with the discovered modules
//! - **Plan**: three batches of commands (unlink, link as dependency, link as dependee)
//! - **Execute**: batches run one after another, jobs within a batch run concurrently
//! - **Report**: a structured [`core::LinkReport`] rendered as text or JSON
//!
//! ## Focus Mode
//!
//! With a single package selected, the whole workspace is still scanned so
//! its dependencies resolve, but commands are generated for that package only.

pub mod core;
pub mod error;
pub mod formatters;
pub mod manifest;

pub use error::{LinkError, Result};
