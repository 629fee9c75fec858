//! Rearranges a static portfolio site into a Vite/React project layout.
//!
//! A run has three phases, always in this order: materialize a directory tree,
//! relocate legacy files, then write template files. Everything is driven by a
//! [`config::RestructureConfig`], usually the built-in portfolio manifest.
pub mod api;
pub mod blueprint;
pub mod config;
pub mod create;
pub mod errors;
pub mod phases;
pub mod plan;
pub mod preview;
pub mod relocate;
pub mod transform;
pub mod tree;
pub mod utils;

pub use api::{dry_run, load_config, restructure, RefoldError};
