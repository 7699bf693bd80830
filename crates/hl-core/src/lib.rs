//! # Highlight Core
//!
//! Host-independent core of the page-content annotator.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Site policy** - Host matching, allow/block lists, reconciliation of
//!   concurrent edits and the storage contract
//! - **Rate limiting** - Minimum-interval gate for transformation passes
//! - **Document model** - A mutable node tree with mutation records
//! - **Transformation** - Bolding of word prefixes and its exact reversal
//! - **Pipeline** - Run state, debounced re-application and policy updates
//! - **Configuration** - TOML configuration with defaults
//!
//! ## Example
//!
//! ```rust
//! use hl_core::{Config, Document, Pipeline};
//! use hl_core::policy::store::default_snapshot;
//!
//! let doc = Document::parse_html("<p>Reading made easier</p>");
//! let mut pipeline = Pipeline::new(doc, "medium.com", default_snapshot(), &Config::default());
//!
//! assert!(pipeline.enable(0));
//! assert!(pipeline.document().to_html().contains("hl-bold"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dom;
pub mod error;
pub mod messages;
pub mod pipeline;
pub mod policy;
pub mod ratelimit;
pub mod transform;

// Re-exports for convenience
pub use config::Config;
pub use dom::{Document, NodeId};
pub use error::{Error, Result};
pub use messages::{parse_message, Message, Response};
pub use pipeline::{Pipeline, Stats};
pub use policy::{Permission, PolicyEditor, PolicyList, PolicySnapshot, PolicyStore, StorageChange};
pub use ratelimit::{should_run, RateLimiter};
pub use transform::{PassReport, Transformer};
