//! HL First Letters Storage Layer
//!
//! Concrete [`PolicyStore`](hl_core::PolicyStore) backends.
//!
//! ## Backends
//!
//! - **JSON file**: durable, shared between processes, hot-reloaded by
//!   modification time
//! - **Memory**: per-process, for tests and ephemeral sessions

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub use error::{PlatformError, Result};

mod file_store;
pub use file_store::JsonFileStore;

mod memory_store;
pub use memory_store::MemoryStore;

mod subscribers;
