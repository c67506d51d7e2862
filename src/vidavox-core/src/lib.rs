//! Vidavox Core Library
//!
//! Types shared by the Vidavox RAG client crates:
//! - Wire models for folders, files, uploads and search
//! - The folder/file tree and the name/id resolver over it
//! - The `TreeFetcher` seam used by name-based operations
//! - Client configuration

pub mod config;
pub mod fetch;
pub mod models;
pub mod tree;

// Re-export commonly used types
pub use config::{ClientConfig, ConfigError};
pub use fetch::{FileScope, TreeFetcher};
pub use models::*;
pub use tree::{NodeType, TreeError, TreeNode};
