//! # ovensync Testkit
//!
//! Test utilities for ovensync.
//!
//! This crate provides:
//! - An in-process sync server with upsert-by-id collections and failure injection
//! - A gated transport for exercising recording during an in-flight push
//! - Engine fixtures over in-memory and file-backed stores
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ovensync_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn pushes_reach_the_server() {
//!     let server = MemoryServer::shared();
//!     let engine = engine_with_memory(&server);
//!     // ... record, push, inspect server
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::server::*;
}

pub use fixtures::*;
pub use generators::*;
pub use server::*;
