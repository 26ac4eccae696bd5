//! # rpcmapgen — Go model → RPC mapping generator
//!
//! Reads two Go struct definitions, a domain "model" struct and a
//! transport "RPC" struct, and emits a function copying every model field
//! into its RPC counterpart, with explicit conversions where types differ.
//!
//! ## Architecture
//!
//! - **[`record`]** — Tree-sitter parsing of a struct snippet into fields
//! - **[`mapping`]** — Field matching (name or `//rpc:` override) and template rendering
//! - **[`generator`]** — The parse → match → render pipeline ([`generate_mapping`])
//! - **[`config`]** — JSON configuration loading and validation
//! - **[`server`]** — Axum HTTP endpoint serving the generator
//!
//! ```
//! let out = rpcmapgen::generate_mapping(
//!     "type UserReply struct {\n    ID int64\n}",
//!     "type User struct {\n    ID int32\n}",
//!     "pb",
//! )
//! .unwrap();
//! assert!(out.contains("ID: int64(model.ID),"));
//! ```

pub mod config;
pub mod generator;
pub mod mapping;
pub mod record;
pub mod server;

pub use generator::{GenerateError, Generated, MappingGenerator, generate_mapping};
