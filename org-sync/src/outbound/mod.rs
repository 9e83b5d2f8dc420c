//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest client for the organization REST API
//! - **cache**: in-memory and JSON file cache mirrors
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod http;
