//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for development and tests
//! - **cloudflare**: the DNS gateway against the Cloudflare v4 API
//! - **github**: the OAuth identity provider
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cloudflare;
pub mod github;
pub mod memory;
pub mod persistence;
