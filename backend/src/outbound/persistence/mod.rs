//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the claim, record and
//! user repository ports backed by PostgreSQL via Diesel with async support
//! through `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leak into the domain layer.
//! - **Constraint-backed invariants**: Uniqueness races are settled by named
//!   database constraints and surfaced as dedicated port error variants.
//!
//! # Example
//!
//! ```ignore
//! use subdomain_registry::outbound::persistence::{DbPool, PoolConfig, DieselRecordRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/registry");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselRecordRepository::new(pool);
//! ```

mod diesel_claim_repository;
pub(crate) mod diesel_helpers;
mod diesel_record_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_claim_repository::DieselClaimRepository;
pub use diesel_record_repository::DieselRecordRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
