//! In-memory repository adapters.
//!
//! Used by the server when no database URL is configured and by HTTP-level
//! tests. They enforce the same uniqueness rules as the PostgreSQL schema so
//! services observe identical race outcomes.

mod claims;
mod records;
mod users;

pub use claims::MemoryClaimRepository;
pub use records::MemoryRecordRepository;
pub use users::MemoryUserRepository;
