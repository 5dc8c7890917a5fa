//! Shared helpers and macros for Diesel repository implementations.
//!
//! - Error mapping from pool and Diesel errors into port error constructors
//! - Unique-violation detection by constraint name
//! - A declarative macro for single-row lookups

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Constraint name of a unique violation, if `error` is one.
pub fn unique_violation(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

/// Convert a stored `i32` column into a non-negative `u32`.
pub fn non_negative(value: i32) -> u32 {
    u32::try_from(value).unwrap_or_default()
}

/// Convert a domain `u32` into an `i32` column value, saturating.
pub fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Macro for query methods that return `Option<T>`.
///
/// Acquires a connection, runs the query, maps errors with the given
/// mappers and converts the row.
#[macro_export]
macro_rules! query_optional {
    (
        $self:ident,
        $table:expr,
        $filter:expr,
        $row_type:ty,
        $converter:expr,
        $map_pool:expr,
        $map_diesel:expr
    ) => {{
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;

        let mut conn = $self.pool.get().await.map_err($map_pool)?;

        let result: Option<$row_type> = $table
            .filter($filter)
            .select(<$row_type>::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err($map_diesel)?;

        Ok(result.map($converter))
    }};
}
