//! Postgres implementation of the core storage traits.
//!
//! Every method checks out its own pooled connection. Multi-statement writes
//! run inside a transaction so a failure leaves no partial aggregate behind.

mod catalog;
mod identity;
mod recipes;
mod subscriptions;

use crate::db::{DbConn, DbPool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use foodgram_core::{StoreError, StoreResult};

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<DbConn> {
        self.pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to check out database connection");
            StoreError::Backend(format!("database connection failed: {}", e))
        })
    }
}

/// Maps diesel failures onto the store error vocabulary.
fn store_error(err: DieselError) -> StoreError {
    match err {
        DieselError::NotFound => StoreError::NotFound,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::Conflict(info.message().to_string())
        }
        other => StoreError::Backend(other.to_string()),
    }
}

/// Like [`store_error`], but a dangling foreign key means the referenced row is gone.
fn missing_parent_error(err: DieselError) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            StoreError::NotFound
        }
        other => store_error(other),
    }
}
