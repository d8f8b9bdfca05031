//! # Escola DB
//!
//! The fetch boundary of the reporting engine.
//!
//! - [`store`]: The [`EntityStore`] trait the engine consumes
//! - [`postgres`]: [`PgEntityStore`], backed by an SQLx PostgreSQL pool
//! - `memory`: `MemoryStore`, an in-process store for tests (feature `test-utils`)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use escola_db::{init_db_pool, EntityStore, PgEntityStore};
//!
//! let pool = init_db_pool(5).await?;
//! let store: Arc<dyn EntityStore> = Arc::new(PgEntityStore::new(pool));
//! ```

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;
pub use postgres::PgEntityStore;
pub use store::EntityStore;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

use escola_core::StoreError;
use sqlx::postgres::PgPoolOptions;

/// Initializes a PostgreSQL connection pool from `DATABASE_URL`.
///
/// # Errors
///
/// Returns [`StoreError::Query`] if `DATABASE_URL` is unset or the connection fails.
pub async fn init_db_pool(max_connections: u32) -> Result<PgPool, StoreError> {
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| StoreError::query(std::io::Error::other("DATABASE_URL must be set")))?;

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .map_err(StoreError::query)
}
