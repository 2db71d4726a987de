//! # tienda-postgres — PostgreSQL Persistence
//!
//! SQLx-backed stores for the tienda backend, one per aggregate, each a
//! cheap clone around a shared `PgPool`. The pool is constructed by the
//! binary and passed down; nothing in this crate holds global state.
//!
//! ## Design
//!
//! - Queries are runtime-bound (`sqlx::query`, `query_as`); the crate
//!   builds without a database.
//! - Constraint violations surface as SQLSTATE codes and are translated
//!   to domain errors in [`error`].
//! - The one multi-entity transactional path is [`checkout`]: conditional
//!   stock decrements verified by row count, order + line items in one
//!   transaction, billing derivation in a second one (degraded success).
//! - Line-item mutations ([`order_details`]) reconcile stock and the
//!   order total inside their own transaction.
//!
//! ## Concurrency
//!
//! Stock serialization relies on the database, never an in-process lock:
//! `UPDATE products SET stock = stock - $q WHERE id_key = $1 AND stock >= $q`
//! either reserves atomically or affects zero rows. Two concurrent
//! placements against the same product cannot jointly oversell.

pub mod addresses;
pub mod bills;
pub mod categories;
pub mod checkout;
pub mod clients;
pub mod error;
pub mod order_details;
pub mod orders;
pub mod products;
pub mod reviews;

pub use addresses::{AddressInput, AddressStore};
pub use bills::BillStore;
pub use categories::CategoryStore;
pub use checkout::{CheckoutStore, PlacementReceipt};
pub use clients::{ClientStore, ClientUpdate, NewClient, StoredCredentials};
pub use error::{StoreError, StoreResult};
pub use order_details::OrderDetailStore;
pub use orders::OrderStore;
pub use products::{NewProduct, ProductStore, ProductUpdate};
pub use reviews::ReviewStore;

use sqlx::PgPool;

/// Run the embedded migrations against the given pool.
///
/// # Errors
///
/// Returns the underlying migration failure.
pub async fn migrate(pool: &PgPool) -> StoreResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Database(e.into()))?;
    Ok(())
}

/// Database `INTEGER` count columns are CHECK-constrained non-negative.
pub(crate) fn count_from_db(n: i32) -> u32 {
    u32::try_from(n).unwrap_or(0)
}
