//! # Application State
//!
//! Shared state for the Axum application: the database pool and one
//! store per aggregate, all cheap clones over the same pool. Built once
//! by the binary and passed down; nothing here is process-global.

use sqlx::PgPool;

use tienda_domain::TaxRate;
use tienda_postgres::{
    AddressStore, BillStore, CategoryStore, CheckoutStore, ClientStore, OrderDetailStore,
    OrderStore, ProductStore, ReviewStore,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    /// Customer accounts.
    pub clients: ClientStore,
    /// Catalog products.
    pub products: ProductStore,
    /// Product categories.
    pub categories: CategoryStore,
    /// Client addresses.
    pub addresses: AddressStore,
    /// Order headers and line items.
    pub orders: OrderStore,
    /// Line-item mutation with stock reconciliation.
    pub order_details: OrderDetailStore,
    /// Bills.
    pub bills: BillStore,
    /// Reviews.
    pub reviews: ReviewStore,
    /// The order placement workflow.
    pub checkout: CheckoutStore,
}

impl AppState {
    /// Build the state for a pool and the configured tax rate.
    pub fn new(pool: PgPool, tax_rate: TaxRate) -> Self {
        Self {
            clients: ClientStore::new(pool.clone()),
            products: ProductStore::new(pool.clone()),
            categories: CategoryStore::new(pool.clone()),
            addresses: AddressStore::new(pool.clone()),
            orders: OrderStore::new(pool.clone()),
            order_details: OrderDetailStore::new(pool.clone()),
            bills: BillStore::new(pool.clone()),
            reviews: ReviewStore::new(pool.clone()),
            checkout: CheckoutStore::new(pool.clone(), tax_rate),
            pool,
        }
    }

    /// The underlying pool, for readiness probes.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
