//! Integration tests for the order placement workflow against a live
//! PostgreSQL instance.
//!
//! Run with a database available:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/tienda_test cargo test -p tienda-postgres -- --ignored
//! ```

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use tienda_core::{ClientId, Money, ProductId};
use tienda_domain::{
    CheckoutError, DeliveryMethod, LineItemRequest, PaymentType, PlacementRequest, TaxRate,
};
use tienda_postgres::{
    BillStore, CheckoutStore, ClientStore, NewClient, NewProduct, OrderDetailStore, OrderStore,
    ProductStore, StoreError,
};

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    tienda_postgres::migrate(&pool).await.expect("run migrations");
    pool
}

async fn seed_client(pool: &PgPool) -> ClientId {
    let store = ClientStore::new(pool.clone());
    let client = store
        .create(NewClient {
            name: "Ana".to_string(),
            lastname: "Torres".to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            phone: None,
            password: None,
        })
        .await
        .expect("seed client");
    client.id
}

async fn seed_product(pool: &PgPool, price: Money, stock: u32) -> ProductId {
    let store = ProductStore::new(pool.clone());
    let product = store
        .create(NewProduct {
            name: format!("widget-{}", Uuid::new_v4()),
            price,
            stock,
            description: None,
            category_id: None,
        })
        .await
        .expect("seed product");
    product.id
}

async fn stock_of(pool: &PgPool, product: ProductId) -> u32 {
    ProductStore::new(pool.clone())
        .get(product)
        .await
        .expect("product exists")
        .stock
}

fn request(client: ClientId, product: ProductId, quantity: u32) -> PlacementRequest {
    PlacementRequest {
        client_id: client,
        delivery_method: DeliveryMethod::Standard,
        items: vec![LineItemRequest {
            product_id: product,
            quantity,
            declared_price: None,
        }],
    }
}

fn checkout(pool: &PgPool) -> CheckoutStore {
    CheckoutStore::new(pool.clone(), TaxRate::default())
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn placement_decrements_stock_and_derives_bill() {
    let pool = pool().await;
    let client = seed_client(&pool).await;
    let product = seed_product(&pool, Money::from_major_minor(10, 0), 5).await;

    let receipt = checkout(&pool)
        .place_order(&request(client, product, 3), PaymentType::Cash)
        .await
        .expect("placement succeeds");

    assert_eq!(receipt.total, Money::from_major_minor(30, 0));
    assert!(receipt.order_number.as_str().starts_with("ORD-"));
    assert_eq!(stock_of(&pool, product).await, 2);

    // The order total reconciles with its line items.
    let (order, details) = OrderStore::new(pool.clone())
        .get_with_details(receipt.order_id)
        .await
        .expect("order persisted");
    let summed = details
        .iter()
        .fold(Money::zero(), |acc, d| acc + d.extended());
    assert_eq!(summed, order.total);

    // Bill: 30.00 * 1.21 = 36.30, linked back onto the order.
    let bill_id = receipt.bill_id.expect("bill derived");
    let bill = BillStore::new(pool.clone()).get(bill_id).await.expect("bill row");
    assert_eq!(bill.total, Money::from_major_minor(36, 30));
    assert!(bill.bill_number.as_str().starts_with("FACT-"));
    assert_eq!(order.bill_id, Some(bill_id));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn oversell_fails_with_zero_side_effects() {
    let pool = pool().await;
    let client = seed_client(&pool).await;
    let product = seed_product(&pool, Money::from_major_minor(10, 0), 5).await;

    let err = checkout(&pool)
        .place_order(&request(client, product, 10), PaymentType::Cash)
        .await
        .expect_err("oversell must fail");

    match err {
        StoreError::Checkout(CheckoutError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 5);
            assert_eq!(requested, 10);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(stock_of(&pool, product).await, 5);
    let orders = OrderStore::new(pool.clone())
        .list(Some(client), 0, 10)
        .await
        .expect("list orders");
    assert!(orders.is_empty(), "no order row may exist after a failed placement");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn concurrent_placements_never_oversell() {
    let pool = pool().await;
    let client = seed_client(&pool).await;
    let product = seed_product(&pool, Money::from_major_minor(10, 0), 5).await;

    let a = {
        let pool = pool.clone();
        let req = request(client, product, 3);
        tokio::spawn(
            async move { checkout(&pool).place_order(&req, PaymentType::Cash).await },
        )
    };
    let b = {
        let pool = pool.clone();
        let req = request(client, product, 3);
        tokio::spawn(
            async move { checkout(&pool).place_order(&req, PaymentType::Cash).await },
        )
    };

    let results = [a.await.expect("task a"), b.await.expect("task b")];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of two qty-3 placements against stock 5 may win");

    let loser = results
        .iter()
        .find(|r| r.is_err())
        .expect("one placement must lose");
    assert!(matches!(
        loser,
        Err(StoreError::Checkout(CheckoutError::InsufficientStock { .. }))
    ));

    assert_eq!(stock_of(&pool, product).await, 2);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn identical_placements_produce_distinct_orders() {
    let pool = pool().await;
    let client = seed_client(&pool).await;
    let product = seed_product(&pool, Money::from_major_minor(10, 0), 10).await;

    let store = checkout(&pool);
    let first = store
        .place_order(&request(client, product, 2), PaymentType::Cash)
        .await
        .expect("first placement");
    let second = store
        .place_order(&request(client, product, 2), PaymentType::Cash)
        .await
        .expect("second placement");

    // Placement is not idempotent: same input, two orders.
    assert_ne!(first.order_id, second.order_id);
    assert_ne!(first.order_number, second.order_number);
    assert_eq!(stock_of(&pool, product).await, 6);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn second_bill_derivation_is_rejected() {
    let pool = pool().await;
    let client = seed_client(&pool).await;
    let product = seed_product(&pool, Money::from_major_minor(10, 0), 5).await;

    let store = checkout(&pool);
    let receipt = store
        .place_order(&request(client, product, 1), PaymentType::Cash)
        .await
        .expect("placement");
    assert!(receipt.bill_id.is_some());

    let order = OrderStore::new(pool.clone())
        .get(receipt.order_id)
        .await
        .expect("order");
    let err = store
        .derive_bill(&order, PaymentType::Cash)
        .await
        .expect_err("one bill per order");
    assert!(matches!(
        err,
        StoreError::Checkout(CheckoutError::BillAlreadyExists(_))
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn deleting_a_line_item_releases_its_stock() {
    let pool = pool().await;
    let client = seed_client(&pool).await;
    let product = seed_product(&pool, Money::from_major_minor(10, 0), 5).await;

    let receipt = checkout(&pool)
        .place_order(&request(client, product, 3), PaymentType::Cash)
        .await
        .expect("placement");
    assert_eq!(stock_of(&pool, product).await, 2);

    let details = OrderStore::new(pool.clone())
        .details(receipt.order_id)
        .await
        .expect("details");
    OrderDetailStore::new(pool.clone())
        .delete(details[0].id)
        .await
        .expect("delete line item");

    assert_eq!(stock_of(&pool, product).await, 5);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn quantity_update_reconciles_by_the_delta() {
    let pool = pool().await;
    let client = seed_client(&pool).await;
    let product = seed_product(&pool, Money::from_major_minor(10, 0), 5).await;

    let receipt = checkout(&pool)
        .place_order(&request(client, product, 2), PaymentType::Cash)
        .await
        .expect("placement");
    let details = OrderStore::new(pool.clone())
        .details(receipt.order_id)
        .await
        .expect("details");
    let detail_store = OrderDetailStore::new(pool.clone());

    // 2 -> 4 reserves two more units.
    detail_store
        .update_quantity(details[0].id, 4)
        .await
        .expect("increase");
    assert_eq!(stock_of(&pool, product).await, 1);

    // 4 -> 1 releases three.
    detail_store
        .update_quantity(details[0].id, 1)
        .await
        .expect("decrease");
    assert_eq!(stock_of(&pool, product).await, 4);

    // 1 -> 6 needs five; only four are available.
    let err = detail_store
        .update_quantity(details[0].id, 6)
        .await
        .expect_err("delta exceeds stock");
    assert!(matches!(
        err,
        StoreError::Checkout(CheckoutError::InsufficientStock {
            available: 4,
            requested: 5,
            ..
        })
    ));
    assert_eq!(stock_of(&pool, product).await, 4);
}
