//! # Checkout Planning
//!
//! The pure half of order placement. [`OrderPlan::build`] validates a
//! placement request against the client and a catalog snapshot and
//! produces the plan the persistence layer executes: captured unit prices
//! and a server-side recomputed total. A client-supplied price or total is
//! never trusted.
//!
//! Every precondition failure happens here, before any mutation, so a
//! rejected placement has zero side effects by construction. The stock
//! check against the snapshot is advisory: the authoritative check is the
//! conditional decrement the store performs inside its transaction. Both
//! produce the same [`CheckoutError::InsufficientStock`] shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tienda_core::{ClientId, Money, OrderId, ProductId};

use crate::catalog::Product;
use crate::client::Client;
use crate::order::DeliveryMethod;

/// Failure taxonomy of the order placement workflow.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    /// The client does not exist or is soft-deleted.
    #[error("{0} not found or inactive")]
    ClientNotFound(ClientId),

    /// A requested product does not exist.
    #[error("{0} not found")]
    ProductNotFound(ProductId),

    /// A requested quantity exceeds the available stock.
    #[error("insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// The product that could not be reserved.
        product_id: ProductId,
        /// Units available at check time.
        available: u32,
        /// Units the request asked for.
        requested: u32,
    },

    /// A line item is structurally invalid (empty order, zero quantity,
    /// non-positive price).
    #[error("invalid line item: {0}")]
    InvalidLineItem(String),

    /// A bill already exists for the order.
    #[error("a bill already exists for {0}")]
    BillAlreadyExists(OrderId),
}

/// One requested line of a placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemRequest {
    /// Requested product.
    pub product_id: ProductId,
    /// Requested units.
    pub quantity: u32,
    /// Price echoed by the client. Accepted for wire compatibility,
    /// ignored in favor of the catalog price.
    pub declared_price: Option<Money>,
}

/// A full placement request, as validated input to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    /// Ordering client.
    pub client_id: ClientId,
    /// Chosen delivery method.
    pub delivery_method: DeliveryMethod,
    /// Requested lines. Must be non-empty.
    pub items: Vec<LineItemRequest>,
}

/// One planned line: the catalog price captured at planning time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedLine {
    /// Product to reserve.
    pub product_id: ProductId,
    /// Units to reserve.
    pub quantity: u32,
    /// Captured unit price.
    pub unit_price: Money,
}

impl PlannedLine {
    /// Extended price of the line.
    pub fn extended(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// The validated, priced plan for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlan {
    /// Ordering client.
    pub client_id: ClientId,
    /// Chosen delivery method.
    pub delivery_method: DeliveryMethod,
    /// Planned lines, in request order.
    pub lines: Vec<PlannedLine>,
    /// Sum of line extensions.
    pub total: Money,
}

impl OrderPlan {
    /// Aggregate demand per product, in first-appearance order. This is
    /// what the store decrements: one conditional update per product, so
    /// duplicate lines reserve their combined quantity atomically.
    pub fn demand(&self) -> Vec<(ProductId, u32)> {
        let mut order: Vec<ProductId> = Vec::new();
        let mut tally: HashMap<ProductId, u32> = HashMap::new();
        for line in &self.lines {
            if !tally.contains_key(&line.product_id) {
                order.push(line.product_id);
            }
            *tally.entry(line.product_id).or_insert(0) += line.quantity;
        }
        order.into_iter().map(|id| (id, tally[&id])).collect()
    }

    /// Validate a request against the client and a catalog snapshot.
    ///
    /// Checks run in the contract's order: client active, products exist,
    /// quantities positive, stock sufficient (aggregated per product, so
    /// two lines for the same product cannot jointly oversubscribe it).
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]. The first failing check wins.
    pub fn build(
        client: &Client,
        request: &PlacementRequest,
        catalog: &[Product],
    ) -> Result<Self, CheckoutError> {
        if !client.is_active() {
            return Err(CheckoutError::ClientNotFound(client.id));
        }
        if request.items.is_empty() {
            return Err(CheckoutError::InvalidLineItem(
                "order has no line items".to_string(),
            ));
        }

        let by_id: HashMap<ProductId, &Product> =
            catalog.iter().map(|p| (p.id, p)).collect();

        // Existence and quantity checks first, across all lines, so the
        // reported error is the contract's earliest failing precondition.
        for item in &request.items {
            if !by_id.contains_key(&item.product_id) {
                return Err(CheckoutError::ProductNotFound(item.product_id));
            }
        }
        for item in &request.items {
            if item.quantity == 0 {
                return Err(CheckoutError::InvalidLineItem(format!(
                    "quantity for {} must be positive",
                    item.product_id
                )));
            }
        }

        // Stock check on the aggregate demand per product.
        let mut demanded: HashMap<ProductId, u32> = HashMap::new();
        for item in &request.items {
            *demanded.entry(item.product_id).or_insert(0) += item.quantity;
        }
        for item in &request.items {
            let product = by_id[&item.product_id];
            let requested = demanded[&item.product_id];
            if product.stock < requested {
                return Err(CheckoutError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock,
                    requested,
                });
            }
        }

        let mut lines = Vec::with_capacity(request.items.len());
        let mut total = Money::zero();
        for item in &request.items {
            let product = by_id[&item.product_id];
            if !product.price.is_positive() {
                return Err(CheckoutError::InvalidLineItem(format!(
                    "{} has a non-positive price",
                    product.id
                )));
            }
            let line = PlannedLine {
                product_id: product.id,
                quantity: item.quantity,
                unit_price: product.price,
            };
            total += line.extended();
            lines.push(line);
        }

        Ok(Self {
            client_id: client.id,
            delivery_method: request.delivery_method,
            lines,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientLifecycle;
    use chrono::Utc;

    fn client(id: i64) -> Client {
        Client {
            id: ClientId::new(id),
            name: "Ana".to_string(),
            lastname: "Torres".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            lifecycle: ClientLifecycle::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn product(id: i64, price: Money, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            price,
            stock,
            description: None,
            category_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn request(items: Vec<LineItemRequest>) -> PlacementRequest {
        PlacementRequest {
            client_id: ClientId::new(1),
            delivery_method: DeliveryMethod::Standard,
            items,
        }
    }

    fn line(product_id: i64, quantity: u32) -> LineItemRequest {
        LineItemRequest {
            product_id: ProductId::new(product_id),
            quantity,
            declared_price: None,
        }
    }

    #[test]
    fn test_total_is_sum_of_line_extensions() {
        // Stock 5 at 10.00, quantity 3: total 30.00.
        let catalog = vec![product(1, Money::from_major_minor(10, 0), 5)];
        let plan = OrderPlan::build(&client(1), &request(vec![line(1, 3)]), &catalog).unwrap();
        assert_eq!(plan.total, Money::from_major_minor(30, 0));
        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].unit_price, Money::from_major_minor(10, 0));
        let summed = plan
            .lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.extended());
        assert_eq!(summed, plan.total);
    }

    #[test]
    fn test_inactive_client_reports_client_not_found() {
        let mut c = client(1);
        c.soft_delete(Utc::now()).unwrap();
        let catalog = vec![product(1, Money::from_major_minor(10, 0), 5)];
        let err = OrderPlan::build(&c, &request(vec![line(1, 1)]), &catalog).unwrap_err();
        assert_eq!(err, CheckoutError::ClientNotFound(ClientId::new(1)));
    }

    #[test]
    fn test_empty_order_is_invalid() {
        let err = OrderPlan::build(&client(1), &request(vec![]), &[]).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidLineItem(_)));
    }

    #[test]
    fn test_unknown_product_names_the_product() {
        let catalog = vec![product(1, Money::from_major_minor(10, 0), 5)];
        let err =
            OrderPlan::build(&client(1), &request(vec![line(1, 1), line(9, 1)]), &catalog)
                .unwrap_err();
        assert_eq!(err, CheckoutError::ProductNotFound(ProductId::new(9)));
    }

    #[test]
    fn test_zero_quantity_is_invalid() {
        let catalog = vec![product(1, Money::from_major_minor(10, 0), 5)];
        let err = OrderPlan::build(&client(1), &request(vec![line(1, 0)]), &catalog).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidLineItem(_)));
    }

    #[test]
    fn test_insufficient_stock_carries_available_and_requested() {
        // Stock 5, requested 10: the error must carry both numbers.
        let catalog = vec![product(1, Money::from_major_minor(10, 0), 5)];
        let err = OrderPlan::build(&client(1), &request(vec![line(1, 10)]), &catalog).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::InsufficientStock {
                product_id: ProductId::new(1),
                available: 5,
                requested: 10,
            }
        );
    }

    #[test]
    fn test_duplicate_product_lines_cannot_jointly_oversubscribe() {
        let catalog = vec![product(1, Money::from_major_minor(10, 0), 5)];
        let err =
            OrderPlan::build(&client(1), &request(vec![line(1, 3), line(1, 3)]), &catalog)
                .unwrap_err();
        assert_eq!(
            err,
            CheckoutError::InsufficientStock {
                product_id: ProductId::new(1),
                available: 5,
                requested: 6,
            }
        );
    }

    #[test]
    fn test_declared_price_is_ignored() {
        let catalog = vec![product(1, Money::from_major_minor(10, 0), 5)];
        let mut item = line(1, 2);
        item.declared_price = Some(Money::from_major_minor(1, 0));
        let plan = OrderPlan::build(&client(1), &request(vec![item]), &catalog).unwrap();
        assert_eq!(plan.lines[0].unit_price, Money::from_major_minor(10, 0));
        assert_eq!(plan.total, Money::from_major_minor(20, 0));
    }

    #[test]
    fn test_demand_aggregates_duplicate_products() {
        let catalog = vec![
            product(1, Money::from_major_minor(10, 0), 10),
            product(2, Money::from_major_minor(1, 0), 10),
        ];
        let plan = OrderPlan::build(
            &client(1),
            &request(vec![line(1, 2), line(2, 1), line(1, 3)]),
            &catalog,
        )
        .unwrap();
        assert_eq!(
            plan.demand(),
            vec![(ProductId::new(1), 5), (ProductId::new(2), 1)]
        );
    }

    #[test]
    fn test_multi_product_plan_preserves_request_order() {
        let catalog = vec![
            product(1, Money::from_major_minor(10, 0), 5),
            product(2, Money::from_major_minor(2, 50), 8),
        ];
        let plan =
            OrderPlan::build(&client(1), &request(vec![line(2, 4), line(1, 1)]), &catalog)
                .unwrap();
        assert_eq!(plan.lines[0].product_id, ProductId::new(2));
        assert_eq!(plan.lines[1].product_id, ProductId::new(1));
        assert_eq!(plan.total, Money::from_major_minor(20, 0));
    }
}
