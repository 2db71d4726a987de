//! # tienda-domain — Domain Model and Invariant-Bearing Logic
//!
//! Entities and the rules that constrain them. Everything here is pure:
//! no I/O, no database handles, no clocks other than timestamps passed in
//! by the caller. The persistence crate executes what this crate plans.
//!
//! ## Modules
//!
//! - [`client`] — customer accounts with an explicit lifecycle state
//!   (Active | Deleted), never a drifting flag/timestamp pair.
//! - [`catalog`] — products, categories, and purchase-tied reviews.
//! - [`order`] — order and line-item types, the order status machine, and
//!   delivery methods.
//! - [`checkout`] — the pure order planner: validates a placement request
//!   against the client and catalog snapshot and produces an [`checkout::OrderPlan`]
//!   with captured unit prices and a recomputed total.
//! - [`billing`] — tax-rate configuration and bill derivation from a
//!   persisted order.
//! - [`numbering`] — date-prefixed randomized order and bill numbers.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod billing;
pub mod catalog;
pub mod checkout;
pub mod client;
pub mod error;
pub mod numbering;
pub mod order;

pub use billing::{Bill, BillDraft, PaymentType, TaxRate};
pub use catalog::{Category, Product, Rating, Review};
pub use checkout::{CheckoutError, LineItemRequest, OrderPlan, PlacementRequest, PlannedLine};
pub use client::{Address, Client, ClientLifecycle, PasswordHash};
pub use error::DomainError;
pub use numbering::{BillNumber, OrderNumber};
pub use order::{DeliveryMethod, Order, OrderDetail, OrderStatus};
