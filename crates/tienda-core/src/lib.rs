//! # tienda-core — Foundational Types for the tienda Backend
//!
//! This crate is the bedrock of the tienda stack. It defines the type-system
//! primitives shared by every other crate in the workspace; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `ClientId`, `ProductId`,
//!    `OrderId`, `BillId` — all newtypes over the database key. No bare
//!    `i64`s for identifiers across crate boundaries.
//!
//! 2. **Exact-decimal money.** ALL monetary arithmetic flows through
//!    [`Money`], a two-fractional-digit `rust_decimal` wrapper. `f64`
//!    appears only at the JSON boundary, converted explicitly.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tienda-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod money;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use identity::{
    AddressId, BillId, CategoryId, ClientId, OrderDetailId, OrderId, ProductId, ReviewId,
};
pub use money::Money;
