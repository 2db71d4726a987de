//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the tienda backend.
//! These prevent accidental identifier confusion — you cannot pass a
//! `ClientId` where an `OrderId` is expected, even though both are backed
//! by the same `BIGSERIAL` column type.

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw database key.
            pub const fn new(key: i64) -> Self {
                Self(key)
            }

            /// Access the raw database key.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(key: i64) -> Self {
                Self(key)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

id_newtype!(
    /// Unique identifier for a customer account.
    ClientId,
    "client"
);

id_newtype!(
    /// Unique identifier for a catalog product.
    ProductId,
    "product"
);

id_newtype!(
    /// Unique identifier for a product category.
    CategoryId,
    "category"
);

id_newtype!(
    /// Unique identifier for a client shipping address.
    AddressId,
    "address"
);

id_newtype!(
    /// Unique identifier for an order header.
    OrderId,
    "order"
);

id_newtype!(
    /// Unique identifier for one order line item.
    OrderDetailId,
    "order-detail"
);

id_newtype!(
    /// Unique identifier for a bill.
    BillId,
    "bill"
);

id_newtype!(
    /// Unique identifier for a product review.
    ReviewId,
    "review"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_namespace_prefix() {
        assert_eq!(ClientId::new(42).to_string(), "client:42");
        assert_eq!(OrderId::new(7).to_string(), "order:7");
        assert_eq!(BillId::new(1).to_string(), "bill:1");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = ProductId::new(9);
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        let back: ProductId = serde_json::from_str("9").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_round_trip_raw_key() {
        let id = OrderDetailId::from(123);
        assert_eq!(id.as_i64(), 123);
    }
}
