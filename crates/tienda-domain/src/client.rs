//! # Client Accounts and Lifecycle
//!
//! Customer identity with an explicit lifecycle state. The original design
//! this replaces tracked deletion as a boolean flag plus a nullable
//! timestamp that could drift apart; here the two are a single enum, and
//! the persistence layer derives both columns from it in one place.
//!
//! Clients are never physically removed: orders and bills reference them,
//! so deletion is a lifecycle transition that keeps the row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tienda_core::{AddressId, ClientId};

use crate::error::DomainError;

/// Lifecycle state of a client account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClientLifecycle {
    /// Account is live and may place orders.
    Active,
    /// Account was soft-deleted at the recorded instant.
    Deleted {
        /// When the account was deleted.
        at: DateTime<Utc>,
    },
}

impl ClientLifecycle {
    /// Whether the account may act (place orders, be billed).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Deletion instant, if the account was deleted.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(*at),
        }
    }
}

/// A customer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Database key.
    pub id: ClientId,
    /// Given name.
    pub name: String,
    /// Family name.
    pub lastname: String,
    /// Unique contact email.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Lifecycle state.
    pub lifecycle: ClientLifecycle,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant, if any.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Client {
    /// Whether the account may place orders.
    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    /// Transition the account to `Deleted`.
    ///
    /// # Errors
    ///
    /// Rejects a second deletion; the recorded instant must not move.
    pub fn soft_delete(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        match self.lifecycle {
            ClientLifecycle::Active => {
                self.lifecycle = ClientLifecycle::Deleted { at };
                Ok(())
            }
            ClientLifecycle::Deleted { .. } => Err(DomainError::AlreadyDeleted(self.id)),
        }
    }
}

/// Stored password credential: salted SHA-256, both parts hex-encoded.
///
/// Hashing itself lives in the API crate; this is only the persisted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    /// Hex-encoded digest.
    pub hash: String,
    /// Hex-encoded random salt.
    pub salt: String,
}

/// A client shipping address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Database key.
    pub id: AddressId,
    /// Owning client.
    pub client_id: ClientId,
    /// Street line.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub zip_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> Client {
        Client {
            id: ClientId::new(1),
            name: "Ana".to_string(),
            lastname: "Torres".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            lifecycle: ClientLifecycle::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_new_client_is_active() {
        let c = make_client();
        assert!(c.is_active());
        assert_eq!(c.lifecycle.deleted_at(), None);
    }

    #[test]
    fn test_soft_delete_records_instant() {
        let mut c = make_client();
        let at = Utc::now();
        c.soft_delete(at).unwrap();
        assert!(!c.is_active());
        assert_eq!(c.lifecycle.deleted_at(), Some(at));
    }

    #[test]
    fn test_lifecycle_serializes_as_a_tagged_state() {
        let active = serde_json::to_value(ClientLifecycle::Active).unwrap();
        assert_eq!(active["state"], "active");

        let at = Utc::now();
        let deleted = serde_json::to_value(ClientLifecycle::Deleted { at }).unwrap();
        assert_eq!(deleted["state"], "deleted");
        assert!(deleted["at"].is_string());
    }

    #[test]
    fn test_double_delete_is_rejected() {
        let mut c = make_client();
        let first = Utc::now();
        c.soft_delete(first).unwrap();
        let err = c.soft_delete(Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::AlreadyDeleted(ClientId::new(1)));
        // The original instant must survive the failed attempt.
        assert_eq!(c.lifecycle.deleted_at(), Some(first));
    }
}
