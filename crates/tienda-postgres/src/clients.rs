//! # Client Store
//!
//! CRUD over the `clients` table. The lifecycle enum is the single source
//! of truth: `is_active` and `deleted_at` are derived from it here, read
//! and written together, and can never drift apart through this store.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tienda_core::ClientId;
use tienda_domain::{Client, ClientLifecycle, DomainError, PasswordHash};

use crate::error::{StoreError, StoreResult};

pub(crate) const CLIENT_COLUMNS: &str =
    "id_key, name, lastname, email, phone, is_active, deleted_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
pub(crate) struct ClientRow {
    id_key: i64,
    name: String,
    lastname: String,
    email: String,
    phone: Option<String>,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl ClientRow {
    pub(crate) fn into_client(self) -> Client {
        let lifecycle = match (self.is_active, self.deleted_at) {
            (true, _) => ClientLifecycle::Active,
            (false, Some(at)) => ClientLifecycle::Deleted { at },
            // Rows predating the lifecycle columns: fall back to creation.
            (false, None) => ClientLifecycle::Deleted {
                at: self.created_at,
            },
        };
        Client {
            id: ClientId::new(self.id_key),
            name: self.name,
            lastname: self.lastname,
            email: self.email,
            phone: self.phone,
            lifecycle,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for client registration.
#[derive(Debug, Clone)]
pub struct NewClient {
    /// Given name.
    pub name: String,
    /// Family name.
    pub lastname: String,
    /// Unique contact email.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Hashed credential, if the client registered with a password.
    pub password: Option<PasswordHash>,
}

/// Partial update for a client; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    /// New given name.
    pub name: Option<String>,
    /// New family name.
    pub lastname: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
}

/// Credential row for login verification.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// The account the credentials belong to.
    pub client_id: ClientId,
    /// Stored hash and salt, absent for passwordless accounts.
    pub password: Option<PasswordHash>,
    /// Whether the account is active.
    pub active: bool,
}

/// Store for customer accounts.
#[derive(Clone)]
pub struct ClientStore {
    pool: PgPool,
}

impl ClientStore {
    /// Wrap a pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a client.
    ///
    /// # Errors
    ///
    /// `Conflict` on a duplicate email.
    pub async fn create(&self, input: NewClient) -> StoreResult<Client> {
        let (hash, salt) = match &input.password {
            Some(p) => (Some(p.hash.as_str()), Some(p.salt.as_str())),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, ClientRow>(
            "INSERT INTO clients (name, lastname, email, phone, password_hash, password_salt)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id_key, name, lastname, email, phone, is_active, deleted_at, created_at, updated_at",
        )
        .bind(&input.name)
        .bind(&input.lastname)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(hash)
        .bind(salt)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(row.into_client())
    }

    /// Fetch a client by key.
    pub async fn get(&self, id: ClientId) -> StoreResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id_key = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "client",
            key: id.as_i64(),
        })?;
        Ok(row.into_client())
    }

    /// List clients, newest first.
    pub async fn list(&self, skip: i64, limit: i64) -> StoreResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY id_key DESC OFFSET $1 LIMIT $2"
        ))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(rows.into_iter().map(ClientRow::into_client).collect())
    }

    /// Apply a partial update.
    pub async fn update(&self, id: ClientId, update: ClientUpdate) -> StoreResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(
            "UPDATE clients
             SET name = COALESCE($2, name),
                 lastname = COALESCE($3, lastname),
                 email = COALESCE($4, email),
                 phone = COALESCE($5, phone),
                 updated_at = now()
             WHERE id_key = $1
             RETURNING id_key, name, lastname, email, phone, is_active, deleted_at, created_at, updated_at",
        )
        .bind(id.as_i64())
        .bind(&update.name)
        .bind(&update.lastname)
        .bind(&update.email)
        .bind(&update.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "client",
            key: id.as_i64(),
        })?;
        Ok(row.into_client())
    }

    /// Soft-delete a client: the row stays, the lifecycle flips once.
    ///
    /// # Errors
    ///
    /// `RowNotFound` for an unknown key, `AlreadyDeleted` for a repeat.
    pub async fn soft_delete(&self, id: ClientId, at: DateTime<Utc>) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE clients SET is_active = FALSE, deleted_at = $2, updated_at = $2
             WHERE id_key = $1 AND is_active",
        )
        .bind(id.as_i64())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }
        // Distinguish "missing" from "already deleted" for the caller.
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id_key = $1)")
                .bind(id.as_i64())
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::from_sqlx)?;
        if exists {
            Err(DomainError::AlreadyDeleted(id).into())
        } else {
            Err(StoreError::RowNotFound {
                entity: "client",
                key: id.as_i64(),
            })
        }
    }

    /// Look up stored credentials for login.
    pub async fn credentials_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<StoredCredentials>> {
        let row = sqlx::query_as::<_, (i64, Option<String>, Option<String>, bool)>(
            "SELECT id_key, password_hash, password_salt, is_active
             FROM clients WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(row.map(|(id_key, hash, salt, active)| StoredCredentials {
            client_id: ClientId::new(id_key),
            password: match (hash, salt) {
                (Some(hash), Some(salt)) => Some(PasswordHash { hash, salt }),
                _ => None,
            },
            active,
        }))
    }
}
