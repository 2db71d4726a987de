//! # Address Store

use sqlx::PgPool;

use tienda_core::{AddressId, ClientId};
use tienda_domain::Address;

use crate::error::{StoreError, StoreResult};

#[derive(sqlx::FromRow)]
struct AddressRow {
    id_key: i64,
    client_id: i64,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
}

impl AddressRow {
    fn into_address(self) -> Address {
        Address {
            id: AddressId::new(self.id_key),
            client_id: ClientId::new(self.client_id),
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
        }
    }
}

/// Input for address creation and replacement.
#[derive(Debug, Clone, Default)]
pub struct AddressInput {
    /// Street line.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub zip_code: Option<String>,
}

/// Store for client shipping addresses.
#[derive(Clone)]
pub struct AddressStore {
    pool: PgPool,
}

impl AddressStore {
    /// Wrap a pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an address for a client.
    ///
    /// # Errors
    ///
    /// `ForeignKey` when the client does not exist.
    pub async fn create(&self, client: ClientId, input: AddressInput) -> StoreResult<Address> {
        let row = sqlx::query_as::<_, AddressRow>(
            "INSERT INTO addresses (client_id, street, city, state, zip_code)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id_key, client_id, street, city, state, zip_code",
        )
        .bind(client.as_i64())
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(row.into_address())
    }

    /// Fetch an address by key.
    pub async fn get(&self, id: AddressId) -> StoreResult<Address> {
        let row = sqlx::query_as::<_, AddressRow>(
            "SELECT id_key, client_id, street, city, state, zip_code
             FROM addresses WHERE id_key = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "address",
            key: id.as_i64(),
        })?;
        Ok(row.into_address())
    }

    /// List a client's addresses.
    pub async fn list_for_client(&self, client: ClientId) -> StoreResult<Vec<Address>> {
        let rows = sqlx::query_as::<_, AddressRow>(
            "SELECT id_key, client_id, street, city, state, zip_code
             FROM addresses WHERE client_id = $1 ORDER BY id_key",
        )
        .bind(client.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(rows.into_iter().map(AddressRow::into_address).collect())
    }

    /// Replace the mutable fields of an address.
    pub async fn update(&self, id: AddressId, input: AddressInput) -> StoreResult<Address> {
        let row = sqlx::query_as::<_, AddressRow>(
            "UPDATE addresses
             SET street = COALESCE($2, street),
                 city = COALESCE($3, city),
                 state = COALESCE($4, state),
                 zip_code = COALESCE($5, zip_code)
             WHERE id_key = $1
             RETURNING id_key, client_id, street, city, state, zip_code",
        )
        .bind(id.as_i64())
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "address",
            key: id.as_i64(),
        })?;
        Ok(row.into_address())
    }

    /// Delete an address.
    pub async fn delete(&self, id: AddressId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM addresses WHERE id_key = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound {
                entity: "address",
                key: id.as_i64(),
            });
        }
        Ok(())
    }
}
