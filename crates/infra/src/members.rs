//! Member store: registration, lookup, and rename.

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use storefront_core::{Address, DomainError, MemberId};
use storefront_members::Member;

use crate::error::{conflict_on_unique, StoreError, StoreResult};

/// Canonical member column aliases, shared with the joined order queries.
pub(crate) const MEMBER_COLUMNS: &str = "m.member_id, m.name AS member_name, \
     m.city AS member_city, m.street AS member_street, m.zipcode AS member_zipcode";

pub(crate) fn member_from_row(row: &PgRow) -> StoreResult<Member> {
    let id: uuid::Uuid = row.try_get("member_id")?;
    let name: String = row.try_get("member_name")?;
    let city: String = row.try_get("member_city")?;
    let street: String = row.try_get("member_street")?;
    let zipcode: String = row.try_get("member_zipcode")?;
    Ok(Member::from_parts(
        MemberId::from_uuid(id),
        name,
        Address::new(city, street, zipcode),
    ))
}

/// Load a member on an explicit connection (used inside transactions).
pub(crate) async fn find_member(
    conn: &mut sqlx::PgConnection,
    id: MemberId,
) -> StoreResult<Member> {
    let row = sqlx::query(&format!(
        "SELECT {MEMBER_COLUMNS} FROM members m WHERE m.member_id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(conn)
    .await?
    .ok_or_else(StoreError::not_found)?;
    member_from_row(&row)
}

/// PostgreSQL-backed member store.
#[derive(Debug, Clone)]
pub struct MemberStore {
    pool: Arc<PgPool>,
}

impl MemberStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Register a member, rejecting duplicate names with a conflict.
    ///
    /// Check-then-save; the unique index on `name` backstops the race
    /// between two concurrent registrations.
    #[instrument(skip(self, address), err)]
    pub async fn register(&self, name: &str, address: Address) -> StoreResult<MemberId> {
        let member = Member::register(name, address)?;

        if self.find_by_name(member.name()).await?.is_some() {
            return Err(DomainError::conflict("member with the same name already exists").into());
        }

        sqlx::query(
            "INSERT INTO members (member_id, name, city, street, zipcode) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(member.id_typed().as_uuid())
        .bind(member.name())
        .bind(&member.address().city)
        .bind(&member.address().street)
        .bind(&member.address().zipcode)
        .execute(&*self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "member with the same name already exists"))?;

        Ok(member.id_typed())
    }

    #[instrument(skip(self), fields(member_id = %id), err)]
    pub async fn find_one(&self, id: MemberId) -> StoreResult<Member> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members m WHERE m.member_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(StoreError::not_found)?;
        member_from_row(&row)
    }

    #[instrument(skip(self), err)]
    pub async fn find_all(&self) -> StoreResult<Vec<Member>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members m ORDER BY m.member_id"
        ))
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(member_from_row).collect()
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_name(&self, name: &str) -> StoreResult<Option<Member>> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members m WHERE m.name = $1"
        ))
        .bind(name)
        .fetch_optional(&*self.pool)
        .await?;
        row.as_ref().map(member_from_row).transpose()
    }

    /// Load-then-update rename.
    #[instrument(skip(self), fields(member_id = %id), err)]
    pub async fn update_name(&self, id: MemberId, name: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members m WHERE m.member_id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(StoreError::not_found)?;

        let mut member = member_from_row(&row)?;
        member.rename(name)?;

        sqlx::query("UPDATE members SET name = $2 WHERE member_id = $1")
            .bind(id.as_uuid())
            .bind(member.name())
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "member with the same name already exists"))?;
        tx.commit().await?;

        Ok(())
    }
}
