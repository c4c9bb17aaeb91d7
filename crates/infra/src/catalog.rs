//! Item and category stores.

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use tracing::instrument;

use storefront_catalog::{Category, Item, ItemKind};
use storefront_core::{CategoryId, ItemId};

use crate::error::{StoreError, StoreResult};

/// Canonical item column aliases, shared with the joined order queries.
pub(crate) const ITEM_COLUMNS: &str = "i.item_id, i.kind AS item_kind, i.name AS item_name, \
     i.price AS item_price, i.stock_quantity AS item_stock_quantity, \
     i.author AS item_author, i.isbn AS item_isbn, i.artist AS item_artist, i.etc AS item_etc, \
     i.director AS item_director, i.actor AS item_actor";

pub(crate) fn item_from_row(row: &PgRow) -> StoreResult<Item> {
    let id: uuid::Uuid = row.try_get("item_id")?;
    let discriminator: String = row.try_get("item_kind")?;
    let name: String = row.try_get("item_name")?;
    let price: i64 = row.try_get("item_price")?;
    let stock_quantity: i64 = row.try_get("item_stock_quantity")?;

    let text = |column: &str| -> Result<String, sqlx::Error> {
        Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
    };
    let kind = match discriminator.as_str() {
        "book" => ItemKind::Book {
            author: text("item_author")?,
            isbn: text("item_isbn")?,
        },
        "album" => ItemKind::Album {
            artist: text("item_artist")?,
            etc: text("item_etc")?,
        },
        "movie" => ItemKind::Movie {
            director: text("item_director")?,
            actor: text("item_actor")?,
        },
        other => {
            return Err(StoreError::corrupt(format!("unknown item kind: {other}")));
        }
    };

    Ok(Item::from_parts(
        ItemId::from_uuid(id),
        kind,
        name,
        price,
        stock_quantity,
    ))
}

/// Load an item row-locked for the rest of the transaction.
///
/// Placement and cancellation take this lock so concurrent stock updates
/// serialize instead of losing writes.
pub(crate) async fn find_item_for_update(
    conn: &mut PgConnection,
    id: ItemId,
) -> StoreResult<Item> {
    let row = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS} FROM items i WHERE i.item_id = $1 FOR UPDATE"
    ))
    .bind(id.as_uuid())
    .fetch_optional(conn)
    .await?
    .ok_or_else(StoreError::not_found)?;
    item_from_row(&row)
}

pub(crate) async fn save_item_stock(conn: &mut PgConnection, item: &Item) -> StoreResult<()> {
    sqlx::query("UPDATE items SET stock_quantity = $2 WHERE item_id = $1")
        .bind(item.id_typed().as_uuid())
        .bind(item.stock_quantity())
        .execute(conn)
        .await?;
    Ok(())
}

/// PostgreSQL-backed item store.
#[derive(Debug, Clone)]
pub struct ItemStore {
    pool: Arc<PgPool>,
}

impl ItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self, kind), err)]
    pub async fn create(
        &self,
        kind: ItemKind,
        name: &str,
        price: i64,
        stock_quantity: i64,
    ) -> StoreResult<ItemId> {
        let item = Item::create(kind, name, price, stock_quantity)?;

        let (author, isbn, artist, etc, director, actor) = match item.kind() {
            ItemKind::Book { author, isbn } => {
                (Some(author), Some(isbn), None, None, None, None)
            }
            ItemKind::Album { artist, etc } => (None, None, Some(artist), Some(etc), None, None),
            ItemKind::Movie { director, actor } => {
                (None, None, None, None, Some(director), Some(actor))
            }
        };

        sqlx::query(
            "INSERT INTO items \
                 (item_id, kind, name, price, stock_quantity, \
                  author, isbn, artist, etc, director, actor) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(item.id_typed().as_uuid())
        .bind(item.kind().discriminator())
        .bind(item.name())
        .bind(item.price())
        .bind(item.stock_quantity())
        .bind(author)
        .bind(isbn)
        .bind(artist)
        .bind(etc)
        .bind(director)
        .bind(actor)
        .execute(&*self.pool)
        .await?;

        Ok(item.id_typed())
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    pub async fn find_one(&self, id: ItemId) -> StoreResult<Item> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items i WHERE i.item_id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await?
            .ok_or_else(StoreError::not_found)?;
        item_from_row(&row)
    }

    #[instrument(skip(self), err)]
    pub async fn find_all(&self) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items i ORDER BY i.item_id"))
            .fetch_all(&*self.pool)
            .await?;
        rows.iter().map(item_from_row).collect()
    }
}

const CATEGORY_COLUMNS: &str = "c.category_id, c.name AS category_name, c.parent_id";

fn category_from_row(row: &PgRow) -> StoreResult<Category> {
    let id: uuid::Uuid = row.try_get("category_id")?;
    let name: String = row.try_get("category_name")?;
    let parent_id: Option<uuid::Uuid> = row.try_get("parent_id")?;
    Ok(Category::from_parts(
        CategoryId::from_uuid(id),
        name,
        parent_id.map(CategoryId::from_uuid),
    ))
}

/// PostgreSQL-backed category store.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    pool: Arc<PgPool>,
}

impl CategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn create(&self, name: &str) -> StoreResult<CategoryId> {
        let category = Category::create(name)?;
        sqlx::query("INSERT INTO categories (category_id, name, parent_id) VALUES ($1, $2, NULL)")
            .bind(category.id_typed().as_uuid())
            .bind(category.name())
            .execute(&*self.pool)
            .await?;
        Ok(category.id_typed())
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    pub async fn find_one(&self, id: CategoryId) -> StoreResult<Category> {
        let row = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.category_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(StoreError::not_found)?;
        category_from_row(&row)
    }

    /// Children of a category (the parent side of the hierarchy is a query,
    /// not a stored collection).
    #[instrument(skip(self), fields(category_id = %id), err)]
    pub async fn children(&self, id: CategoryId) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.parent_id = $1 ORDER BY c.category_id"
        ))
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(category_from_row).collect()
    }

    /// Attach `child_id` under `parent_id`.
    ///
    /// Both sides of the old bidirectional association collapse into this one
    /// owning operation: parent existence check and child update happen in
    /// the same transaction.
    #[instrument(skip(self), fields(parent_id = %parent_id, child_id = %child_id), err)]
    pub async fn add_child(&self, parent_id: CategoryId, child_id: CategoryId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT 1 FROM categories WHERE category_id = $1")
            .bind(parent_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(StoreError::not_found)?;

        let row = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.category_id = $1 FOR UPDATE"
        ))
        .bind(child_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(StoreError::not_found)?;

        let mut child = category_from_row(&row)?;
        child.assign_parent(parent_id)?;

        sqlx::query("UPDATE categories SET parent_id = $2 WHERE category_id = $1")
            .bind(child_id.as_uuid())
            .bind(parent_id.as_uuid())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Link an item into a category (many-to-many join table).
    #[instrument(skip(self), fields(category_id = %category_id, item_id = %item_id), err)]
    pub async fn attach_item(&self, category_id: CategoryId, item_id: ItemId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT 1 FROM categories WHERE category_id = $1")
            .bind(category_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(StoreError::not_found)?;
        sqlx::query("SELECT 1 FROM items WHERE item_id = $1")
            .bind(item_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(StoreError::not_found)?;

        sqlx::query(
            "INSERT INTO category_items (category_id, item_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(category_id.as_uuid())
        .bind(item_id.as_uuid())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Items linked to a category.
    #[instrument(skip(self), fields(category_id = %id), err)]
    pub async fn items(&self, id: CategoryId) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items i \
             JOIN category_items ci ON ci.item_id = i.item_id \
             WHERE ci.category_id = $1 ORDER BY i.item_id"
        ))
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(item_from_row).collect()
    }
}
