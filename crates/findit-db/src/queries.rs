use chrono::{DateTime, Utc};
use findit_types::models::{Category, Item, User};
use rusqlite::{Connection, ErrorCode, Row};

use crate::Database;
use crate::models::{
    CategoryRow, ItemPage, ItemQuery, ItemRow, NewItem, PAGE_SIZE, UserRow, format_timestamp,
};
use anyhow::Result;

const ITEM_COLUMNS: &str =
    "id, type, title, description, category, location, image_url, status, created_at, user_id";

impl Database {
    // -- Users --

    /// Insert a user with an already-canonical phone.
    /// Returns `None` when the phone is taken; no row is written in that case.
    pub fn create_user(&self, phone: &str, name: &str) -> Result<Option<User>> {
        self.with_conn_mut(|conn| {
            match conn.execute(
                "INSERT INTO users (phone, name) VALUES (?1, ?2)",
                (phone, name),
            ) {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }

            let id = conn.last_insert_rowid();
            Ok(query_user_by_id(conn, id)?.map(User::from))
        })
    }

    pub fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        self.with_conn(|conn| Ok(query_user_by_phone(conn, phone)?.map(User::from)))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| Ok(query_user_by_id(conn, id)?.map(User::from)))
    }

    #[cfg(test)]
    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
        })
    }

    // -- Categories --

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, icon FROM category ORDER BY name")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CategoryRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        icon: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows.into_iter().map(Category::from).collect())
        })
    }

    // -- Items --

    pub fn create_item(&self, item: &NewItem) -> Result<Item> {
        self.create_item_at(item, Utc::now())
    }

    /// Insert with an explicit creation time. Used by seeding and tests that
    /// need a deterministic order.
    pub fn create_item_at(&self, item: &NewItem, created_at: DateTime<Utc>) -> Result<Item> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO items (type, title, description, category, location, image_url, status, created_at, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'active', ?7, ?8)",
                rusqlite::params![
                    item.kind.as_str(),
                    item.title,
                    item.description,
                    item.category,
                    item.location,
                    item.image_url,
                    format_timestamp(created_at),
                    item.user_id,
                ],
            )?;

            let id = conn.last_insert_rowid();
            query_item_by_id(conn, id)?
                .map(Item::from)
                .ok_or_else(|| anyhow::anyhow!("Inserted item {} vanished", id))
        })
    }

    #[cfg(test)]
    pub fn get_item(&self, id: i64) -> Result<Option<Item>> {
        self.with_conn(|conn| Ok(query_item_by_id(conn, id)?.map(Item::from)))
    }

    /// One page of active items, newest first.
    pub fn list_items(&self, query: &ItemQuery) -> Result<ItemPage> {
        self.with_conn(|conn| {
            let mut rows = query_active_items(conn, query)?;

            // One row past the page tells us whether another page exists
            let has_next = rows.len() as i64 > PAGE_SIZE;
            rows.truncate(PAGE_SIZE as usize);

            Ok(ItemPage {
                items: rows.into_iter().map(Item::from).collect(),
                has_next,
                page: query.page,
            })
        })
    }

    /// Mark an owned, active item as resolved.
    /// Returns false if the item is missing, owned by someone else, or already resolved.
    pub fn resolve_item(&self, item_id: i64, user_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE items SET status = 'resolved'
                 WHERE id = ?1 AND user_id = ?2 AND status = 'active'",
                (item_id, user_id),
            )?;
            Ok(changed == 1)
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        phone: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ItemRow> {
    Ok(ItemRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        location: row.get(5)?,
        image_url: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        user_id: row.get(9)?,
    })
}

fn query_user_by_phone(conn: &Connection, phone: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, phone, name, created_at FROM users WHERE phone = ?1")?;

    let row = stmt.query_row([phone], user_from_row).optional()?;

    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare("SELECT id, phone, name, created_at FROM users WHERE id = ?1")?;

    let row = stmt.query_row([id], user_from_row).optional()?;

    Ok(row)
}

fn query_item_by_id(conn: &Connection, id: i64) -> Result<Option<ItemRow>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([id], item_from_row).optional()?;

    Ok(row)
}

/// Fetches up to `PAGE_SIZE + 1` rows. Absent filters bind as NULL, which
/// the `?n IS NULL OR ...` guards turn into a match-all.
fn query_active_items(conn: &Connection, query: &ItemQuery) -> Result<Vec<ItemRow>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS}
         FROM items
         WHERE status = 'active'
           AND (?1 IS NULL OR type = ?1)
           AND (?2 IS NULL OR category = ?2)
         ORDER BY created_at DESC, id DESC
         LIMIT ?3 OFFSET ?4"
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(
            rusqlite::params![
                query.filter.kind.map(|k| k.as_str()),
                query.filter.category.as_deref(),
                PAGE_SIZE + 1,
                query.offset(),
            ],
            item_from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
