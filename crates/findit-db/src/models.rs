//! Database row types. These map directly to SQLite rows; conversion into the
//! shared `findit-types` models happens here so callers never see raw text
//! timestamps.

use chrono::{DateTime, NaiveDateTime, Utc};
use findit_types::models::{Category, Item, ItemKind, ItemStatus, User};
use tracing::warn;

/// Listing page size for `list_items`.
pub const PAGE_SIZE: i64 = 10;

/// Layout of every `created_at` column. Sorts lexicographically in time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub struct UserRow {
    pub id: i64,
    pub phone: String,
    pub name: String,
    pub created_at: String,
}

pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub icon: String,
}

pub struct ItemRow {
    pub id: i64,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: String,
    pub user_id: Option<i64>,
}

/// Values for a new listing. Status and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub kind: ItemKind,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub image_url: Option<String>,
    pub user_id: Option<i64>,
}

/// Optional exact-match filters applied on top of `status = 'active'`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub kind: Option<ItemKind>,
    pub category: Option<String>,
}

impl ItemFilter {
    /// Build a filter from raw query values. Unknown types (including `all`)
    /// and empty categories mean "no filter".
    pub fn from_params(kind: &str, category: &str) -> Self {
        Self {
            kind: kind.parse().ok(),
            category: (!category.is_empty()).then(|| category.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub page: i64,
    pub filter: ItemFilter,
}

impl ItemQuery {
    pub fn new(page: i64, filter: ItemFilter) -> Self {
        Self {
            page: page.max(1),
            filter,
        }
    }

    /// Saturates for absurd page numbers; such a page is simply empty.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(PAGE_SIZE)
    }
}

#[derive(Debug, Clone)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub has_next: bool,
    pub page: i64,
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts both our millisecond layout and
/// SQLite's plain `datetime('now')` output.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .or_else(|_| raw.parse::<DateTime<Utc>>())
        .ok()
}

fn timestamp_or_default(raw: &str, what: &str, id: i64) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on {} {}", raw, what, id);
        DateTime::default()
    })
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let created_at = timestamp_or_default(&row.created_at, "user", row.id);
        Self {
            id: row.id,
            phone: row.phone,
            name: row.name,
            created_at,
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            icon: row.icon,
        }
    }
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        let kind = row.kind.parse().unwrap_or_else(|e| {
            warn!("Corrupt type on item {}: {}", row.id, e);
            ItemKind::Lost
        });
        let status = row.status.parse().unwrap_or_else(|e| {
            warn!("Corrupt status on item {}: {}", row.id, e);
            ItemStatus::Resolved
        });
        let created_at = timestamp_or_default(&row.created_at, "item", row.id);

        Self {
            id: row.id,
            kind,
            title: row.title,
            description: row.description,
            category: row.category,
            location: row.location,
            image_url: row.image_url,
            status,
            created_at,
            user_id: row.user_id,
        }
    }
}
