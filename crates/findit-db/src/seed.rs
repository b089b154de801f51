use anyhow::Result;
use chrono::{Duration, Utc};
use findit_types::models::ItemKind;
use tracing::info;

use crate::Database;
use crate::models::format_timestamp;

/// Built-in categories with their display glyphs.
pub const DEFAULT_CATEGORIES: [(&str, &str); 11] = [
    ("Electronics", "📱"),
    ("Documents", "📄"),
    ("Jewelry", "💎"),
    ("Bags", "🎒"),
    ("Clothing", "👕"),
    ("Keys", "🔑"),
    ("Pets", "🐕"),
    ("Vehicles", "🚗"),
    ("Books", "📚"),
    ("Money", "💰"),
    ("Others", "📦"),
];

struct SampleItem {
    kind: ItemKind,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    location: &'static str,
    image: &'static str,
}

const SAMPLE_ITEMS: [SampleItem; 4] = [
    SampleItem {
        kind: ItemKind::Lost,
        title: "iPhone 13 Pro Max",
        description: "Lost my black iPhone near Nakumatt Oasis Mall.",
        category: "Electronics",
        location: "Kampala",
        image: "iphone.jpg",
    },
    SampleItem {
        kind: ItemKind::Found,
        title: "Black Wallet",
        description: "Found wallet with IDs and cards inside.",
        category: "Others",
        location: "Wakiso",
        image: "wallet.jpg",
    },
    SampleItem {
        kind: ItemKind::Lost,
        title: "School Bag",
        description: "Red backpack with school books and calculator.",
        category: "Bags",
        location: "Mukono",
        image: "bag.jpg",
    },
    SampleItem {
        kind: ItemKind::Found,
        title: "Car Keys",
        description: "Set of Toyota car keys found in parking lot.",
        category: "Keys",
        location: "Kampala",
        image: "keys.jpg",
    },
];

/// What a seed run actually inserted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub items: usize,
}

impl Database {
    /// Insert reference data into empty tables. Safe to run on every startup.
    pub fn seed(&self, with_samples: bool) -> Result<SeedReport> {
        let report = self.with_conn_mut(|conn| {
            let mut report = SeedReport::default();
            let tx = conn.transaction()?;

            let categories: i64 = tx.query_row("SELECT COUNT(*) FROM category", [], |r| r.get(0))?;
            if categories == 0 {
                let mut stmt = tx.prepare("INSERT INTO category (name, icon) VALUES (?1, ?2)")?;
                for (name, icon) in DEFAULT_CATEGORIES {
                    stmt.execute((name, icon))?;
                    report.categories += 1;
                }
            }

            if with_samples {
                let items: i64 = tx.query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))?;
                if items == 0 {
                    // Listed newest first
                    let now = Utc::now();
                    let mut stmt = tx.prepare(
                        "INSERT INTO items (type, title, description, category, location, image_url, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    )?;
                    for (i, sample) in SAMPLE_ITEMS.iter().enumerate() {
                        let created_at = format_timestamp(now - Duration::minutes(i as i64));
                        stmt.execute(rusqlite::params![
                            sample.kind.as_str(),
                            sample.title,
                            sample.description,
                            sample.category,
                            sample.location,
                            sample.image,
                            created_at,
                        ])?;
                        report.items += 1;
                    }
                }
            }

            tx.commit()?;
            Ok(report)
        })?;

        info!(
            "Seeding complete: {} categories, {} sample items inserted",
            report.categories, report.items
        );
        Ok(report)
    }
}
