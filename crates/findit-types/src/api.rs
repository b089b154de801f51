use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ItemKind;

// -- Items --

#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    /// `lost`, `found`, or anything else (conventionally `all`) for no filter.
    #[serde(default = "default_type", rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub category: String,
}

fn default_page() -> i64 {
    1
}

fn default_type() -> String {
    "all".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Public URL, always rooted at `/static/`.
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<ItemResponse>,
    pub has_next: bool,
    pub page: i64,
}

// -- Categories --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub icon: String,
}

// -- Auth forms --

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
