use axum::{Json, extract::State};
use findit_types::api::CategoryResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/categories, sorted by name
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.with_db(|db| db.list_categories()).await?;

    Ok(Json(
        categories
            .into_iter()
            .map(|c| CategoryResponse {
                id: c.id,
                name: c.name,
                icon: c.icon,
            })
            .collect(),
    ))
}
