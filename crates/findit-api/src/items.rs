use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use findit_db::{ItemFilter, ItemQuery, NewItem};
use findit_types::api::{ItemResponse, ItemsQuery, ItemsResponse};
use findit_types::models::{Item, ItemKind, User};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads;

/// Public URL root for everything under the static directory.
pub const PUBLIC_PREFIX: &str = "/static/";

/// Shown for items posted without a photo.
pub const PLACEHOLDER_IMAGE: &str = "/static/placeholder.png";

/// Map a stored image reference to its public URL.
pub fn resolve_image_url(stored: Option<&str>) -> String {
    match stored.map(str::trim).filter(|s| !s.is_empty()) {
        None => PLACEHOLDER_IMAGE.to_string(),
        Some(path) if path.starts_with(PUBLIC_PREFIX) => path.to_string(),
        Some(path) => format!("{PUBLIC_PREFIX}{}", path.trim_start_matches('/')),
    }
}

pub fn item_response(item: Item) -> ItemResponse {
    ItemResponse {
        image_url: resolve_image_url(item.image_url.as_deref()),
        id: item.id,
        title: item.title,
        description: item.description,
        category: item.category,
        location: item.location,
        kind: item.kind,
        created_at: item.created_at,
    }
}

/// GET /api/items?page=&type=&category=
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ItemsQuery>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let query = ItemQuery::new(params.page, ItemFilter::from_params(&params.kind, &params.category));

    let page = state.with_db(move |db| db.list_items(&query)).await?;

    Ok(Json(ItemsResponse {
        items: page.items.into_iter().map(item_response).collect(),
        has_next: page.has_next,
        page: page.page,
    }))
}

/// Body limit hits surface as 413; anything else is a malformed form.
fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge {
            max: uploads::MAX_IMAGE_SIZE,
        }
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

#[derive(Default)]
struct ItemForm {
    kind: String,
    title: String,
    description: String,
    category: String,
    location: String,
    image: Option<(Option<String>, Vec<u8>)>,
}

impl ItemForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(multipart_error)?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(multipart_error)?;
                // Browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    form.image = Some((file_name, bytes.to_vec()));
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(multipart_error)?;
            match name.as_str() {
                "type" => form.kind = text,
                "title" => form.title = text,
                "description" => form.description = text,
                "category" => form.category = text,
                "location" => form.location = text,
                _ => {}
            }
        }

        Ok(form)
    }
}

fn required(value: &str, field: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Plain form submissions from the home page ask for HTML back.
fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

/// POST /api/items (multipart, session required)
///
/// Scripts get `201` with the item JSON. A browser posting the home page
/// form is sent back to `/` instead.
pub async fn create_item(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = ItemForm::read(multipart).await?;

    let kind: ItemKind = form
        .kind
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("type must be lost or found".to_string()))?;
    let title = required(&form.title, "title")?;
    let category = required(&form.category, "category")?;
    let location = required(&form.location, "location")?;

    let image_url = match &form.image {
        Some((file_name, bytes)) => {
            Some(uploads::store_image(&state.config.upload_dir, file_name.as_deref(), bytes).await?)
        }
        None => None,
    };

    let new_item = NewItem {
        kind,
        title,
        description: form.description.trim().to_string(),
        category,
        location,
        image_url: image_url.clone(),
        user_id: Some(user.id),
    };

    let item = match state.with_db(move |db| db.create_item(&new_item)).await {
        Ok(item) => item,
        Err(e) => {
            if let Some(stored) = &image_url {
                uploads::discard_image(&state.config.upload_dir, stored).await;
            }
            return Err(e);
        }
    };

    info!("User {} posted {} item {}", user.id, item.kind, item.id);
    if wants_html(&headers) {
        return Ok(Redirect::to("/").into_response());
    }
    Ok((StatusCode::CREATED, Json(item_response(item))).into_response())
}

/// POST /api/items/{id}/resolve (session required, owner only)
pub async fn resolve_item(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(item_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let user_id = user.id;
    let resolved = state
        .with_db(move |db| db.resolve_item(item_id, user_id))
        .await?;

    if !resolved {
        return Err(ApiError::NotFound);
    }

    info!("User {} resolved item {}", user_id, item_id);
    Ok(StatusCode::NO_CONTENT)
}
