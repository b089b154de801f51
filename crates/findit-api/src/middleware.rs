use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::SignedCookieJar;

use crate::error::ApiError;
use crate::session;
use crate::state::AppState;

/// Resolve the session cookie to a user and attach it as an `Extension<User>`.
pub async fn require_session(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = session::current_user(&state, &jar)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
