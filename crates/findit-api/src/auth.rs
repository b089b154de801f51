//! Phone-number login and registration. There are no passwords: the phone
//! number is the identity.

use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use findit_types::api::{LoginForm, RegisterForm};
use findit_types::models::User;
use findit_types::phone::normalize_phone;
use thiserror::Error;
use tracing::info;

use crate::error::ApiError;
use crate::pages;
use crate::session;
use crate::state::AppState;

/// Form-level failures. The message is shown inline and the form re-rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Please enter your name")]
    NameRequired,

    #[error("Phone not registered")]
    NotRegistered,

    #[error("Phone already registered")]
    AlreadyRegistered,
}

/// GET /: home for a session, landing page otherwise.
pub async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Html<String>, ApiError> {
    Ok(match session::current_user(&state, &jar).await? {
        Some(user) => pages::home(&user),
        None => pages::landing(),
    })
}

pub async fn login_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Response, ApiError> {
    if session::current_user(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(pages::login_form(None).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    if session::current_user(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    match authenticate(&state, &form.phone).await? {
        Ok(user) => {
            info!("User {} logged in", user.id);
            Ok((session::login(jar, user.id), Redirect::to("/")).into_response())
        }
        Err(e) => Ok(pages::login_form(Some(&e.to_string())).into_response()),
    }
}

pub async fn register_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Response, ApiError> {
    if session::current_user(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(pages::register_form(None, "").into_response())
}

pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    if session::current_user(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    match register_user(&state, &form).await? {
        Ok(user) => {
            info!("Registered user {}", user.id);
            Ok((session::login(jar, user.id), Redirect::to("/")).into_response())
        }
        Err(e) => Ok(pages::register_form(Some(&e.to_string()), form.name.trim()).into_response()),
    }
}

/// GET /logout
pub async fn logout(jar: SignedCookieJar) -> impl IntoResponse {
    (session::logout(jar), Redirect::to("/"))
}

/// Storage failures are the outer error; the inner one is a form message.
async fn authenticate(state: &AppState, raw_phone: &str) -> Result<Result<User, AuthError>, ApiError> {
    let Some(phone) = normalize_phone(raw_phone.trim()) else {
        return Ok(Err(AuthError::InvalidPhone));
    };

    let user = state.with_db(move |db| db.get_user_by_phone(&phone)).await?;
    Ok(user.ok_or(AuthError::NotRegistered))
}

fn validate_registration(form: &RegisterForm) -> Result<(String, String), AuthError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AuthError::NameRequired);
    }
    let phone = normalize_phone(form.phone.trim()).ok_or(AuthError::InvalidPhone)?;
    Ok((name.to_string(), phone))
}

async fn register_user(state: &AppState, form: &RegisterForm) -> Result<Result<User, AuthError>, ApiError> {
    let (name, phone) = match validate_registration(form) {
        Ok(valid) => valid,
        Err(e) => return Ok(Err(e)),
    };

    // The UNIQUE constraint decides; a concurrent duplicate also lands here
    let created = state.with_db(move |db| db.create_user(&phone, &name)).await?;
    Ok(created.ok_or(AuthError::AlreadyRegistered))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, phone: &str) -> RegisterForm {
        RegisterForm {
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn name_is_checked_before_phone() {
        assert_eq!(validate_registration(&form("  ", "bad")), Err(AuthError::NameRequired));
        assert_eq!(validate_registration(&form("Amina", "12345")), Err(AuthError::InvalidPhone));
    }

    #[test]
    fn valid_registration_is_normalized() {
        let (name, phone) = validate_registration(&form("  Amina ", "0712 345 678")).unwrap();
        assert_eq!(name, "Amina");
        assert_eq!(phone, "256712345678");
    }

    #[tokio::test]
    async fn second_registration_conflicts() {
        let state = AppState::new(
            findit_db::Database::open_in_memory().unwrap(),
            crate::config::AppConfig::default(),
        );

        let first = register_user(&state, &form("Amina", "0712345678")).await.unwrap();
        assert!(first.is_ok());

        let second = register_user(&state, &form("Amina again", "+256 712 345 678")).await.unwrap();
        assert_eq!(second.unwrap_err(), AuthError::AlreadyRegistered);
        let stored = state.db.get_user_by_phone("256712345678").unwrap().unwrap();
        assert_eq!(stored.name, "Amina");
    }

    #[tokio::test]
    async fn unknown_phone_is_not_registered() {
        let state = AppState::new(
            findit_db::Database::open_in_memory().unwrap(),
            crate::config::AppConfig::default(),
        );

        let result = authenticate(&state, "0799999999").await.unwrap();
        assert_eq!(result.unwrap_err(), AuthError::NotRegistered);

        let result = authenticate(&state, "not a phone").await.unwrap();
        assert_eq!(result.unwrap_err(), AuthError::InvalidPhone);
    }
}
