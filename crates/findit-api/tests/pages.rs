mod common;

use axum::http::StatusCode;
use common::{TestApp, body_string, location, session_cookie};

#[tokio::test]
async fn anonymous_root_renders_landing() {
    let app = TestApp::new();

    let resp = app.get("/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Lost something? Found something?"));
    assert!(!html.contains("Hello,"));
}

#[tokio::test]
async fn register_then_root_renders_home_for_user() {
    let app = TestApp::new();

    let resp = app.post_form("/register", "name=Amina+N&phone=0712345678", None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/"));
    let cookie = session_cookie(&resp).expect("session cookie");
    assert!(cookie.starts_with("findit_session="));

    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("Hello, Amina N"));
    assert!(html.contains("+256712345678"));

    let stored = app.state.db.get_user_by_phone("256712345678").unwrap().unwrap();
    assert_eq!(stored.name, "Amina N");
}

#[tokio::test]
async fn duplicate_registration_rerenders_with_conflict() {
    let app = TestApp::new();
    app.register("Amina", "0712345678").await;

    // Same number in another accepted shape
    let resp = app.post_form("/register", "name=Impostor&phone=712345678", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
    assert!(body_string(resp).await.contains("Phone already registered"));
    let stored = app.state.db.get_user_by_phone("256712345678").unwrap().unwrap();
    assert_eq!(stored.name, "Amina");
}

#[tokio::test]
async fn registration_validates_name_and_phone() {
    let app = TestApp::new();

    let resp = app.post_form("/register", "name=++&phone=0712345678", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Please enter your name"));

    let resp = app.post_form("/register", "name=Okello&phone=12345", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Invalid phone number"));
    assert!(html.contains("value=\"Okello\""));

    assert!(app.state.db.get_user_by_phone("256712345678").unwrap().is_none());
}

#[tokio::test]
async fn login_errors_are_shown_inline() {
    let app = TestApp::new();

    let resp = app.post_form("/login", "phone=0799999999", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Phone not registered"));

    let resp = app.post_form("/login", "phone=abc", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Invalid phone number"));
}

#[tokio::test]
async fn login_with_any_accepted_shape_starts_session() {
    let app = TestApp::new();
    app.register("Amina", "0712345678").await;

    let resp = app.post_form("/login", "phone=%2B256+712+345+678", None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&resp).expect("session cookie");

    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("Hello, Amina"));
}

#[tokio::test]
async fn logged_in_users_are_redirected_from_forms() {
    let app = TestApp::new();
    let cookie = app.register("Amina", "0712345678").await;

    for path in ["/login", "/register"] {
        let resp = app.get(path, Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), Some("/"));
    }

    let resp = app.get("/login", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("<form method=\"post\" action=\"/login\">"));
}

#[tokio::test]
async fn logout_clears_session() {
    let app = TestApp::new();
    let cookie = app.register("Amina", "0712345678").await;

    let resp = app.get("/logout", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/"));
    let cleared = session_cookie(&resp).expect("removal cookie");
    assert_eq!(cleared, "findit_session=");
}

#[tokio::test]
async fn tampered_cookie_is_anonymous() {
    let app = TestApp::new();
    let cookie = app.register("Amina", "0712345678").await;

    // Swap the signed value for a bare user id
    let forged = "findit_session=1";
    assert_ne!(cookie, forged);

    let html = body_string(app.get("/", Some(forged)).await).await;
    assert!(html.contains("Lost something? Found something?"));
}
