//! Server-rendered HTML views.

use axum::response::Html;
use chrono::Datelike;
use findit_types::models::User;

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    let year = chrono::Utc::now().year();
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Findit</title>
</head>
<body>
<header><a href="/">Findit</a>: lost &amp; found in your community</header>
<main>
{body}
</main>
<footer>&copy; {year} Findit</footer>
</body>
</html>"#,
        title = escape(title),
    ))
}

fn error_block(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, escape(e)))
        .unwrap_or_default()
}

/// Marketing page for visitors without a session.
pub fn landing() -> Html<String> {
    layout(
        "Welcome",
        r#"<section class="landing">
<h1>Lost something? Found something?</h1>
<p>Post lost and found items and help your neighbours get their things back.</p>
<p><a href="/register">Create an account</a> or <a href="/login">log in</a> with your phone number.</p>
<p>Browse current listings at <a href="/api/items">/api/items</a>.</p>
</section>"#,
    )
}

/// Home view for a logged-in user, including the new-listing form.
pub fn home(user: &User) -> Html<String> {
    let body = format!(
        r#"<section class="home" data-user-id="{id}">
<h1>Hello, {name}</h1>
<p>Signed in as +{phone}. <a href="/logout">Log out</a></p>
<h2>Post an item</h2>
<form id="new-item" method="post" action="/api/items" enctype="multipart/form-data">
<label>Type
<select name="type"><option value="lost">Lost</option><option value="found">Found</option></select>
</label>
<label>Title <input name="title" required></label>
<label>Description <textarea name="description"></textarea></label>
<label>Category <input name="category" required></label>
<label>Location <input name="location" required></label>
<label>Photo <input type="file" name="image" accept="image/*"></label>
<button type="submit">Post</button>
</form>
<h2>Recent listings</h2>
<div id="items" data-source="/api/items" data-categories="/api/categories"></div>
</section>"#,
        id = user.id,
        name = escape(&user.name),
        phone = escape(&user.phone),
    );
    layout("Home", &body)
}

pub fn login_form(error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Log in</h1>
{error}
<form method="post" action="/login">
<label>Phone number <input name="phone" type="tel" placeholder="07XX XXX XXX" required></label>
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
        error = error_block(error),
    );
    layout("Log in", &body)
}

/// Registration form. `name` is echoed back after a failed attempt.
pub fn register_form(error: Option<&str>, name: &str) -> Html<String> {
    let body = format!(
        r#"<h1>Register</h1>
{error}
<form method="post" action="/register">
<label>Name <input name="name" value="{name}" required></label>
<label>Phone number <input name="phone" type="tel" placeholder="07XX XXX XXX" required></label>
<button type="submit">Create account</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
        error = error_block(error),
        name = escape(name),
    );
    layout("Register", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_text_is_escaped() {
        assert_eq!(escape(r#"<b>"Tom" & 'Jerry'</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;");

        let page = register_form(Some("Phone <already> registered"), "<script>").0;
        assert!(page.contains("Phone &lt;already&gt; registered"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn login_form_shows_error_only_when_given() {
        assert!(!login_form(None).0.contains("class=\"error\""));
        assert!(login_form(Some("Phone not registered")).0.contains("Phone not registered"));
    }
}
