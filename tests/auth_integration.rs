mod common;

use common::{
    cookie_attribute, cookie_value, refresh_set_cookie, spawn_app, spawn_app_with, test_settings,
};
use rafflehub::configuration::Environment;
use serde_json::{json, Value};

// --- Registration Tests ---

#[tokio::test]
async fn register_returns_201_with_public_user() {
    let app = spawn_app();

    let response = app.register("A", "a@x.com", "secret1").await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["name"], "A");
    assert_eq!(body["data"]["role"], "member");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn register_returns_400_for_invalid_input() {
    let app = spawn_app();
    let test_cases = vec![
        (json!({"email": "a@x.com", "password": "secret1"}), "missing name", "Name is required."),
        (json!({"name": "A", "email": "notanemail", "password": "secret1"}), "bad email", "Invalid email format."),
        (json!({"name": "A", "email": "a@x.com", "password": "12345"}), "short password", "Password must be at least 6 characters."),
    ];

    for (body, description, message) in test_cases {
        let response = app.post_json("/api/auth/register", &body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request for {}.",
            description
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], message, "unexpected message for {}", description);
    }
}

#[tokio::test]
async fn register_rejects_duplicate_email_case_insensitively() {
    let app = spawn_app();

    assert_eq!(201, app.register("A", "a@x.com", "secret1").await.status().as_u16());
    let response = app.register("B", "A@X.COM", "secret2").await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User with this email already exists.");
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_access_token_and_refresh_cookie() {
    let app = spawn_app();
    app.register("A", "a@x.com", "secret1").await;

    let response = app.login("A@X.com", "secret1", false).await;

    assert_eq!(200, response.status().as_u16());
    let cookie = refresh_set_cookie(&response).expect("refresh cookie was not set");
    assert_eq!(cookie_attribute(&cookie, "max-age").as_deref(), Some("604800"));
    assert_eq!(cookie_attribute(&cookie, "samesite").as_deref(), Some("Strict"));
    assert_eq!(cookie_attribute(&cookie, "path").as_deref(), Some("/"));
    assert!(cookie_attribute(&cookie, "httponly").is_some());
    assert!(cookie_attribute(&cookie, "secure").is_none());

    let body: Value = response.json().await.unwrap();
    assert!(body["data"]["accessToken"].is_string());
    assert!(body["data"].get("refreshToken").is_none());
}

#[tokio::test]
async fn remember_me_extends_cookie_to_30_days() {
    let app = spawn_app();
    app.register("A", "a@x.com", "secret1").await;

    let response = app.login("a@x.com", "secret1", true).await;

    let cookie = refresh_set_cookie(&response).unwrap();
    assert_eq!(cookie_attribute(&cookie, "max-age").as_deref(), Some("2592000"));
}

#[tokio::test]
async fn refresh_cookie_is_secure_in_production() {
    let app = spawn_app_with(test_settings(Environment::Production));
    app.register("A", "a@x.com", "secret1").await;

    let response = app.login("a@x.com", "secret1", false).await;

    let cookie = refresh_set_cookie(&response).unwrap();
    assert!(cookie_attribute(&cookie, "secure").is_some());
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_check_failed() {
    let app = spawn_app();
    app.register("A", "a@x.com", "secret1").await;

    let wrong_password = app.login("a@x.com", "secret2", false).await;
    let unknown_email = app.login("nobody@x.com", "secret1", false).await;

    assert_eq!(400, wrong_password.status().as_u16());
    assert_eq!(400, unknown_email.status().as_u16());
    assert!(refresh_set_cookie(&wrong_password).is_none());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["message"], "Invalid credentials.");
    assert_eq!(a, b);
}

// --- Refresh / Logout Tests ---

#[tokio::test]
async fn refresh_issues_new_access_token_from_cookie() {
    let app = spawn_app();
    app.register("A", "a@x.com", "secret1").await;
    let login = app.login("a@x.com", "secret1", false).await;
    let refresh_token = cookie_value(&refresh_set_cookie(&login).unwrap());

    let response = app
        .client
        .post(&app.url("/api/auth/refresh"))
        .header("Cookie", format!("refreshToken={}", refresh_token))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    assert!(refresh_set_cookie(&response).is_none(), "refresh token must not rotate");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Token refreshed");
    assert!(body["data"]["accessToken"].is_string());
}

#[tokio::test]
async fn refresh_rejects_missing_and_invalid_cookies() {
    let app = spawn_app();
    let test_cases = vec![
        (None, "Refresh token is missing."),
        (Some("refreshToken=".to_string()), "Refresh token is missing."),
        (Some("refreshToken=not.a.jwt".to_string()), "Refresh token expired. Please log in again."),
    ];

    for (cookie, message) in test_cases {
        let mut request = app.client.post(&app.url("/api/auth/refresh"));
        if let Some(cookie) = &cookie {
            request = request.header("Cookie", cookie);
        }
        let response = request.send().await.unwrap();

        assert_eq!(403, response.status().as_u16(), "cookie: {:?}", cookie);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], message, "cookie: {:?}", cookie);
    }
}

#[tokio::test]
async fn refresh_with_forged_signature_is_forbidden() {
    let app = spawn_app();
    app.register("A", "a@x.com", "secret1").await;
    let login = app.login("a@x.com", "secret1", false).await;
    let genuine = cookie_value(&refresh_set_cookie(&login).unwrap());
    let (unsigned, signature) = genuine.rsplit_once('.').unwrap();
    let flipped = if signature.starts_with('A') { "B" } else { "A" };
    let forged = format!("{}.{}{}", unsigned, flipped, &signature[1..]);

    let response = app
        .client
        .post(&app.url("/api/auth/refresh"))
        .header("Cookie", format!("refreshToken={}", forged))
        .send()
        .await
        .unwrap();

    assert_eq!(403, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Refresh token expired. Please log in again.");
}

#[tokio::test]
async fn refresh_token_is_not_accepted_as_body_or_header() {
    let app = spawn_app();
    app.register("A", "a@x.com", "secret1").await;
    let login = app.login("a@x.com", "secret1", false).await;
    let refresh_token = cookie_value(&refresh_set_cookie(&login).unwrap());

    let response = app
        .client
        .post(&app.url("/api/auth/refresh"))
        .bearer_auth(&refresh_token)
        .json(&json!({"refreshToken": refresh_token}))
        .send()
        .await
        .unwrap();

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn logout_requires_an_access_token() {
    let app = spawn_app();

    let response = app.client.post(&app.url("/api/auth/logout")).send().await.unwrap();

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Access token is required.");
}

#[tokio::test]
async fn register_login_logout_then_refresh_is_forbidden() {
    let app = spawn_app();

    assert_eq!(201, app.register("A", "a@x.com", "secret1").await.status().as_u16());
    let login = app.login("A@X.com", "secret1", false).await;
    assert_eq!(200, login.status().as_u16());
    let body: Value = login.json().await.unwrap();
    let access_token = body["data"]["accessToken"].as_str().unwrap().to_string();

    let logout = app
        .client
        .post(&app.url("/api/auth/logout"))
        .bearer_auth(&access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, logout.status().as_u16());
    let cleared = refresh_set_cookie(&logout).expect("logout must clear the cookie");
    assert_eq!(cookie_value(&cleared), "");
    assert_eq!(cookie_attribute(&cleared, "max-age").as_deref(), Some("0"));
    assert!(cookie_attribute(&cleared, "httponly").is_some());
    assert_eq!(cookie_attribute(&cleared, "samesite").as_deref(), Some("Strict"));

    // the browser now holds the cleared cookie
    let response = app
        .client
        .post(&app.url("/api/auth/refresh"))
        .header("Cookie", format!("refreshToken={}", cookie_value(&cleared)))
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn gated_routes_distinguish_missing_and_invalid_tokens() {
    let app = spawn_app();

    let missing = app.client.get(&app.url("/api/events")).send().await.unwrap();
    assert_eq!(401, missing.status().as_u16());

    let invalid = app
        .client
        .get(&app.url("/api/events"))
        .bearer_auth("definitely.not.valid")
        .send()
        .await
        .unwrap();
    assert_eq!(403, invalid.status().as_u16());
    let body: Value = invalid.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or expired access token.");

    let wrong_scheme = app
        .client
        .get(&app.url("/api/events"))
        .header("Authorization", "Basic abc")
        .send()
        .await
        .unwrap();
    assert_eq!(401, wrong_scheme.status().as_u16());
}
