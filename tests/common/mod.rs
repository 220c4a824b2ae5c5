#![allow(dead_code)]

use std::net::TcpListener;

use rafflehub::configuration::{
    ApplicationSettings, DatabaseSettings, Environment, JwtSettings, Settings,
};
use rafflehub::startup::run;
use rafflehub::store::Repositories;
use reqwest::Response;
use serde_json::{json, Value};

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-characters-long";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub fn test_settings(environment: Environment) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "127.0.0.1".to_string(),
            database_name: "unused".to_string(),
            require_ssl: false,
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment,
            password_hash_cost: 4,
        },
        jwt: JwtSettings {
            secret: TEST_SECRET.to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 2592000,
            issuer: "rafflehub-test".to_string(),
        },
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_settings(Environment::Development))
}

/// Start the server on a random port with in-memory storage
pub fn spawn_app_with(settings: Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(listener, Repositories::in_memory(), &settings)
        .expect("Failed to create server");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(&self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Response {
        self.post_json(
            "/api/auth/register",
            &json!({"name": name, "email": email, "password": password}),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str, remember_me: bool) -> Response {
        self.post_json(
            "/api/auth/login",
            &json!({"email": email, "password": password, "rememberMe": remember_me}),
        )
        .await
    }

    /// Register a fresh user and return its access token
    pub async fn access_token(&self) -> String {
        let email = format!("{}@example.com", uuid::Uuid::new_v4());
        self.register("Organiser", &email, "secret1").await;
        let response = self.login(&email, "secret1", false).await;
        assert_eq!(200, response.status().as_u16(), "login failed for {}", email);

        let body: Value = response.json().await.unwrap();
        body["data"]["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn create_event(&self, token: &str, name: &str, short_name: &str, kind: &str) -> Response {
        self.client
            .post(&self.url("/api/events"))
            .bearer_auth(token)
            .json(&json!({"name": name, "shortName": short_name, "type": kind}))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Create an event and return its id
    pub async fn event_id(&self, token: &str, short_name: &str) -> String {
        let response = self
            .create_event(token, "Raffle", short_name, "enter_names")
            .await;
        assert_eq!(201, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

/// Every `Set-Cookie` header on the response
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// The `refreshToken` Set-Cookie header, if any
pub fn refresh_set_cookie(response: &Response) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with("refreshToken="))
}

/// Value part of a `name=value; attrs` header
pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

/// Attribute names and values, e.g. `("max-age", "604800")`
pub fn cookie_attributes(set_cookie: &str) -> Vec<(String, String)> {
    set_cookie
        .split(';')
        .skip(1)
        .map(|attr| {
            let attr = attr.trim();
            match attr.split_once('=') {
                Some((name, value)) => (name.to_lowercase(), value.to_string()),
                None => (attr.to_lowercase(), String::new()),
            }
        })
        .collect()
}

pub fn cookie_attribute(set_cookie: &str, name: &str) -> Option<String> {
    cookie_attributes(set_cookie)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v)
}
