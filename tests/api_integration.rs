use std::net::TcpListener;
use std::sync::Arc;

use actix_web::web;
use chirpy::auth::SessionManager;
use chirpy::metrics::HitCounter;
use chirpy::startup::run;
use chirpy::state::AppState;
use chirpy::store::{InMemoryChirpStore, InMemoryRefreshTokenStore, InMemoryUserStore};
use serde_json::{json, Value};

const POLKA_KEY: &str = "test-polka-key";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/users", &self.address))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/login", &self.address))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register and log in, returning the login response body
    async fn signed_in(&self, email: &str) -> Value {
        assert_eq!(201, self.register(email, "04234").await.status().as_u16());
        self.login(email, "04234")
            .await
            .json()
            .await
            .expect("Failed to parse response")
    }

    async fn post_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/chirps", &self.address))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

fn spawn_app_on(platform_is_dev: bool) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let sessions = SessionManager::new(
        Arc::new(InMemoryRefreshTokenStore::new()),
        "integration-test-secret",
        chrono::Duration::hours(1),
        chrono::Duration::days(60),
    );
    let state = AppState {
        users: Arc::new(InMemoryUserStore::new()),
        chirps: Arc::new(InMemoryChirpStore::new()),
        sessions,
        is_dev: platform_is_dev,
        polka_key: POLKA_KEY.to_string(),
    };

    let server = run(
        listener,
        state,
        web::Data::new(HitCounter::new()),
        concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

fn spawn_app() -> TestApp {
    spawn_app_on(true)
}

// --- Health ---

#[tokio::test]
async fn healthz_returns_ok() {
    let app = spawn_app();

    let response = app
        .client
        .get(&format!("{}/api/healthz", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "OK");
}

// --- Registration & login ---

#[tokio::test]
async fn register_returns_201_without_password_hash() {
    let app = spawn_app();

    let response = app.register("saul@bettercall.com", "123456").await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "saul@bettercall.com");
    assert_eq!(body["is_chirpy_red"], false);
    assert!(body.get("id").is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_duplicate_email_returns_409() {
    let app = spawn_app();

    assert_eq!(201, app.register("walt@breakingbad.com", "pw").await.status().as_u16());
    assert_eq!(409, app.register("walt@breakingbad.com", "pw").await.status().as_u16());
}

#[tokio::test]
async fn register_invalid_email_returns_400() {
    let app = spawn_app();

    for email in ["notanemail", "user@", "@example.com", ""] {
        let response = app.register(email, "pw").await;
        assert_eq!(400, response.status().as_u16(), "Should reject email: {}", email);
    }
}

#[tokio::test]
async fn login_returns_tokens() {
    let app = spawn_app();
    let body = app.signed_in("walt@breakingbad.com").await;

    assert_eq!(body["email"], "walt@breakingbad.com");
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
    assert_eq!(body["refresh_token"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app();
    app.register("walt@breakingbad.com", "04234").await;

    let wrong_password = app.login("walt@breakingbad.com", "wrong").await;
    let unknown_user = app.login("nobody@breakingbad.com", "04234").await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_user.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_user.json().await.unwrap();
    assert_eq!(a["code"], b["code"]);
    assert_eq!(a["message"], b["message"]);
}

// --- Refresh & revoke ---

#[tokio::test]
async fn refresh_then_revoke_flow() {
    let app = spawn_app();
    let session = app.signed_in("walt@breakingbad.com").await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let new_access = body["token"].as_str().unwrap().to_string();

    // The fresh access token works for a protected write.
    assert_eq!(201, app.post_chirp(&new_access, "still here").await.status().as_u16());

    let response = app.post_with_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, response.status().as_u16());

    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let app = spawn_app();
    let session = app.signed_in("walt@breakingbad.com").await;

    let response = app
        .post_with_bearer("/api/refresh", session["token"].as_str().unwrap())
        .await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn revoke_unknown_token_returns_404() {
    let app = spawn_app();

    let response = app.post_with_bearer("/api/revoke", &"0".repeat(64)).await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn malformed_authorization_header_returns_401() {
    let app = spawn_app();

    for header in ["Bearer ", "Token abc", "abc"] {
        let response = app
            .client
            .post(&format!("{}/api/refresh", &app.address))
            .header("Authorization", header)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(401, response.status().as_u16(), "header: {:?}", header);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "MALFORMED_HEADER");
    }
}

// --- Chirps ---

#[tokio::test]
async fn create_chirp_requires_access_token() {
    let app = spawn_app();

    let response = app
        .client
        .post(&format!("{}/api/chirps", &app.address))
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    let response = app.post_chirp("not-a-jwt", "hello").await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn create_chirp_censors_and_assigns_author() {
    let app = spawn_app();
    let session = app.signed_in("walt@breakingbad.com").await;
    let token = session["token"].as_str().unwrap();

    let response = app.post_chirp(token, "What a kerfuffle this is").await;
    assert_eq!(201, response.status().as_u16());

    let chirp: Value = response.json().await.unwrap();
    assert_eq!(chirp["body"], "What a **** this is");
    assert_eq!(chirp["user_id"], session["id"]);
}

#[tokio::test]
async fn create_chirp_too_long_returns_400() {
    let app = spawn_app();
    let session = app.signed_in("walt@breakingbad.com").await;

    let response = app
        .post_chirp(session["token"].as_str().unwrap(), &"a".repeat(141))
        .await;
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn list_and_get_chirps() {
    let app = spawn_app();
    let walt = app.signed_in("walt@breakingbad.com").await;
    let jesse = app.signed_in("jesse@breakingbad.com").await;

    app.post_chirp(walt["token"].as_str().unwrap(), "first").await;
    app.post_chirp(jesse["token"].as_str().unwrap(), "second").await;
    let created: Value = app
        .post_chirp(walt["token"].as_str().unwrap(), "third")
        .await
        .json()
        .await
        .unwrap();

    let all: Vec<Value> = app
        .client
        .get(&format!("{}/api/chirps", &app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["body"], "first");

    let walts: Vec<Value> = app
        .client
        .get(&format!(
            "{}/api/chirps?author_id={}&sort=desc",
            &app.address,
            walt["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(walts.len(), 2);
    assert_eq!(walts[0]["body"], "third");

    let response = app
        .client
        .get(&format!(
            "{}/api/chirps/{}",
            &app.address,
            created["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let response = app
        .client
        .get(&format!("{}/api/chirps/{}", &app.address, uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());

    let response = app
        .client
        .get(&format!("{}/api/chirps/not-a-uuid", &app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn delete_foreign_chirp_is_forbidden() {
    let app = spawn_app();
    let walt = app.signed_in("walt@breakingbad.com").await;
    let jesse = app.signed_in("jesse@breakingbad.com").await;

    let chirp: Value = app
        .post_chirp(walt["token"].as_str().unwrap(), "mine")
        .await
        .json()
        .await
        .unwrap();
    let url = format!("{}/api/chirps/{}", &app.address, chirp["id"].as_str().unwrap());

    let response = app
        .client
        .delete(&url)
        .bearer_auth(jesse["token"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());

    let response = app.client.delete(&url).send().await.unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .delete(&url)
        .bearer_auth(walt["token"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let response = app.client.get(&url).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}

// --- Users update ---

#[tokio::test]
async fn update_user_changes_credentials() {
    let app = spawn_app();
    let session = app.signed_in("walt@breakingbad.com").await;

    let response = app
        .client
        .put(&format!("{}/api/users", &app.address))
        .bearer_auth(session["token"].as_str().unwrap())
        .json(&json!({ "email": "heisenberg@breakingbad.com", "password": "newpass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    assert_eq!(401, app.login("walt@breakingbad.com", "04234").await.status().as_u16());
    assert_eq!(200, app.login("heisenberg@breakingbad.com", "newpass").await.status().as_u16());
}

// --- Webhooks ---

#[tokio::test]
async fn polka_webhook_upgrades_user() {
    let app = spawn_app();
    let session = app.signed_in("walt@breakingbad.com").await;
    let url = format!("{}/api/polka/webhooks", &app.address);
    let payload = json!({ "event": "user.upgraded", "data": { "user_id": session["id"] } });

    let response = app
        .client
        .post(&url)
        .header("Authorization", "ApiKey wrong")
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .post(&url)
        .header("Authorization", format!("ApiKey {}", POLKA_KEY))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let body: Value = app
        .login("walt@breakingbad.com", "04234")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["is_chirpy_red"], true);

    let unknown = json!({ "event": "user.upgraded", "data": { "user_id": uuid::Uuid::new_v4() } });
    let response = app
        .client
        .post(&url)
        .header("Authorization", format!("ApiKey {}", POLKA_KEY))
        .json(&unknown)
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());
}

// --- Admin ---

#[tokio::test]
async fn file_server_hits_are_counted_and_reset() {
    let app = spawn_app();

    for _ in 0..3 {
        app.client
            .get(&format!("{}/app/", &app.address))
            .send()
            .await
            .unwrap();
    }

    let page = app
        .client
        .get(&format!("{}/admin/metrics", &app.address))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Chirpy has been visited 3 times!"));

    let response = app
        .client
        .post(&format!("{}/admin/reset", &app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let page = app
        .client
        .get(&format!("{}/admin/metrics", &app.address))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Chirpy has been visited 0 times!"));
}

#[tokio::test]
async fn file_server_does_not_expose_configuration() {
    let app = spawn_app();

    let index = app
        .client
        .get(&format!("{}/app/", &app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(200, index.status().as_u16());

    for path in ["/app/configuration.yaml", "/app/Cargo.toml", "/app/../configuration.yaml"] {
        let response = app
            .client
            .get(&format!("{}{}", &app.address, path))
            .send()
            .await
            .unwrap();
        assert_eq!(404, response.status().as_u16(), "{} was served", path);
        let body = response.text().await.unwrap();
        assert!(!body.contains("change-me-local-development-secret"));
    }
}

#[tokio::test]
async fn reset_wipes_sessions() {
    let app = spawn_app();
    let session = app.signed_in("walt@breakingbad.com").await;

    app.client
        .post(&format!("{}/admin/reset", &app.address))
        .send()
        .await
        .unwrap();

    let response = app
        .post_with_bearer("/api/refresh", session["refresh_token"].as_str().unwrap())
        .await;
    assert_eq!(401, response.status().as_u16());
    assert_eq!(401, app.login("walt@breakingbad.com", "04234").await.status().as_u16());
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let app = spawn_app_on(false);

    let response = app
        .client
        .post(&format!("{}/admin/reset", &app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());
}
