//! Tests for the bearer-token gate.
//!
//! Covers the fixed-status contract of the authentication middleware:
//! - no token anywhere on the request: 403
//! - a token that fails verification (garbage, wrong key, expired): 401
//! - a valid token, in any accepted location, lets the request through
//!   with the decoded claims attached

use rocket::http::{Header, Status};
use rocket::tokio;
use serde_json::json;

use spinhub_api::models::User;
use spinhub_api::orm::testing::{test_jwt_keys, test_rocket};

async fn signup_and_login(
    client: &rocket::local::asynchronous::Client,
    email: &str,
) -> (i32, String) {
    let response = client
        .post("/api/1/users")
        .json(&json!({
            "name": "Gate Tester",
            "email": email,
            "password": "pedals"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .post("/api/1/login")
        .json(&json!({ "email": email, "password": "pedals" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body: serde_json::Value = response.into_json().await.unwrap();
    (
        body["user_id"].as_i64().unwrap() as i32,
        body["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_missing_token_is_forbidden() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();

    let response = client.get("/api/1/hello").dispatch().await;
    assert_eq!(response.status(), Status::Forbidden);

    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["status"], 403);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();

    let response = client
        .get("/api/1/hello")
        .header(Header::new("Authorization", "Bearer not-a-jwt"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);

    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();

    let (user_id, _token) = signup_and_login(&client, "expired@example.com").await;

    // Forge an already-expired token with the test keys, well past the
    // validation leeway.
    let user = User {
        id: user_id,
        name: "Gate Tester".to_string(),
        email: "expired@example.com".to_string(),
        password_hash: String::new(),
        gender: None,
        weight: None,
        age: None,
        height: None,
        rfid: None,
        reset_code: None,
    };
    let expired = test_jwt_keys().issue_with_ttl(&user, -600).unwrap();

    let response = client
        .get("/api/1/hello")
        .header(Header::new("Authorization", format!("Bearer {}", expired)))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_wrong_key_token_is_unauthorized() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();

    let user = User {
        id: 1,
        name: "Forger".to_string(),
        email: "forger@example.com".to_string(),
        password_hash: String::new(),
        gender: None,
        weight: None,
        age: None,
        height: None,
        rfid: None,
        reset_code: None,
    };
    let forged = spinhub_api::auth::JwtKeys::new(b"some-other-secret", 3600)
        .issue(&user)
        .unwrap();

    let response = client
        .get("/api/1/hello")
        .header(Header::new("Authorization", format!("Bearer {}", forged)))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_raw_header_token_is_accepted() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();

    let (_, token) = signup_and_login(&client, "rawheader@example.com").await;

    // Machine controllers send the bare token without the Bearer scheme
    let response = client
        .get("/api/1/hello")
        .header(Header::new("Authorization", token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn test_query_parameter_token_is_accepted() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();

    let (user_id, token) = signup_and_login(&client, "querytoken@example.com").await;

    let response = client
        .get(format!("/api/1/hello?access_token={}", token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["user_id"], user_id);
    assert_eq!(body["email"], "querytoken@example.com");
}

#[tokio::test]
async fn test_protected_resources_share_the_gate() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();

    // Every gated route family answers 403 without a token
    for path in [
        "/api/1/users/me",
        "/api/1/tags/1001",
        "/api/1/controllers/31",
        "/api/1/sessions/1",
        "/api/1/telemetry/recent?seconds=60",
    ] {
        let response = client.get(path).dispatch().await;
        assert_eq!(response.status(), Status::Forbidden, "path {}", path);
    }

    // While the open endpoints stay open
    let response = client.get("/api/1/status").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn test_me_resolves_token_claims() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();

    let (user_id, token) = signup_and_login(&client, "me@example.com").await;

    let response = client
        .get("/api/1/users/me")
        .header(Header::new("Authorization", format!("Bearer {}", token)))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["id"], user_id);
    assert_eq!(body["email"], "me@example.com");
}
