//! Tag provisioning and registration over the API.

use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::json;

use spinhub_api::orm::testing::test_rocket;

async fn auth_header(client: &Client, email: &str) -> (i64, Header<'static>) {
    let response = client
        .post("/api/1/users")
        .json(&json!({
            "name": "Tag Tester",
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
    let token = body["token"].as_str().unwrap();
    (
        body["user_id"].as_i64().unwrap(),
        Header::new("Authorization", format!("Bearer {}", token)),
    )
}

#[tokio::test]
async fn test_provision_and_register_tag() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let (user_id, auth) = auth_header(&client, "tags@example.com").await;

    // Controller provisions two pending tags on machine 7
    for rfid in [1001, 1002] {
        let response = client
            .post("/api/1/tags")
            .header(auth.clone())
            .json(&json!({ "rfid": rfid, "machine_id": 7 }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        let tag: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(tag["registered"], false);
    }

    // Registration claims the most recently created pending tag
    let response = client
        .post("/api/1/tags/register")
        .header(auth.clone())
        .json(&json!({
            "tag_name": "gym card",
            "user_id": user_id,
            "machine_id": 7
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let tag: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(tag["rfid"].as_i64(), Some(1002));
    assert_eq!(tag["registered"], true);
    assert_eq!(tag["tag_name"], "gym card");
    assert_eq!(tag["user_id"].as_i64(), Some(user_id));

    // The older provision is still pending and readable
    let response = client
        .get("/api/1/tags/1001")
        .header(auth)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let tag: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(tag["registered"], false);
}

#[tokio::test]
async fn test_register_without_pending_tag_is_noop() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let (user_id, auth) = auth_header(&client, "nopending@example.com").await;

    let response = client
        .post("/api/1/tags/register")
        .header(auth)
        .json(&json!({
            "tag_name": "nothing here",
            "user_id": user_id,
            "machine_id": 42
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "No pending tag for machine");
}

#[tokio::test]
async fn test_registration_is_scoped_to_machine() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let (user_id, auth) = auth_header(&client, "scoped@example.com").await;

    // A newer pending tag on machine 2 must not satisfy machine 1
    let response = client
        .post("/api/1/tags")
        .header(auth.clone())
        .json(&json!({ "rfid": 2001, "machine_id": 1 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .post("/api/1/tags")
        .header(auth.clone())
        .json(&json!({ "rfid": 2002, "machine_id": 2 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .post("/api/1/tags/register")
        .header(auth.clone())
        .json(&json!({ "user_id": user_id, "machine_id": 1 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let tag: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(tag["rfid"].as_i64(), Some(2001));

    let response = client
        .get("/api/1/tags/2002")
        .header(auth)
        .dispatch()
        .await;
    let tag: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(tag["registered"], false);
}

#[tokio::test]
async fn test_duplicate_rfid_conflicts() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let (_, auth) = auth_header(&client, "duperfid@example.com").await;

    let response = client
        .post("/api/1/tags")
        .header(auth.clone())
        .json(&json!({ "rfid": 3001, "machine_id": 1 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .post("/api/1/tags")
        .header(auth)
        .json(&json!({ "rfid": 3001, "machine_id": 2 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);
}
