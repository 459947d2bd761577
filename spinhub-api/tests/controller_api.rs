//! Controller check-in and liveness endpoints.

use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::json;

use spinhub_api::orm::testing::test_rocket;

async fn auth_header(client: &Client, email: &str) -> Header<'static> {
    let response = client
        .post("/api/1/users")
        .json(&json!({
            "name": "Fleet Admin",
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
    Header::new(
        "Authorization",
        format!("Bearer {}", body["token"].as_str().unwrap()),
    )
}

#[tokio::test]
async fn test_register_and_fetch_controller() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let auth = auth_header(&client, "fleet@example.com").await;

    let response = client
        .post("/api/1/controllers")
        .header(auth.clone())
        .json(&json!({
            "serial_number": 31,
            "machine_id": 310,
            "machine_type": "upright-bike"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let controller: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(controller["serial_number"], 31);
    assert!(controller["last_ping"].is_null());

    let response = client
        .get("/api/1/controllers/31")
        .header(auth.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // Duplicate serials conflict
    let response = client
        .post("/api/1/controllers")
        .header(auth.clone())
        .json(&json!({
            "serial_number": 31,
            "machine_id": 311,
            "machine_type": "recumbent-bike"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);

    // Unknown serials are 404
    let response = client
        .get("/api/1/controllers/9999")
        .header(auth)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

#[tokio::test]
async fn test_ping_and_reboot_stamps() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let auth = auth_header(&client, "stamps@example.com").await;

    let response = client
        .post("/api/1/controllers")
        .header(auth.clone())
        .json(&json!({
            "serial_number": 7,
            "machine_id": 70,
            "machine_type": "spin-bike"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .post("/api/1/controllers/7/ping")
        .header(auth.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let controller: serde_json::Value = response.into_json().await.unwrap();
    assert!(!controller["last_ping"].is_null());
    assert!(controller["last_reboot"].is_null());

    let response = client
        .post("/api/1/controllers/7/reboot")
        .header(auth.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let controller: serde_json::Value = response.into_json().await.unwrap();
    assert!(!controller["last_reboot"].is_null());

    // Pinging an unknown controller is 404
    let response = client
        .post("/api/1/controllers/12345/ping")
        .header(auth.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);

    // The fleet listing reflects the one controller
    let response = client
        .get("/api/1/controllers")
        .header(auth)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let fleet: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(fleet.as_array().unwrap().len(), 1);
}
