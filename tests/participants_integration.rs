mod common;

use common::{spawn_app, TestApp};
use serde_json::{json, Value};

async fn bulk_upload(app: &TestApp, short_name: &str, names: Value) -> reqwest::Response {
    app.post_json(
        "/api/participants/bulk",
        &json!({"shortName": short_name, "participants": names}),
    )
    .await
}

async fn names_of(app: &TestApp, short_name: &str) -> Vec<String> {
    let response = app
        .client
        .get(&app.url(&format!("/api/participants/bulk/{}", short_name)))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

async fn add_participant(app: &TestApp, token: &str, event_id: &str, name: &str) -> reqwest::Response {
    app.client
        .post(&app.url("/api/participants"))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "phone": "555-0100",
            "company": "Acme",
            "eventId": event_id
        }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn add_participant_returns_201() {
    let app = spawn_app();
    let token = app.access_token().await;
    let event_id = app.event_id(&token, "contact-raffle").await;

    let response = add_participant(&app, &token, &event_id, "Ada").await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Participant added successfully");
    assert_eq!(body["data"]["name"], "Ada");
    assert_eq!(body["data"]["eventId"], event_id);
}

#[tokio::test]
async fn add_participant_to_unknown_event_returns_404() {
    let app = spawn_app();
    let token = app.access_token().await;

    let response =
        add_participant(&app, &token, &uuid::Uuid::new_v4().to_string(), "Ada").await;

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Event not found");
}

#[tokio::test]
async fn add_participant_validates_every_field() {
    let app = spawn_app();
    let token = app.access_token().await;

    let response = app
        .client
        .post(&app.url("/api/participants"))
        .bearer_auth(&token)
        .json(&json!({"name": "Ada", "company": "Acme", "eventId": "nope"}))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Phone number is required., Invalid event ID format."
    );
}

#[tokio::test]
async fn bulk_upload_replaces_existing_names() {
    let app = spawn_app();
    let token = app.access_token().await;
    app.event_id(&token, "name-draw").await;

    let first = bulk_upload(&app, "name-draw", json!(["Zed", "Amy", "Mo"])).await;
    assert_eq!(201, first.status().as_u16());
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["message"], "Participants updated successfully");
    assert_eq!(names_of(&app, "name-draw").await, vec!["Amy", "Mo", "Zed"]);

    let second = bulk_upload(&app, "Name Draw", json!([" Bea ", "", "Al"])).await;
    assert_eq!(201, second.status().as_u16());
    assert_eq!(names_of(&app, "name-draw").await, vec!["Al", "Bea"]);
}

#[tokio::test]
async fn bulk_upload_rejects_missing_names() {
    let app = spawn_app();
    let token = app.access_token().await;
    app.event_id(&token, "empty-draw").await;
    bulk_upload(&app, "empty-draw", json!(["Kept"])).await;

    for names in [json!([]), json!(["", "  "]), json!("Ada")] {
        let response = bulk_upload(&app, "empty-draw", names.clone()).await;

        assert_eq!(400, response.status().as_u16(), "participants: {}", names);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Participants array is required.");
    }
    assert_eq!(names_of(&app, "empty-draw").await, vec!["Kept"]);
}

#[tokio::test]
async fn bulk_upload_for_unknown_event_returns_404() {
    let app = spawn_app();

    let response = bulk_upload(&app, "no-such-event", json!(["Ada"])).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn short_listing_includes_contact_details() {
    let app = spawn_app();
    let token = app.access_token().await;
    let event_id = app.event_id(&token, "contacts").await;
    add_participant(&app, &token, &event_id, "Grace").await;
    add_participant(&app, &token, &event_id, "Ada").await;

    let response = app
        .client
        .get(&app.url("/api/participants/short/contacts"))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["name"], "Ada");
    assert_eq!(data[0]["phone"], "555-0100");
    assert_eq!(data[0]["company"], "Acme");
    assert_eq!(data[1]["name"], "Grace");
}

#[tokio::test]
async fn participants_can_be_read_updated_and_deleted() {
    let app = spawn_app();
    let token = app.access_token().await;
    let event_id = app.event_id(&token, "crud").await;
    let created: Value = add_participant(&app, &token, &event_id, "Ada")
        .await
        .json()
        .await
        .unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let single = app
        .client
        .get(&app.url(&format!("/api/participants/single/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, single.status().as_u16());

    let listed: Value = app
        .client
        .get(&app.url(&format!("/api/participants/{}", event_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let updated = app
        .client
        .put(&app.url(&format!("/api/participants/{}", id)))
        .bearer_auth(&token)
        .json(&json!({"company": "Initech", "name": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(200, updated.status().as_u16());
    let body: Value = updated.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Ada");
    assert_eq!(body["data"]["company"], "Initech");
    assert_eq!(body["data"]["phone"], "555-0100");

    let deleted = app
        .client
        .delete(&app.url(&format!("/api/participants/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, deleted.status().as_u16());

    let gone = app
        .client
        .get(&app.url(&format!("/api/participants/single/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(404, gone.status().as_u16());
    let body: Value = gone.json().await.unwrap();
    assert_eq!(body["message"], "Participant not found");
}

#[tokio::test]
async fn organiser_routes_require_a_token() {
    let app = spawn_app();
    let id = uuid::Uuid::new_v4();

    for (method, path) in [
        ("GET", format!("/api/participants/{}", id)),
        ("GET", format!("/api/participants/single/{}", id)),
        ("DELETE", format!("/api/participants/{}", id)),
    ] {
        let request = match method {
            "GET" => app.client.get(&app.url(&path)),
            _ => app.client.delete(&app.url(&path)),
        };
        let response = request.send().await.unwrap();

        assert_eq!(401, response.status().as_u16(), "{} {}", method, path);
    }
}

#[tokio::test]
async fn deleting_an_event_removes_its_participants() {
    let app = spawn_app();
    let token = app.access_token().await;
    let event_id = app.event_id(&token, "cascade").await;
    bulk_upload(&app, "cascade", json!(["Ada", "Grace"])).await;

    app.client
        .delete(&app.url(&format!("/api/events/{}", event_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let listed: Value = app
        .client
        .get(&app.url(&format!("/api/participants/{}", event_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn public_event_details_need_no_token() {
    let app = spawn_app();
    let token = app.access_token().await;
    let event_id = app.event_id(&token, "open-day").await;

    let response = app
        .client
        .get(&app.url(&format!("/api/participants/public/event/{}", event_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Event details retrieved");
    assert_eq!(body["data"]["shortName"], "open-day");

    let missing = app
        .client
        .get(&app.url(&format!(
            "/api/participants/public/event/{}",
            uuid::Uuid::new_v4()
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(404, missing.status().as_u16());
}
