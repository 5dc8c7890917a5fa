//! End-to-end registry behaviour over HTTP with memory storage and a
//! scripted DNS provider.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::rstest;
use serde_json::{Value, json};

use support::{GatewayCall, Registry, call_json, error_code, sign_in};

fn claim(label: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/v1/records/claim")
        .set_json(json!({ "subdomain_name": label }))
}

fn create(body: Value) -> TestRequest {
    TestRequest::post().uri("/api/v1/records").set_json(body)
}

fn record_id(body: &Value) -> String {
    body["id"].as_str().expect("record id").to_owned()
}

#[actix_web::test]
async fn one_claim_per_user_and_one_user_per_label() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    let bob = sign_in(&app, "bob").await;

    let (status, body) = call_json(&app, claim("Alice").cookie(alice.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["claim"]["subdomain_name"], "alice");
    assert_eq!(body["full_domain"], "alice.btwarch.me");

    let (status, body) = call_json(&app, claim("alice2").cookie(alice.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "already_claimed");

    let (status, body) = call_json(&app, claim("alice").cookie(bob)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "label_taken");

    let (status, body) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/v1/records/claim")
            .cookie(alice),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claim"]["subdomain_name"], "alice");
}

#[actix_web::test]
async fn records_require_a_session() {
    let registry = Registry::new();
    let app = registry.app().await;

    let (status, body) = call_json(&app, TestRequest::get().uri("/api/v1/records")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn active_records_are_published_then_unpublished_on_deactivation() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;

    let (status, body) = call_json(
        &app,
        create(json!({
            "record_name": "alice",
            "record_type": "A",
            "record_value": "192.0.2.10",
            "ttl": 300,
            "is_active": true
        }))
        .cookie(alice.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record_name"], "alice.btwarch.me");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["cloudflare_record_id"], "cf123");
    assert_eq!(registry.gateway.published(), vec!["cf123".to_owned()]);

    let id = record_id(&body);
    let (status, body) = call_json(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/records/{id}"))
            .set_json(json!({ "is_active": false }))
            .cookie(alice),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);
    assert_eq!(body["cloudflare_record_id"], Value::Null);
    assert!(registry.gateway.published().is_empty());
    assert!(registry.gateway.calls().contains(&GatewayCall::Delete {
        remote_id: "cf123".to_owned()
    }));
}

#[actix_web::test]
async fn failed_unpublish_keeps_the_record_active() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;
    let (_, created) = call_json(
        &app,
        create(json!({
            "record_name": "alice",
            "record_type": "A",
            "record_value": "192.0.2.10",
            "is_active": true
        }))
        .cookie(alice.clone()),
    )
    .await;
    let id = record_id(&created);
    registry.gateway.fail_deletes();

    let (status, body) = call_json(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/records/{id}"))
            .set_json(json!({ "is_active": false }))
            .cookie(alice.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "remote_deprovision_failed");
    assert_eq!(registry.gateway.delete_attempts(), 3);

    let (status, body) = call_json(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/records/{id}"))
            .cookie(alice),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], true);
    assert_eq!(body["cloudflare_record_id"], "cf123");
}

#[actix_web::test]
async fn failed_delete_keeps_the_row() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;
    let (_, created) = call_json(
        &app,
        create(json!({
            "record_name": "alice",
            "record_type": "TXT",
            "record_value": "hello",
            "is_active": true
        }))
        .cookie(alice.clone()),
    )
    .await;
    let id = record_id(&created);
    registry.gateway.fail_deletes();

    let (status, body) = call_json(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/v1/records/{id}"))
            .cookie(alice.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "remote_deprovision_failed");

    let (_, body) = call_json(
        &app,
        TestRequest::get().uri("/api/v1/records").cookie(alice),
    )
    .await;
    assert_eq!(body["records"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn delete_unpublishes_and_returns_the_record() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;
    let (_, created) = call_json(
        &app,
        create(json!({
            "record_name": "alice",
            "record_type": "CNAME",
            "record_value": "alice.github.io",
            "is_active": true
        }))
        .cookie(alice.clone()),
    )
    .await;
    let id = record_id(&created);

    let (status, body) = call_json(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/v1/records/{id}"))
            .cookie(alice.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "record deleted successfully");
    assert_eq!(body["record"]["id"], id.as_str());
    assert!(registry.gateway.published().is_empty());

    let (status, body) = call_json(
        &app,
        TestRequest::get().uri("/api/v1/records").cookie(alice),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], json!([]));
}

#[actix_web::test]
async fn availability_tracks_stored_names() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;
    let check = || {
        TestRequest::post()
            .uri("/api/v1/records/checkavailability")
            .set_json(json!({ "record_name": "alice.btwarch.me" }))
    };

    let (status, body) = call_json(&app, check()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "available": true }));

    call_json(
        &app,
        create(json!({
            "record_name": "alice",
            "record_type": "A",
            "record_value": "192.0.2.10"
        }))
        .cookie(alice),
    )
    .await;
    assert!(registry.gateway.calls().is_empty());

    let (_, body) = call_json(&app, check()).await;
    assert_eq!(body, json!({ "available": false }));
}

#[actix_web::test]
async fn repeating_a_create_updates_in_place() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;
    let a_record = |value: &str| {
        create(json!({
            "record_name": "alice",
            "record_type": "A",
            "record_value": value,
            "is_active": true
        }))
    };

    let (status, first) = call_json(&app, a_record("192.0.2.10").cookie(alice.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) = call_json(&app, a_record("192.0.2.20").cookie(alice.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["record_value"], "192.0.2.20");
    assert_eq!(second["cloudflare_record_id"], "cf123");
    assert!(registry.gateway.calls().contains(&GatewayCall::Update {
        remote_id: "cf123".to_owned(),
        value: "192.0.2.20".to_owned()
    }));

    let (_, body) = call_json(
        &app,
        TestRequest::get().uri("/api/v1/records").cookie(alice),
    )
    .await;
    assert_eq!(body["records"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn rejected_publish_stores_nothing() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;
    registry.gateway.fail_creates();

    let (status, body) = call_json(
        &app,
        create(json!({
            "record_name": "alice",
            "record_type": "A",
            "record_value": "192.0.2.10",
            "is_active": true
        }))
        .cookie(alice.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "remote_publish_failed");

    let (_, body) = call_json(
        &app,
        TestRequest::get().uri("/api/v1/records").cookie(alice),
    )
    .await;
    assert_eq!(body["records"], json!([]));
}

#[rstest]
#[case::address_off_root("www.alice", "A", "192.0.2.10", StatusCode::BAD_REQUEST, "invalid_placement")]
#[case::alias_off_root("www.alice", "CNAME", "example.net", StatusCode::BAD_REQUEST, "invalid_placement")]
#[case::name_server("alice", "NS", "ns1.example.net", StatusCode::BAD_REQUEST, "forbidden_record_type")]
#[case::mail_exchanger("alice", "MX", "mail.example.net", StatusCode::BAD_REQUEST, "forbidden_record_type")]
#[case::someone_elses_label("bob", "A", "192.0.2.10", StatusCode::FORBIDDEN, "subdomain_not_claimed")]
#[actix_web::test]
async fn placement_rules_are_enforced(
    #[case] name: &str,
    #[case] record_type: &str,
    #[case] value: &str,
    #[case] expected_status: StatusCode,
    #[case] expected_code: &str,
) {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;

    let (status, body) = call_json(
        &app,
        create(json!({
            "record_name": name,
            "record_type": record_type,
            "record_value": value,
            "is_active": true
        }))
        .cookie(alice),
    )
    .await;
    assert_eq!(status, expected_status);
    assert_eq!(error_code(&body), expected_code);
    assert!(registry.gateway.calls().is_empty());
}

#[rstest]
#[case::root("alice")]
#[case::acme_challenge("_acme-challenge.alice")]
#[case::deep_label("_dmarc.mail.alice")]
#[actix_web::test]
async fn txt_records_may_sit_below_the_root(#[case] name: &str) {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;

    let (status, body) = call_json(
        &app,
        create(json!({
            "record_name": name,
            "record_type": "TXT",
            "record_value": "v=verify",
            "is_active": true
        }))
        .cookie(alice),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record_name"], format!("{name}.btwarch.me"));
}

#[actix_web::test]
async fn other_users_records_are_hidden() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;
    let bob = sign_in(&app, "bob").await;
    call_json(&app, claim("alice").cookie(alice.clone())).await;
    let (_, created) = call_json(
        &app,
        create(json!({
            "record_name": "alice",
            "record_type": "TXT",
            "record_value": "hello"
        }))
        .cookie(alice),
    )
    .await;
    let id = record_id(&created);

    let (status, body) = call_json(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/records/{id}"))
            .cookie(bob),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "record_not_found");
}

#[actix_web::test]
async fn me_reports_the_github_profile() {
    let registry = Registry::new();
    let app = registry.app().await;
    let alice = sign_in(&app, "alice").await;

    let (status, body) = call_json(
        &app,
        TestRequest::get().uri("/api/v1/auth/me").cookie(alice),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
}
