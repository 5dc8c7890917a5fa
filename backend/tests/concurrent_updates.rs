//! Concurrent changes to one record never leave a published DNS record
//! without the local row that links it.

mod support;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::{Value, json};

use support::{GatewayCall, Registry, call_json, error_code, sign_in};

fn put(id: &str, cookie: &Cookie<'static>, body: Value) -> TestRequest {
    TestRequest::put()
        .uri(&format!("/api/v1/records/{id}"))
        .set_json(body)
        .cookie(cookie.clone())
}

/// Sign alice in, claim `alice` and store one A record for it.
async fn alice_with_record<S, B>(app: &S, active: bool) -> (Cookie<'static>, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let alice = sign_in(app, "alice").await;
    call_json(
        app,
        TestRequest::post()
            .uri("/api/v1/records/claim")
            .set_json(json!({ "subdomain_name": "alice" }))
            .cookie(alice.clone()),
    )
    .await;
    let (status, body) = call_json(
        app,
        TestRequest::post()
            .uri("/api/v1/records")
            .set_json(json!({
                "record_name": "alice",
                "record_type": "A",
                "record_value": "192.0.2.10",
                "is_active": active
            }))
            .cookie(alice.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().expect("record id").to_owned();
    (alice, id)
}

/// The provider publishes exactly the remote id the stored row links, and
/// the row is active exactly when it links one.
async fn assert_published_matches_row<S, B>(
    registry: &Registry,
    app: &S,
    cookie: &Cookie<'static>,
    id: &str,
) where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = call_json(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/records/{id}"))
            .cookie(cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let linked: Vec<String> = body["cloudflare_record_id"]
        .as_str()
        .map(str::to_owned)
        .into_iter()
        .collect();
    assert_eq!(registry.gateway.published(), linked);
    assert_eq!(body["is_active"], !linked.is_empty());
}

fn assert_ok_or_changed(status: StatusCode, body: &Value) {
    match status {
        StatusCode::OK => {}
        StatusCode::CONFLICT => assert_eq!(error_code(body), "record_changed"),
        other => panic!("unexpected status {other}: {body}"),
    }
}

#[actix_web::test]
async fn concurrent_activations_publish_one_record() {
    let registry = Registry::new();
    let app = registry.app().await;
    let (alice, id) = alice_with_record(&app, false).await;

    let ((first, first_body), (second, second_body)) = tokio::join!(
        call_json(&app, put(&id, &alice, json!({ "is_active": true }))),
        call_json(&app, put(&id, &alice, json!({ "is_active": true }))),
    );

    assert_ok_or_changed(first, &first_body);
    assert_ok_or_changed(second, &second_body);
    assert!(first == StatusCode::OK || second == StatusCode::OK);
    let calls = registry.gateway.calls();
    let deleted: Vec<&str> = calls
        .iter()
        .filter_map(|call| match call {
            GatewayCall::Delete { remote_id } => Some(remote_id.as_str()),
            _ => None,
        })
        .collect();
    let creates = calls
        .iter()
        .filter(|call| matches!(call, GatewayCall::Create { .. }))
        .count();
    assert_eq!(deleted.len(), creates - 1, "losing activations remove what they published");
    assert_published_matches_row(&registry, &app, &alice, &id).await;
    assert_eq!(registry.gateway.published().len(), 1);
}

#[actix_web::test]
async fn deactivation_racing_activation_stays_consistent() {
    let registry = Registry::new();
    let app = registry.app().await;
    let (alice, id) = alice_with_record(&app, false).await;

    let ((on, on_body), (off, off_body)) = tokio::join!(
        call_json(&app, put(&id, &alice, json!({ "is_active": true }))),
        call_json(&app, put(&id, &alice, json!({ "is_active": false }))),
    );

    assert_ok_or_changed(on, &on_body);
    assert_ok_or_changed(off, &off_body);
    assert_published_matches_row(&registry, &app, &alice, &id).await;
}

#[actix_web::test]
async fn deactivation_racing_a_value_change_stays_consistent() {
    let registry = Registry::new();
    let app = registry.app().await;
    let (alice, id) = alice_with_record(&app, true).await;

    let ((off, off_body), (edit, edit_body)) = tokio::join!(
        call_json(&app, put(&id, &alice, json!({ "is_active": false }))),
        call_json(
            &app,
            put(&id, &alice, json!({ "record_value": "198.51.100.7" }))
        ),
    );

    assert_ok_or_changed(off, &off_body);
    assert!(
        matches!(
            edit,
            StatusCode::OK | StatusCode::CONFLICT | StatusCode::BAD_GATEWAY
        ),
        "unexpected status {edit}: {edit_body}"
    );
    assert_published_matches_row(&registry, &app, &alice, &id).await;
}
