//! E2E check-in flows through the HTTP surface.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture, EVENT};
use turnstile_core::ticket::TicketStatus;

const T1: &str = "EVT-ABC123-XY12";
const T2: &str = "EVT-ABC123-ZZ99";

#[tokio::test]
async fn test_online_scan() {
    let fixture = TestFixture::new().await;
    fixture
        .directory
        .insert_ticket(fixtures::valid_ticket(T1, EVENT, "Ada Lovelace"))
        .await;

    let response = fixture.post("/api/v1/scan", json!({ "payload": T1 })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["type"], "success");
    assert_eq!(response.body["participant_name"], "Ada Lovelace");
    assert_eq!(response.body["is_offline"], false);
    assert_eq!(fixture.directory.checked_in_count().await, 1);
}

#[tokio::test]
async fn test_invalid_payload_scan() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/scan", json!({ "payload": "not a ticket" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["type"], "failure");
    assert_eq!(response.body["kind"], "invalid_payload");
}

#[tokio::test]
async fn test_offline_cycle_through_api() {
    let fixture = TestFixture::new().await;
    fixture
        .directory
        .insert_ticket(fixtures::valid_ticket(T1, EVENT, "Ada Lovelace"))
        .await;
    fixture
        .directory
        .insert_ticket(fixtures::used_ticket(T2, EVENT, "Grace Hopper"))
        .await;

    // Download offline data.
    let response = fixture.post_empty("/api/v1/offline/download").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["ticket_count"], 2);

    // Connectivity drops.
    fixture.probe.set_online(false);

    // Valid ticket admits offline.
    let response = fixture.post("/api/v1/scan", json!({ "payload": T1 })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["type"], "success");
    assert_eq!(response.body["is_offline"], true);

    // Already-used ticket rejected; queue unchanged.
    let response = fixture.post("/api/v1/scan", json!({ "payload": T2 })).await;
    assert_eq!(response.body["kind"], "already_used");

    let response = fixture.get("/api/v1/status").await;
    assert_eq!(response.body["is_online"], false);
    assert_eq!(response.body["has_offline_data"], true);
    assert_eq!(response.body["offline_ticket_count"], 2);
    assert_eq!(response.body["pending_count"], 1);

    // Sync while offline is a blocking condition.
    let response = fixture.post_empty("/api/v1/sync").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);

    // Connectivity returns; the drain succeeds.
    fixture.probe.set_online(true);
    let response = fixture.post_empty("/api/v1/sync").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["processed"], 1);
    assert_eq!(response.body["accepted"], 1);
    assert_eq!(response.body["remaining"], 0);

    let response = fixture.get("/api/v1/sync/pending").await;
    assert_eq!(response.body["pending_count"], 0);

    assert_eq!(
        fixture.directory.ticket(T1).await.unwrap().status,
        TicketStatus::Used
    );
}

#[tokio::test]
async fn test_offline_scan_without_snapshot_requires_download() {
    let fixture = TestFixture::new().await;
    fixture
        .directory
        .insert_ticket(fixtures::valid_ticket(T1, EVENT, "Ada Lovelace"))
        .await;
    fixture.probe.set_online(false);

    let response = fixture.post("/api/v1/scan", json!({ "payload": T1 })).await;
    assert_eq!(response.body["kind"], "download_required");
}

#[tokio::test]
async fn test_download_while_offline_is_unavailable() {
    let fixture = TestFixture::new().await;
    fixture.probe.set_online(false);

    let response = fixture.post_empty("/api/v1/offline/download").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);

    let response = fixture.get("/api/v1/status").await;
    assert_eq!(response.body["has_offline_data"], false);
}

#[tokio::test]
async fn test_clear_reports_dropped_pending() {
    let fixture = TestFixture::new().await;
    fixture
        .directory
        .insert_ticket(fixtures::valid_ticket(T1, EVENT, "Ada Lovelace"))
        .await;

    fixture.post_empty("/api/v1/offline/download").await;
    fixture.probe.set_online(false);
    fixture.post("/api/v1/scan", json!({ "payload": T1 })).await;

    let response = fixture.delete("/api/v1/offline").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["dropped_pending"], 1);

    let response = fixture.get("/api/v1/status").await;
    assert_eq!(response.body["has_offline_data"], false);
    assert_eq!(response.body["offline_ticket_count"], 0);
    assert_eq!(response.body["pending_count"], 0);
}

#[tokio::test]
async fn test_sync_conflict_surfaces_in_report_and_audit() {
    let fixture = TestFixture::new().await;
    let ticket = fixtures::valid_ticket(T1, EVENT, "Ada Lovelace");
    let ticket_id = ticket.id.clone();
    fixture.directory.insert_ticket(ticket).await;

    fixture.post_empty("/api/v1/offline/download").await;
    fixture.probe.set_online(false);
    fixture.post("/api/v1/scan", json!({ "payload": T1 })).await;

    // Another station consumes the same ticket online meanwhile.
    use turnstile_core::TicketDirectory;
    fixture
        .directory
        .check_in(&ticket_id, chrono::Utc::now())
        .await
        .unwrap();

    fixture.probe.set_online(true);
    let response = fixture.post_empty("/api/v1/sync").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["accepted"], 0);
    assert_eq!(response.body["conflicts"][0]["code"], T1);

    // The conflict accumulates in the audit log as the batch report.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let response = fixture.get("/api/v1/audit?event_type=sync_conflict").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["records"][0]["code"], T1);
}

#[tokio::test]
async fn test_streaming_frames_through_scan_session() {
    let fixture = TestFixture::new().await;
    fixture
        .directory
        .insert_ticket(fixtures::valid_ticket(T1, EVENT, "Ada Lovelace"))
        .await;

    // Frames pushed before the session starts are rejected.
    let response = fixture
        .post("/api/v1/scanner/frame", json!({ "payload": T1 }))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = fixture.post_empty("/api/v1/scanner/start").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_scanning"], true);

    // Starting twice is rejected.
    let response = fixture.post_empty("/api/v1/scanner/start").await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = fixture
        .post("/api/v1/scanner/frame", json!({ "payload": T1 }))
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    // The decoder loop processes the frame asynchronously.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(fixture.directory.checked_in_count().await, 1);

    let response = fixture.post_empty("/api/v1/scanner/stop").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_scanning"], false);
    assert!(!fixture.scanner.is_started());
}

#[tokio::test]
async fn test_transport_failure_falls_back_to_offline() {
    let fixture = TestFixture::new().await;
    fixture
        .directory
        .insert_ticket(fixtures::valid_ticket(T1, EVENT, "Ada Lovelace"))
        .await;

    fixture.post_empty("/api/v1/offline/download").await;

    // Probe still reports online, but the directory drops requests.
    fixture.directory.set_offline(true);

    let response = fixture.post("/api/v1/scan", json!({ "payload": T1 })).await;
    assert_eq!(response.body["type"], "success");
    assert_eq!(response.body["is_offline"], true);

    let response = fixture.get("/api/v1/sync/pending").await;
    assert_eq!(response.body["pending_count"], 1);
}
