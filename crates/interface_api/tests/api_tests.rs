//! HTTP tests for the warranty API against the seeded in-memory world

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use core_kernel::{PartNumber, WarehouseId};
use domain_warranty::InventoryPort;
use interface_api::{config::ApiConfig, create_router, AppState};
use test_utils::{MockWorld, VehicleFixtures, CENTER, CREATOR, INITIAL_STOCK, TECHNICIAN};

async fn server() -> (TestServer, MockWorld) {
    let world = MockWorld::new().await;
    let app = create_router(AppState::new(world.workflow.clone(), ApiConfig::default()));
    (TestServer::new(app).unwrap(), world)
}

fn claim_body(vin: &str) -> Value {
    json!({
        "center_id": CENTER.get(),
        "vin": vin,
        "created_by": CREATOR.get(),
        "assigned_technician": TECHNICIAN.get(),
        "description": "Brake noise at low speed"
    })
}

async fn open_claim(server: &TestServer, vin: &str) -> String {
    let response = server.post("/api/v1/claims").json(&claim_body(vin)).await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["claim"]["id"].as_str().unwrap().to_string()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let (server, _world) = server().await;
        let response = server.get("/health").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_adapter() {
        let (server, _world) = server().await;
        let response = server.get("/health/ready").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["adapter"]["adapter_id"], "in-memory-warranty-store");
    }

    #[tokio::test]
    async fn test_request_id_is_generated_and_echoed() {
        let (server, _world) = server().await;

        let generated = server.get("/api/v1/vehicles").await;
        assert!(generated.headers().contains_key("x-request-id"));

        let echoed = server
            .get("/api/v1/vehicles")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("req-42"),
            )
            .await;
        assert_eq!(echoed.headers()["x-request-id"], "req-42");
    }
}

mod claims {
    use super::*;

    #[tokio::test]
    async fn test_create_claim_assigns_sequential_ids() {
        let (server, _world) = server().await;
        let vin = VehicleFixtures::vf5();

        let first = open_claim(&server, vin.as_str()).await;
        let second = open_claim(&server, vin.as_str()).await;

        assert_eq!(first, "WC-5-2025-10-10-001");
        assert_eq!(second, "WC-5-2025-10-10-002");
    }

    #[tokio::test]
    async fn test_short_vin_is_unprocessable() {
        let (server, _world) = server().await;
        let response = server.post("/api/v1/claims").json(&claim_body("VF8")).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
        assert!(body["details"]["vin"].is_array());
        assert_eq!(body["transient"], false);
    }

    #[tokio::test]
    async fn test_malformed_claim_id_is_unprocessable() {
        let (server, _world) = server().await;
        let response = server.get("/api/v1/claims/WC-5-20251010-1").await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.json::<Value>()["details"]["claim_id"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_claim_is_not_found() {
        let (server, _world) = server().await;
        let response = server.get("/api/v1/claims/WC-5-2025-10-10-099").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_confirmed_campaign_books_appointment() {
        let (server, _world) = server().await;
        let mut body = claim_body(VehicleFixtures::vf8().as_str());
        body["confirm_campaign"] = json!(true);

        let response = server.post("/api/v1/claims").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["claim"]["campaign_ids"], json!([1]));
        assert_eq!(created["campaign_match"]["kind"], "single");
        assert_eq!(created["appointment"]["status"], "SCHEDULED");

        let week: Value = server
            .get("/api/v1/appointments")
            .add_query_param("window", "7d")
            .await
            .json();
        assert_eq!(week.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_status_filter() {
        let (server, _world) = server().await;
        open_claim(&server, VehicleFixtures::vf5().as_str()).await;

        let checking: Value = server
            .get("/api/v1/claims")
            .add_query_param("status", "check")
            .await
            .json();
        let done: Value = server
            .get("/api/v1/claims")
            .add_query_param("status", "DONE")
            .await
            .json();

        assert_eq!(checking.as_array().unwrap().len(), 1);
        assert!(done.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_lifecycle_reconciles_stock() {
        let (server, world) = server().await;
        let id = open_claim(&server, VehicleFixtures::vf5().as_str()).await;

        let checked = server
            .post(&format!("/api/v1/claims/{}/check", id))
            .json(&json!({
                "parts": [
                    { "part_number": "A", "part_id": 1, "quantity": 2, "is_repair": true },
                    { "part_number": "B", "part_id": 2, "quantity": 1, "is_repair": false },
                    { "part_number": "C", "part_id": 3, "quantity": 1, "is_repair": true }
                ]
            }))
            .await;
        checked.assert_status_ok();
        assert_eq!(checked.json::<Value>()["status"], "REPAIR");

        let deciding = server
            .post(&format!("/api/v1/claims/{}/decision-request", id))
            .await;
        assert_eq!(deciding.json::<Value>()["status"], "DECIDE");

        let ledger: Value = server.get(&format!("/api/v1/claims/{}/ledger", id)).await.json();
        assert_eq!(ledger["fully_reviewed"], false);
        assert_eq!(ledger["unreviewed"], json!([0, 1]));

        let response = server
            .post(&format!("/api/v1/claims/{}/finalize", id))
            .json(&json!({
                "evm_id": 900,
                "description": "Covered",
                "commands": [{ "action": "bulk_approve", "value": true }]
            }))
            .await;
        response.assert_status_ok();
        let outcome: Value = response.json();
        assert_eq!(outcome["outcome"], "completed");
        assert_eq!(outcome["path"], "reconciled");
        assert_eq!(outcome["claim"]["status"], "DONE");
        assert_eq!(outcome["plan"]["skipped"][0]["part_number"], "C");
        assert_eq!(outcome["plan"]["skipped"][0]["reason"], "warehouse_mismatch");

        let level = world
            .store
            .stock_level(WarehouseId::new(5), &PartNumber::new("A"))
            .await
            .unwrap();
        assert_eq!(level, INITIAL_STOCK - 2);

        let comments: Value = server.get(&format!("/api/v1/claims/{}/comments", id)).await.json();
        assert_eq!(comments[0]["body"], "Covered");

        let again = server
            .post(&format!("/api/v1/claims/{}/finalize", id))
            .json(&json!({ "evm_id": 900, "commands": [] }))
            .await;
        assert_eq!(again.json::<Value>()["outcome"], "already_finalized");
    }

    #[tokio::test]
    async fn test_skipping_a_step_conflicts() {
        let (server, _world) = server().await;
        let id = open_claim(&server, VehicleFixtures::vf5().as_str()).await;

        let response = server
            .post(&format!("/api/v1/claims/{}/decision-request", id))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }
}

mod campaigns {
    use super::*;

    fn draft(start: &str, end: &str) -> Value {
        json!({
            "name": "Battery inspection",
            "models": ["VF8"],
            "description": "Inspect coolant lines",
            "start_date": start,
            "end_date": end
        })
    }

    #[tokio::test]
    async fn test_vehicle_with_overlapping_campaigns_preselects_lowest() {
        let (server, _world) = server().await;
        let body: Value = server
            .get(&format!("/api/v1/vehicles/{}/campaigns", VehicleFixtures::vf9()))
            .await
            .json();

        assert_eq!(body["campaign_match"]["kind"], "multiple");
        assert_eq!(body["preselected"], 2);
        assert_eq!(body["statuses"]["2"], "on going");
    }

    #[tokio::test]
    async fn test_completed_campaign_is_listed_with_its_status() {
        let (server, _world) = server().await;
        let body: Value = server
            .get(&format!("/api/v1/vehicles/{}/campaigns", VehicleFixtures::vf5()))
            .await
            .json();

        assert_eq!(body["campaign_match"]["kind"], "single");
        assert_eq!(body["preselected"], 9);
        assert_eq!(body["statuses"]["9"], "completed");
    }

    #[tokio::test]
    async fn test_validate_clears_short_due_date() {
        let (server, _world) = server().await;
        let response = server
            .post("/api/v1/campaigns/validate")
            .json(&draft("2025-10-11", "2025-10-13"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["valid"], false);
        assert!(body["errors"]["end_date"].is_array());
        assert!(body["draft"]["end_date"].is_null());
    }

    #[tokio::test]
    async fn test_create_and_list_campaign() {
        let (server, _world) = server().await;
        let response = server
            .post("/api/v1/campaigns")
            .json(&draft("2025-10-11", "2025-11-10"))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["id"], 10);

        let listed: Value = server.get("/api/v1/campaigns").await.json();
        let created = listed
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["id"] == 10)
            .unwrap();
        assert_eq!(created["status"], "not yet");
    }

    #[tokio::test]
    async fn test_invalid_campaign_is_unprocessable() {
        let (server, _world) = server().await;
        let response = server
            .post("/api/v1/campaigns")
            .json(&draft("2025-10-01", "2025-10-30"))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.json::<Value>()["details"]["start_date"].is_array());
    }

    #[tokio::test]
    async fn test_report_once_per_center() {
        let (server, _world) = server().await;
        let report = json!({
            "center_id": 5,
            "submitted_by": [7, 21],
            "original_file_name": "airbag-report.pdf",
            "file_ref": "uploads/airbag-report.pdf"
        });

        let first = server.post("/api/v1/campaigns/9/reports").json(&report).await;
        first.assert_status(StatusCode::CREATED);

        let second = server.post("/api/v1/campaigns/9/reports").json(&report).await;
        second.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_report_before_completion_conflicts() {
        let (server, _world) = server().await;
        let response = server
            .post("/api/v1/campaigns/1/reports")
            .json(&json!({
                "center_id": 5,
                "submitted_by": [7],
                "original_file_name": "brake.pdf",
                "file_ref": "uploads/brake.pdf"
            }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_appointment_window_is_unprocessable() {
        let (server, _world) = server().await;
        let response = server
            .get("/api/v1/appointments")
            .add_query_param("window", "90d")
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
