//! Integration tests for the ARM management client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use azptu_client::credential::StaticCredential;
use azptu_client::management::{ArmClient, DeploymentSpec, ManagementClient};
use azptu_core::{DeploymentScope, PtuError};

const DEPLOYMENT_PATH: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.CognitiveServices/accounts/acct/deployments/dep";
const DEPLOYMENTS_PATH: &str =
    "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.CognitiveServices/accounts/acct/deployments";

fn scope() -> DeploymentScope {
    DeploymentScope {
        subscription_id: "sub".into(),
        resource_group: "rg".into(),
        account_name: "acct".into(),
    }
}

fn client(server: &MockServer) -> ArmClient {
    ArmClient::new(Arc::new(StaticCredential::new("test-token")))
        .with_base_url(server.uri())
        .with_poll_interval(Duration::from_millis(1))
}

fn spec() -> DeploymentSpec {
    DeploymentSpec {
        sku_name: "ProvisionedManaged".into(),
        capacity: 20,
        model_format: "OpenAI".into(),
        model_name: "gpt-4o".into(),
        model_version: "2024-08-06".into(),
    }
}

fn deployment_body(state: &str) -> serde_json::Value {
    json!({
        "name": "dep",
        "sku": {"name": "ProvisionedManaged", "capacity": 20},
        "properties": {
            "model": {"format": "OpenAI", "name": "gpt-4o", "version": "2024-08-06"},
            "provisioningState": state
        }
    })
}

#[tokio::test]
async fn get_parses_the_deployment_projection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .and(query_param("api-version", "2024-10-01"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deployment_body("Succeeded")))
        .mount(&server)
        .await;

    let record = client(&server).get(&scope(), "dep").await.unwrap();

    assert_eq!(record.name, "dep");
    assert_eq!(record.model_name.as_deref(), Some("gpt-4o"));
    assert_eq!(record.model_version.as_deref(), Some("2024-08-06"));
    assert_eq!(record.sku_name.as_deref(), Some("ProvisionedManaged"));
    assert_eq!(record.capacity, Some(20));
    assert_eq!(record.provisioning_state.as_deref(), Some("Succeeded"));
}

#[tokio::test]
async fn get_classifies_a_missing_deployment_as_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "DeploymentNotFound", "message": "no such deployment"}
        })))
        .mount(&server)
        .await;

    let err = client(&server).get(&scope(), "dep").await.unwrap_err();
    match err {
        PtuError::NotFound { resource } => assert_eq!(resource, "dep"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn create_polls_until_the_operation_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(deployment_body("Creating")))
        .mount(&server)
        .await;
    // First poll still running, second poll terminal.
    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(deployment_body("Creating")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(deployment_body("Succeeded")))
        .mount(&server)
        .await;

    let record = client(&server)
        .create_or_update(&scope(), "dep", &spec())
        .await
        .unwrap();
    assert_eq!(record.provisioning_state.as_deref(), Some("Succeeded"));
}

#[tokio::test]
async fn create_surfaces_a_failed_terminal_state() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(deployment_body("Creating")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(deployment_body("Failed")))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_or_update(&scope(), "dep", &spec())
        .await
        .unwrap_err();
    match err {
        PtuError::Remote { message, .. } => assert!(message.contains("Failed")),
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn create_classifies_capacity_and_quota_rejections() {
    for (status, expect_capacity) in [(429, true), (403, false)] {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(DEPLOYMENT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"code": "Rejected", "message": "rejected by the platform"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_or_update(&scope(), "dep", &spec())
            .await
            .unwrap_err();
        match (expect_capacity, err) {
            (true, PtuError::CapacityUnavailable { .. }) => {}
            (false, PtuError::QuotaInsufficient { .. }) => {}
            (_, other) => panic!("unexpected classification for {status}: {other:?}"),
        }
    }
}

#[tokio::test]
async fn delete_polls_until_the_deployment_disappears() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(deployment_body("Deleting")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "DeploymentNotFound", "message": "gone"}
        })))
        .mount(&server)
        .await;

    client(&server).delete(&scope(), "dep").await.unwrap();
}

#[tokio::test]
async fn delete_accepts_an_immediate_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client(&server).delete(&scope(), "dep").await.unwrap();
}

#[tokio::test]
async fn list_collects_the_value_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEPLOYMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [deployment_body("Succeeded"), deployment_body("Creating")]
        })))
        .mount(&server)
        .await;

    let records = client(&server).list(&scope()).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "dep");
}
