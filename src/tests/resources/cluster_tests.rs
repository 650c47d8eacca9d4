//! Version, next-id, clone, snapshot and error-surface behaviour.

use crate::tests::support;
use crate::ProxmoxError;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[tokio::test]
async fn version_extracts_the_version_member() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"version": "8.1", "release": "8.1-4", "repoid": "abc123"}
        })))
        .mount(&server)
        .await;

    assert_eq!(client.version().await.unwrap().unwrap(), "8.1");
}

#[tokio::test]
async fn version_without_the_member_is_none() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"release": "8.1-4"}})),
        )
        .mount(&server)
        .await;

    assert_eq!(client.version().await.unwrap(), None);
}

#[tokio::test]
async fn next_vmid_parses_the_string_payload() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/nextid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "100"})))
        .mount(&server)
        .await;

    assert_eq!(client.next_vmid().await.unwrap(), Some(100));
}

#[tokio::test]
async fn next_vmid_zero_is_none() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/nextid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": 0})))
        .mount(&server)
        .await;

    assert_eq!(client.next_vmid().await.unwrap(), None);
}

#[tokio::test]
async fn next_vmid_absorbs_the_500_convention_into_none() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/nextid"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_eq!(client.next_vmid().await.unwrap(), None);
}

#[tokio::test]
async fn clone_vm_posts_the_fresh_target_id() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/nextid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "105"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/clone"))
        .and(body_string_contains("vmid=100"))
        .and(body_string_contains("node=pve1"))
        .and(body_string_contains("newid=105"))
        .and(body_string_contains("full=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "UPID:pve1:00000001:00000001:00000001:qmclone:100:provisioner@pam:"
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.clone_vm("pve1", 100).await.unwrap());
}

#[tokio::test]
async fn clone_vm_still_posts_when_no_next_id_is_available() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/nextid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": 0})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/clone"))
        .and(body_string_contains("full=1"))
        .and(|request: &Request| {
            !String::from_utf8_lossy(&request.body).contains("newid")
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "UPID:pve1:00000001:00000001:00000001:qmclone:100:provisioner@pam:"
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.clone_vm("pve1", 100).await.unwrap());
}

#[tokio::test]
async fn snapshot_vm_includes_the_runtime_state_and_name() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot"))
        .and(body_string_contains("vmstate=1"))
        .and(body_string_contains("snapname=nightly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "UPID:pve1:00000001:00000001:00000001:qmsnapshot:100:provisioner@pam:"
        })))
        .mount(&server)
        .await;

    assert!(client.snapshot_vm("pve1", 100, Some("nightly")).await.unwrap());
}

#[tokio::test]
async fn snapshot_vm_without_a_name_omits_snapname() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot"))
        .and(body_string_contains("vmstate=1"))
        .and(|request: &Request| {
            !String::from_utf8_lossy(&request.body).contains("snapname")
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "UPID:pve1:00000001:00000001:00000001:qmsnapshot:100:provisioner@pam:"
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.snapshot_vm("pve1", 100, None).await.unwrap());
}

#[tokio::test]
async fn remote_errors_surface_status_and_server_detail() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "data": null,
            "errors": "permission denied - missing 'Sys.Audit'"
        })))
        .mount(&server)
        .await;

    match client.version().await {
        Err(ProxmoxError::RemoteApi { status, message }) => {
            assert_eq!(status, 403);
            assert!(message.contains("permission denied"));
        }
        other => panic!("expected RemoteApi error, got {:?}", other),
    }
}

#[tokio::test]
async fn debug_mode_embeds_the_request_context_in_errors() {
    let server = MockServer::start().await;
    let client = support::debug_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&server)
        .await;

    match client.version().await {
        Err(ProxmoxError::RemoteApi { status, message }) => {
            assert_eq!(status, 403);
            assert!(message.contains("HTTP method: GET"));
            assert!(message.contains("/api2/json/version"));
            assert!(message.contains("denied"));
        }
        other => panic!("expected RemoteApi error, got {:?}", other),
    }
}

#[tokio::test]
async fn raw_verb_surface_reaches_arbitrary_endpoints() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/storage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"storage": "local-lvm", "type": "lvmthin"}]
        })))
        .mount(&server)
        .await;

    let storage = client.get("/nodes/pve1/storage").await.unwrap();
    assert_eq!(storage[0]["storage"], "local-lvm");
}

#[tokio::test]
async fn raw_put_and_delete_map_null_data_to_bare_success() {
    let server = MockServer::start().await;
    let client = support::authenticated_client(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api2/json/nodes/pve1/qemu/100/config"))
        .and(body_string_contains("memory=2048"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot/nightly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
        .mount(&server)
        .await;

    let params = vec![("memory".to_string(), "2048".to_string())];
    let updated = client.put("/nodes/pve1/qemu/100/config", params).await.unwrap();
    assert_eq!(updated, json!(true));

    let removed = client
        .delete("/nodes/pve1/qemu/100/snapshot/nightly")
        .await
        .unwrap();
    assert_eq!(removed, json!(true));
}
