mod common;

use common::TestErp;
use fieldops_client::models::ImageAsset;
use fieldops_client::services::attachments::AttachmentUploader;
use fieldops_client::services::gateway::ErpGateway;
use fieldops_client::session::SessionContext;
use fieldops_client::FieldOpsError;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn list_encodes_filters_fields_order_and_limit() {
    let erp = TestErp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/resource/Collection"))
        .and(query_param(
            "filters",
            r#"[["agent","=","agent@example.com"],["is_deposited","=",0]]"#,
        ))
        .and(query_param("fields", r#"["*"]"#))
        .and(query_param("order_by", "collected_at desc"))
        .and(query_param("limit_page_length", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&erp.server)
        .await;

    let records = erp
        .client
        .collections
        .list_undeposited(&erp.session, "agent@example.com")
        .await
        .expect("list should succeed");
    assert!(records.is_empty());
}

#[tokio::test]
async fn session_cookie_is_attached_to_requests() {
    let erp = TestErp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/resource/Collection"))
        .and(header("cookie", "sid=test-sid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&erp.server)
        .await;

    erp.client
        .collections
        .list_undeposited(&erp.session, "agent@example.com")
        .await
        .expect("cookie should match");
}

#[tokio::test]
async fn non_2xx_surfaces_status_and_body() {
    let server = MockServer::start().await;
    let gateway = ErpGateway::new(reqwest::Client::new(), server.uri());
    let session = SessionContext::new("test-sid");

    Mock::given(method("GET"))
        .and(path("/resource/Collection/COL-404"))
        .respond_with(ResponseTemplate::new(417).set_body_string("no such record"))
        .mount(&server)
        .await;

    let err = gateway
        .fetch_doc::<serde_json::Value>(&session, "Collection", "COL-404")
        .await
        .expect_err("non-2xx should be rejected");

    assert_eq!(err.remote_status(), Some(417));
    match err {
        FieldOpsError::RemoteRejected { status, body } => {
            assert_eq!(status, 417);
            assert_eq!(body, "no such record");
        }
        other => panic!("expected RemoteRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn best_effort_delete_swallows_rejections() {
    let server = MockServer::start().await;
    let gateway = ErpGateway::new(reqwest::Client::new(), server.uri());
    let session = SessionContext::new("test-sid");

    Mock::given(method("DELETE"))
        .and(path("/resource/Collection/COL-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("cannot delete"))
        .expect(1)
        .mount(&server)
        .await;

    // Returns unit either way; a rejection must not panic or propagate.
    gateway.delete_doc(&session, "Collection", "COL-1").await;
}

#[tokio::test]
async fn asset_without_uri_fails_before_any_call() {
    let server = MockServer::start().await;
    let uploader = AttachmentUploader::new(reqwest::Client::new(), server.uri(), true);
    let session = SessionContext::new("test-sid");

    let asset = ImageAsset {
        uri: None,
        file_name: "receipt.jpg".to_string(),
    };

    let err = uploader
        .upload(&session, &asset, "Collection", "COL-1", "receipt_image_ref")
        .await
        .expect_err("asset without uri should fail");
    assert!(matches!(err, FieldOpsError::InvalidAsset));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_response_without_url_is_a_failure() {
    let server = MockServer::start().await;
    let uploader = AttachmentUploader::new(reqwest::Client::new(), server.uri(), true);
    let session = SessionContext::new("test-sid");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, b"jpeg bytes").unwrap();

    Mock::given(method("POST"))
        .and(path("/method/upload_file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": {} })))
        .mount(&server)
        .await;

    let asset = ImageAsset::new(file.path().to_string_lossy(), "receipt.jpg");
    let err = uploader
        .upload(&session, &asset, "Collection", "COL-1", "receipt_image_ref")
        .await
        .expect_err("missing file_url should fail");

    assert_eq!(err.remote_status(), Some(200));
    match err {
        FieldOpsError::UploadFailed { status, .. } => assert_eq!(status, 200),
        other => panic!("expected UploadFailed, got {other:?}"),
    }
}
