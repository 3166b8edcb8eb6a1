use fieldops_client::config::{Config, ErpConfig};
use fieldops_client::session::SessionContext;
use fieldops_client::FieldOpsClient;
use serde_json::json;
use std::sync::Once;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_AGENT: &str = "agent@example.com";

static TRACING: Once = Once::new();

/// A wiremock stand-in for the remote ERP plus a client wired to it.
pub struct TestErp {
    pub server: MockServer,
    pub client: FieldOpsClient,
    pub session: SessionContext,
}

impl TestErp {
    pub async fn spawn() -> Self {
        TRACING.call_once(|| {
            fieldops_core::observability::init_tracing("info,fieldops_client=debug");
        });

        let server = MockServer::start().await;

        let config = Config {
            erp: ErpConfig {
                base_url: server.uri(),
                private_uploads: true,
            },
            service_name: "fieldops-client-test".to_string(),
        };
        let client = FieldOpsClient::new(config);
        let session = SessionContext::new("test-sid");

        Self {
            server,
            client,
            session,
        }
    }

    /// Mount the two identity endpoints every orchestration starts with.
    pub async fn mount_identity(&self) {
        Mock::given(method("GET"))
            .and(path("/method/frappe.auth.get_logged_user"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": TEST_AGENT })),
            )
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/resource/User/{TEST_AGENT}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "full_name": "Test Agent" } })),
            )
            .mount(&self.server)
            .await;
    }

    /// All requests the mock ERP has seen so far.
    pub async fn requests(&self) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .expect("request recording is enabled")
    }

    /// Body of the first recorded request matching `method`/`path`.
    pub async fn request_body(&self, http_method: &str, request_path: &str) -> serde_json::Value {
        let request = self
            .requests()
            .await
            .into_iter()
            .find(|request| {
                request.method.to_string() == http_method && request.url.path() == request_path
            })
            .unwrap_or_else(|| panic!("no {http_method} {request_path} request recorded"));
        serde_json::from_slice(&request.body).expect("request body is JSON")
    }
}

/// A stored collection record as the mock ERP would return it.
pub fn collection_json(id: &str, amount: &str, deposited: bool) -> serde_json::Value {
    json!({
        "name": id,
        "agent": TEST_AGENT,
        "customer": "CUST-77",
        "collected_at": "2025-11-24 10:30:00",
        "amount": amount,
        "payment_mode": "Cash",
        "is_deposited": if deposited { 1 } else { 0 },
        "docstatus": 0
    })
}
