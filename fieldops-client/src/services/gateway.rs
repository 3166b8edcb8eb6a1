//! Remote entity gateway.
//!
//! Every remote doctype goes through the same primitives so orchestrators
//! compose create/update/fetch/list instead of hand-rolling protocol
//! details. Session-cookie attachment and error classification live here
//! and nowhere else; field-map marshalling happens at this boundary via
//! serde generics.

use fieldops_core::error::{FieldOpsError, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::session::SessionContext;

#[derive(Clone)]
pub struct ErpGateway {
    http: Client,
    base_url: String,
}

/// `{"data": …}` envelope wrapping every `/resource` response.
#[derive(Debug, Deserialize)]
struct ResourceEnvelope<T> {
    data: T,
}

/// `{"message": …}` envelope wrapping `/method` responses.
#[derive(Debug, Deserialize)]
struct MethodEnvelope<T> {
    message: T,
}

/// Minimal view of a freshly created document: the server-assigned id.
#[derive(Debug, Deserialize)]
pub struct CreatedDoc {
    pub name: String,
}

/// One `[field, operator, value]` filter triple for list queries.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub operator: String,
    pub value: serde_json::Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            operator: "=".to_string(),
            value: value.into(),
        }
    }

    fn as_triple(&self) -> serde_json::Value {
        serde_json::json!([self.field, self.operator, self.value])
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub fields: Vec<String>,
    pub order_by: Option<String>,
    /// `Some(0)` asks the remote store for an unbounded page.
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn order_by(mut self, order_by: &str) -> Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn filters_json(&self) -> String {
        serde_json::Value::Array(self.filters.iter().map(Filter::as_triple).collect()).to_string()
    }
}

impl ErpGateway {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resource_url(&self, doctype: &str) -> String {
        format!("{}/resource/{}", self.base_url, doctype)
    }

    fn doc_url(&self, doctype: &str, id: &str) -> String {
        format!("{}/resource/{}/{}", self.base_url, doctype, id)
    }

    /// Create a document. The returned server-assigned fields (the id in
    /// particular) are authoritative for all subsequent operations.
    pub async fn create_doc<T, R>(
        &self,
        session: &SessionContext,
        doctype: &str,
        doc: &T,
    ) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.resource_url(doctype))
            .header(header::COOKIE, session.cookie())
            .json(doc)
            .send()
            .await?;

        let envelope: ResourceEnvelope<R> = self.classify(response, doctype, "create").await?;
        Ok(envelope.data)
    }

    /// Partial update of one document.
    pub async fn update_doc<T>(
        &self,
        session: &SessionContext,
        doctype: &str,
        id: &str,
        patch: &T,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .http
            .put(self.doc_url(doctype, id))
            .header(header::COOKIE, session.cookie())
            .json(patch)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(doctype, id, "document updated");
            return Ok(());
        }

        let body = response.text().await?;
        tracing::error!(doctype, id, status = %status, body = %body, "document update rejected");
        Err(FieldOpsError::RemoteRejected {
            status: status.as_u16(),
            body,
        })
    }

    /// Best-effort delete. Only ever invoked as compensation inside an
    /// already-failing path, so failures are logged and swallowed.
    pub async fn delete_doc(&self, session: &SessionContext, doctype: &str, id: &str) {
        let outcome = self
            .http
            .delete(self.doc_url(doctype, id))
            .header(header::COOKIE, session.cookie())
            .send()
            .await;

        match outcome {
            Ok(response) if response.status().is_success() => {
                tracing::info!(doctype, id, "compensating delete succeeded");
            }
            Ok(response) => {
                tracing::warn!(doctype, id, status = %response.status(), "compensating delete rejected");
            }
            Err(err) => {
                tracing::warn!(doctype, id, error = %err, "compensating delete did not reach the store");
            }
        }
    }

    /// Fetch the authoritative server-side representation of one document.
    pub async fn fetch_doc<R: DeserializeOwned>(
        &self,
        session: &SessionContext,
        doctype: &str,
        id: &str,
    ) -> Result<R> {
        let response = self
            .http
            .get(self.doc_url(doctype, id))
            .header(header::COOKIE, session.cookie())
            .send()
            .await?;

        let envelope: ResourceEnvelope<R> = self.classify(response, doctype, "fetch").await?;
        Ok(envelope.data)
    }

    pub async fn list_docs<R: DeserializeOwned>(
        &self,
        session: &SessionContext,
        doctype: &str,
        query: &ListQuery,
    ) -> Result<Vec<R>> {
        let mut request = self
            .http
            .get(self.resource_url(doctype))
            .header(header::COOKIE, session.cookie())
            .query(&[("filters", query.filters_json())]);

        if !query.fields.is_empty() {
            request = request.query(&[("fields", serde_json::to_string(&query.fields)?)]);
        }
        if let Some(order_by) = &query.order_by {
            request = request.query(&[("order_by", order_by.clone())]);
        }
        if let Some(limit) = query.limit {
            request = request.query(&[("limit_page_length", limit.to_string())]);
        }

        let envelope: ResourceEnvelope<Vec<R>> =
            self.classify(request.send().await?, doctype, "list").await?;
        Ok(envelope.data)
    }

    /// Call a whitelisted server method (`GET {base}/method/{method}`).
    pub async fn call_method<R: DeserializeOwned>(
        &self,
        session: &SessionContext,
        method: &str,
    ) -> Result<R> {
        let response = self
            .http
            .get(format!("{}/method/{}", self.base_url, method))
            .header(header::COOKIE, session.cookie())
            .send()
            .await?;

        let envelope: MethodEnvelope<R> = self.classify(response, method, "method").await?;
        Ok(envelope.message)
    }

    async fn classify<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        target: &str,
        op: &str,
    ) -> Result<R> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(endpoint = target, op, status = %status, "remote store response");

        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            tracing::error!(endpoint = target, op, status = %status, body = %body, "remote store rejected request");
            Err(FieldOpsError::RemoteRejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
