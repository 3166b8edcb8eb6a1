//! Resolves the operating agent from the remote session.
//!
//! Resolved fresh on every orchestration: the session can expire between
//! screen loads, and a stale identity must fail loudly rather than stamp
//! records with the wrong agent.

use anyhow::anyhow;
use fieldops_core::error::{FieldOpsError, Result};
use fieldops_core::models::AgentIdentity;
use serde::Deserialize;

use crate::services::gateway::ErpGateway;
use crate::session::SessionContext;

#[derive(Clone)]
pub struct IdentityResolver {
    gateway: ErpGateway,
}

#[derive(Debug, Deserialize)]
struct UserDoc {
    #[serde(default)]
    full_name: Option<String>,
}

impl IdentityResolver {
    pub fn new(gateway: ErpGateway) -> Self {
        Self { gateway }
    }

    /// Resolve the logged-in agent's email and display name.
    pub async fn resolve(&self, session: &SessionContext) -> Result<AgentIdentity> {
        let email: String = self
            .gateway
            .call_method(session, "frappe.auth.get_logged_user")
            .await
            .map_err(auth_error)?;

        // The store answers "Guest" for anonymous sessions instead of 403.
        if email.is_empty() || email == "Guest" {
            return Err(FieldOpsError::Auth(anyhow!("no authenticated session")));
        }

        let user: UserDoc = self
            .gateway
            .fetch_doc(session, "User", &email)
            .await
            .map_err(auth_error)?;

        Ok(AgentIdentity {
            display_name: user
                .full_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| email.clone()),
            email,
        })
    }
}

fn auth_error(err: FieldOpsError) -> FieldOpsError {
    FieldOpsError::Auth(anyhow::Error::new(err))
}
