//! fieldops-client: field-operations client core.
//!
//! The UI layer collects form input and calls the two orchestrators here;
//! each runs a strictly sequential chain of remote calls against the ERP
//! store, with best-effort compensation on partial failure. See the
//! `services` modules for the individual components.

pub mod config;
pub mod services;
pub mod session;

pub use fieldops_core::error::{FieldOpsError, Result};
pub use fieldops_core::models;

use config::Config;
use services::attachments::AttachmentUploader;
use services::collections::CollectionRecorder;
use services::deposits::DepositAggregator;
use services::gateway::ErpGateway;
use services::identity::IdentityResolver;

/// Entry point handed to the UI layer: one shared HTTP client wired into
/// the gateway and the orchestrators.
#[derive(Clone)]
pub struct FieldOpsClient {
    pub identity: IdentityResolver,
    pub collections: CollectionRecorder,
    pub deposits: DepositAggregator,
}

impl FieldOpsClient {
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::new();
        let gateway = ErpGateway::new(http.clone(), config.erp.base_url.clone());
        let uploader =
            AttachmentUploader::new(http, config.erp.base_url, config.erp.private_uploads);
        let identity = IdentityResolver::new(gateway.clone());
        let collections =
            CollectionRecorder::new(gateway.clone(), identity.clone(), uploader.clone());
        let deposits = DepositAggregator::new(gateway, identity.clone(), uploader);

        Self {
            identity,
            collections,
            deposits,
        }
    }
}
