use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub erp: ErpConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ErpConfig {
    /// Base URL of the remote store's REST surface,
    /// e.g. `https://erp.example.com/api`.
    pub base_url: String,
    /// Store uploaded attachments as private files.
    pub private_uploads: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let base_url =
            env::var("FIELDOPS_ERP_BASE_URL").expect("FIELDOPS_ERP_BASE_URL must be set");
        let private_uploads = env::var("FIELDOPS_PRIVATE_UPLOADS")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Ok(Self {
            erp: ErpConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                private_uploads,
            },
            service_name: "fieldops-client".to_string(),
        })
    }
}
