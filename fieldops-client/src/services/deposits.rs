//! Deposit aggregator.
//!
//! Bundles N selected un-deposited collections into one bank deposit:
//! compute the total, create the deposit with its full line-item list in
//! one shot, optionally attach the slip photo, then flip each selected
//! collection's deposited flag. Unlike the collection recorder, nothing
//! after the create rolls the deposit back: the cash is already at the
//! bank, so a missing slip image or a failed flag update is tolerated and
//! logged rather than undone.

use fieldops_core::dates;
use fieldops_core::error::{FieldOpsError, Result};
use fieldops_core::models::{
    check_field, CollectionRecord, DepositLineItem, DepositRecord, ImageAsset,
    COLLECTION_DOCTYPE, DEPOSIT_DOCTYPE,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use crate::services::attachments::AttachmentUploader;
use crate::services::field_error;
use crate::services::gateway::{CreatedDoc, ErpGateway, Filter, ListQuery};
use crate::services::identity::IdentityResolver;
use crate::session::SessionContext;

/// Form input for one bank deposit over a selection of collections.
#[derive(Debug, Clone, Deserialize)]
pub struct DepositInput {
    /// Owning agent; defaults to the session identity when omitted.
    #[serde(default)]
    pub agent: Option<String>,
    /// Free-text date; empty means "today".
    #[serde(default)]
    pub deposit_date: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub deposit_location: Option<String>,
    #[serde(default)]
    pub slip_number: Option<String>,
    /// Un-deposited records picked on the selection screen, in display
    /// order. The caller guarantees none of them is already deposited.
    pub selected_collections: Vec<CollectionRecord>,
    /// Deposit slip photo, if one was captured.
    #[serde(default)]
    pub slip: Option<ImageAsset>,
}

#[derive(Debug, Serialize)]
struct NewDeposit<'a> {
    agent: &'a str,
    deposit_date: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deposit_location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slip_number: Option<&'a str>,
    amount_deposited: Decimal,
    collections: &'a [DepositLineItem],
}

#[derive(Debug, Serialize)]
struct SlipPatch<'a> {
    slip_image_ref: &'a str,
}

#[derive(Debug, Serialize)]
struct DepositedPatch {
    #[serde(with = "check_field")]
    is_deposited: bool,
}

#[derive(Clone)]
pub struct DepositAggregator {
    gateway: ErpGateway,
    identity: IdentityResolver,
    uploader: AttachmentUploader,
}

impl DepositAggregator {
    pub fn new(
        gateway: ErpGateway,
        identity: IdentityResolver,
        uploader: AttachmentUploader,
    ) -> Self {
        Self {
            gateway,
            identity,
            uploader,
        }
    }

    /// Record one deposit over the selected collections and return the
    /// stored record.
    pub async fn record(
        &self,
        session: &SessionContext,
        input: DepositInput,
    ) -> Result<DepositRecord> {
        if input.selected_collections.is_empty() {
            return Err(FieldOpsError::EmptySelection);
        }
        if matches!(&input.agent, Some(agent) if agent.trim().is_empty()) {
            let mut errors = ValidationErrors::new();
            errors.add("agent", field_error("required", "agent must not be blank"));
            return Err(errors.into());
        }
        let deposit_date = dates::normalize_date(&input.deposit_date)?;

        let identity = self.identity.resolve(session).await?;
        let agent = input
            .agent
            .as_deref()
            .map(str::trim)
            .filter(|agent| !agent.is_empty())
            .unwrap_or(&identity.email);

        let total_amount: Decimal = input
            .selected_collections
            .iter()
            .map(|collection| collection.amount)
            .sum();
        let line_items: Vec<DepositLineItem> = input
            .selected_collections
            .iter()
            .map(|collection| DepositLineItem {
                collection_id: collection.id.clone(),
                amount: collection.amount,
            })
            .collect();

        let payload = NewDeposit {
            agent,
            deposit_date: &deposit_date,
            bank_name: input.bank_name.as_deref(),
            branch: input.branch.as_deref(),
            deposit_location: input.deposit_location.as_deref(),
            slip_number: input.slip_number.as_deref(),
            amount_deposited: total_amount,
            collections: &line_items,
        };

        let created: CreatedDoc = self
            .gateway
            .create_doc(session, DEPOSIT_DOCTYPE, &payload)
            .await?;
        tracing::info!(
            id = %created.name,
            agent,
            total = %total_amount,
            items = line_items.len(),
            "deposit created"
        );

        if let Some(slip) = &input.slip {
            self.link_slip(session, &created.name, slip).await;
        }

        for collection in &input.selected_collections {
            if let Err(err) = self
                .gateway
                .update_doc(
                    session,
                    COLLECTION_DOCTYPE,
                    &collection.id,
                    &DepositedPatch { is_deposited: true },
                )
                .await
            {
                // Tolerated: the record stays on the un-deposited list
                // until the discrepancy is resolved remotely.
                tracing::error!(
                    deposit = %created.name,
                    collection = %collection.id,
                    error = %err,
                    "failed to flag collection as deposited"
                );
            }
        }

        self.gateway
            .fetch_doc(session, DEPOSIT_DOCTYPE, &created.name)
            .await
    }

    /// Deposits owned by `agent`, newest first.
    pub async fn list_deposits(
        &self,
        session: &SessionContext,
        agent: &str,
    ) -> Result<Vec<DepositRecord>> {
        let query = ListQuery::new()
            .filter(Filter::eq("agent", agent))
            .fields(&["*"])
            .order_by("deposit_date desc")
            .limit(0);
        self.gateway
            .list_docs(session, DEPOSIT_DOCTYPE, &query)
            .await
    }

    /// Slip failures never roll the deposit back; they are logged and the
    /// operation proceeds.
    async fn link_slip(&self, session: &SessionContext, id: &str, slip: &ImageAsset) {
        match self
            .uploader
            .upload(session, slip, DEPOSIT_DOCTYPE, id, "slip_image_ref")
            .await
        {
            Ok(url) => {
                if let Err(err) = self
                    .gateway
                    .update_doc(
                        session,
                        DEPOSIT_DOCTYPE,
                        id,
                        &SlipPatch {
                            slip_image_ref: &url,
                        },
                    )
                    .await
                {
                    tracing::warn!(id, error = %err, "failed to link slip image");
                }
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "slip upload failed");
            }
        }
    }
}
