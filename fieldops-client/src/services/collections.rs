//! Collection recorder.
//!
//! Orchestrates the create/upload/link sequence for one customer payment:
//! validate and normalize the form input, create the record, optionally
//! upload and link a receipt photo, then re-fetch the authoritative
//! server-side representation. Every failure after the create compensates
//! with a best-effort delete of the created document.

use fieldops_core::dates;
use fieldops_core::error::Result;
use fieldops_core::models::{
    check_field, CollectionRecord, ImageAsset, PaymentMode, COLLECTION_DOCTYPE,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

use crate::services::attachments::AttachmentUploader;
use crate::services::field_error;
use crate::services::gateway::{CreatedDoc, ErpGateway, Filter, ListQuery};
use crate::services::identity::IdentityResolver;
use crate::session::SessionContext;

/// Form input for recording one collection, as the agent typed it.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CollectionInput {
    /// Owning agent; defaults to the session identity when omitted.
    #[serde(default)]
    pub agent: Option<String>,
    #[validate(length(min = 1, message = "customer is required"))]
    pub customer: String,
    #[serde(default)]
    pub case_ref: Option<String>,
    /// Free-text date; empty means "now".
    #[serde(default)]
    pub collected_at: String,
    #[validate(length(min = 1, message = "amount is required"))]
    pub amount: String,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub upi_txn_id: Option<String>,
    #[serde(default)]
    pub pg_ref_no: Option<String>,
    #[serde(default)]
    pub cheque_no: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Receipt photo captured on the device, if any.
    #[serde(default)]
    pub receipt: Option<ImageAsset>,
}

#[derive(Debug, Serialize)]
struct NewCollection<'a> {
    agent: &'a str,
    customer: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    case_ref: Option<&'a str>,
    collected_at: &'a str,
    amount: Decimal,
    payment_mode: PaymentMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    upi_txn_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pg_ref_no: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cheque_no: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_name: Option<&'a str>,
    #[serde(with = "check_field")]
    is_deposited: bool,
}

#[derive(Debug, Serialize)]
struct ReceiptPatch<'a> {
    receipt_image_ref: &'a str,
}

#[derive(Clone)]
pub struct CollectionRecorder {
    gateway: ErpGateway,
    identity: IdentityResolver,
    uploader: AttachmentUploader,
}

impl CollectionRecorder {
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

    /// Record one collection and return the stored record.
    pub async fn record(
        &self,
        session: &SessionContext,
        input: CollectionInput,
    ) -> Result<CollectionRecord> {
        let amount = validate_input(&input)?;
        let collected_at = dates::normalize_datetime(&input.collected_at)?;

        let identity = self.identity.resolve(session).await?;
        let agent = input
            .agent
            .as_deref()
            .map(str::trim)
            .filter(|agent| !agent.is_empty())
            .unwrap_or(&identity.email);

        let payload = NewCollection {
            agent,
            customer: input.customer.trim(),
            case_ref: input.case_ref.as_deref(),
            collected_at: &collected_at,
            amount,
            payment_mode: input.payment_mode,
            upi_txn_id: input.upi_txn_id.as_deref(),
            pg_ref_no: input.pg_ref_no.as_deref(),
            cheque_no: input.cheque_no.as_deref(),
            bank_name: input.bank_name.as_deref(),
            is_deposited: false,
        };

        let created: CreatedDoc = self
            .gateway
            .create_doc(session, COLLECTION_DOCTYPE, &payload)
            .await?;
        tracing::info!(
            id = %created.name,
            agent,
            amount = %amount,
            mode = input.payment_mode.as_str(),
            "collection created"
        );

        if let Some(receipt) = &input.receipt {
            if let Err(err) = self.link_receipt(session, &created.name, receipt).await {
                self.gateway
                    .delete_doc(session, COLLECTION_DOCTYPE, &created.name)
                    .await;
                return Err(err);
            }
        }

        match self
            .gateway
            .fetch_doc(session, COLLECTION_DOCTYPE, &created.name)
            .await
        {
            Ok(stored) => Ok(stored),
            Err(err) => {
                // Anything after a successful create compensates, the
                // authoritative re-read included.
                self.gateway
                    .delete_doc(session, COLLECTION_DOCTYPE, &created.name)
                    .await;
                Err(err)
            }
        }
    }

    /// Collections owned by `agent` that have not been deposited yet,
    /// newest first.
    pub async fn list_undeposited(
        &self,
        session: &SessionContext,
        agent: &str,
    ) -> Result<Vec<CollectionRecord>> {
        let query = ListQuery::new()
            .filter(Filter::eq("agent", agent))
            .filter(Filter::eq("is_deposited", 0))
            .fields(&["*"])
            .order_by("collected_at desc")
            .limit(0);
        self.gateway
            .list_docs(session, COLLECTION_DOCTYPE, &query)
            .await
    }

    async fn link_receipt(
        &self,
        session: &SessionContext,
        id: &str,
        receipt: &ImageAsset,
    ) -> Result<()> {
        let url = self
            .uploader
            .upload(session, receipt, COLLECTION_DOCTYPE, id, "receipt_image_ref")
            .await?;
        self.gateway
            .update_doc(
                session,
                COLLECTION_DOCTYPE,
                id,
                &ReceiptPatch {
                    receipt_image_ref: &url,
                },
            )
            .await
    }
}

/// Field checks that must pass before anything touches the network.
/// Returns the parsed amount on success.
fn validate_input(input: &CollectionInput) -> Result<Decimal> {
    input.validate()?;

    let mut errors = ValidationErrors::new();

    if matches!(&input.agent, Some(agent) if agent.trim().is_empty()) {
        errors.add("agent", field_error("required", "agent must not be blank"));
    }

    // length(min = 1) counts whitespace; the trimmed value is what gets sent.
    if input.customer.trim().is_empty() {
        errors.add("customer", field_error("required", "customer is required"));
    }

    let amount = match Decimal::from_str(input.amount.trim()) {
        Ok(amount) if amount > Decimal::ZERO => amount,
        Ok(_) => {
            errors.add("amount", field_error("range", "amount must be positive"));
            Decimal::ZERO
        }
        Err(_) => {
            errors.add(
                "amount",
                field_error("invalid", "amount must be a decimal number"),
            );
            Decimal::ZERO
        }
    };

    match input.payment_mode {
        PaymentMode::Upi if is_blank(&input.upi_txn_id) => {
            errors.add(
                "upi_txn_id",
                field_error("required", "UPI transaction id is required for UPI payments"),
            );
        }
        PaymentMode::Cheque if is_blank(&input.cheque_no) => {
            errors.add(
                "cheque_no",
                field_error("required", "cheque number is required for cheque payments"),
            );
        }
        _ => {}
    }

    if !errors.is_empty() {
        return Err(errors.into());
    }
    Ok(amount)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
