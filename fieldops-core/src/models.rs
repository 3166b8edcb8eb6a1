//! Domain models for the fieldops client.
//!
//! These mirror the remote store's "Collection" and "Deposit" doctypes.
//! Wire quirks (the `name` id field, `0/1` check fields) are absorbed here
//! so the rest of the crate works with honest Rust types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Remote doctype holding one recorded customer payment.
pub const COLLECTION_DOCTYPE: &str = "Collection";
/// Remote doctype holding one bank deposit over multiple collections.
pub const DEPOSIT_DOCTYPE: &str = "Deposit";

/// The operating agent, as resolved from the remote session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    #[serde(rename = "UPI")]
    Upi,
    Cash,
    Cheque,
    #[serde(rename = "NEFT")]
    Neft,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Cash => "Cash",
            Self::Cheque => "Cheque",
            Self::Neft => "NEFT",
        }
    }
}

/// One payment collected from a customer, awaiting deposit.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CollectionRecord {
    /// Server-assigned document id (wire field `name`).
    #[serde(rename = "name")]
    pub id: String,
    pub agent: String,
    pub customer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_ref: Option<String>,
    /// Canonical `YYYY-MM-DD HH:MM:SS`.
    pub collected_at: String,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_txn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pg_ref_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheque_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_image_ref: Option<String>,
    #[serde(with = "check_field", default)]
    pub is_deposited: bool,
    #[serde(default)]
    pub docstatus: i64,
}

/// A `{collection, amount}` row inside a deposit (wire child table entry).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DepositLineItem {
    #[serde(rename = "collection")]
    pub collection_id: String,
    pub amount: Decimal,
}

/// One bank deposit consolidating multiple collection records.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DepositRecord {
    #[serde(rename = "name")]
    pub id: String,
    pub agent: String,
    /// Canonical `YYYY-MM-DD`.
    pub deposit_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slip_number: Option<String>,
    /// Sum of the line-item amounts, fixed at creation time.
    #[serde(rename = "amount_deposited")]
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slip_image_ref: Option<String>,
    #[serde(rename = "collections", default)]
    pub line_items: Vec<DepositLineItem>,
    #[serde(default)]
    pub docstatus: i64,
}

/// A local photo pending upload. Transient: only the returned remote URL
/// outlives the create operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Local filesystem path of the captured image, if one exists.
    pub uri: Option<String>,
    pub file_name: String,
}

impl ImageAsset {
    pub fn new(uri: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            file_name: file_name.into(),
        }
    }
}

/// The remote store encodes check fields as `0`/`1` integers; older
/// responses occasionally carry real booleans. Accept both, emit integers.
pub mod check_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Bool(bool),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(i) => i != 0,
            Raw::Bool(b) => b,
        })
    }
}
