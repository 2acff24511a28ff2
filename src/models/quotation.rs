use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use strum::{Display, EnumString};

use super::identifier::EntityId;

/// Status of a quotation, as partitioned by the upstream fetch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum QuotationStatus {
    Pending,
    SentForApproval,
    PendingVerification,
    Approved,
    Rejected,
    Cancelled,
}

/// A priced offer document linked to a lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quotation {
    pub id: Option<EntityId>,
    /// Owning customer. The wire format names this field three different
    /// ways across source generations; ingestion folds them into one.
    pub customer_id: Option<EntityId>,
    pub status: QuotationStatus,
    pub subtotal: Option<Decimal>,
    pub discount_rate: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub total: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    /// Back-reference populated on revised quotations.
    pub parent_quotation_id: Option<EntityId>,
}

impl Quotation {
    pub fn new(id: impl Into<EntityId>, status: QuotationStatus) -> Self {
        Self {
            id: Some(id.into()),
            customer_id: None,
            status,
            subtotal: None,
            discount_rate: None,
            discount_amount: None,
            tax_rate: None,
            tax_amount: None,
            total: None,
            created_at: None,
            parent_quotation_id: None,
        }
    }
}

impl Default for Quotation {
    fn default() -> Self {
        Self {
            id: None,
            customer_id: None,
            status: QuotationStatus::Pending,
            subtotal: None,
            discount_rate: None,
            discount_amount: None,
            tax_rate: None,
            tax_amount: None,
            total: None,
            created_at: None,
            parent_quotation_id: None,
        }
    }
}

/// A single billed line of a quotation. Referenced by id from a proforma
/// invoice amendment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub id: Option<EntityId>,
    pub product: String,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub unit_price: Decimal,
    pub tax_rate: Option<Decimal>,
    /// Taxable amount for the line, as computed upstream.
    pub amount: Decimal,
}
