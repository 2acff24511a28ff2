use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use strum::{Display, EnumString};

use super::identifier::EntityId;

/// Status of a proforma invoice.
///
/// The nominal lifecycle is draft → pending_approval → {approved | rejected},
/// but older data sources also emit `pending` and `sent_for_approval` for the
/// in-flight state; anything unrecognized maps to `Unknown` and is ignored by
/// the status aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PiStatus {
    Draft,
    Pending,
    PendingApproval,
    SentForApproval,
    Approved,
    Rejected,
    Unknown,
}

impl PiStatus {
    /// True for every status the aggregation counts as awaiting approval.
    pub fn is_pending_like(&self) -> bool {
        matches!(
            self,
            PiStatus::Pending | PiStatus::PendingApproval | PiStatus::SentForApproval
        )
    }
}

/// A billing document generated from an approved quotation.
///
/// An approved invoice may spawn one active revision at a time: the revision
/// carries `parent_pi_id` pointing back at it, plus its own stored totals
/// reflecting whatever the amendment dropped or reduced. Stored totals on a
/// revision are authoritative over recomputation from line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProformaInvoice {
    pub id: Option<EntityId>,
    pub customer_id: Option<EntityId>,
    /// The quotation this invoice bills.
    pub quotation_id: Option<EntityId>,
    pub status: PiStatus,
    pub subtotal: Option<Decimal>,
    pub discount_rate: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    /// Set when this invoice revises a previously approved one.
    pub parent_pi_id: Option<EntityId>,
    /// Only ever populated on revisions; decoded once at ingestion. A
    /// malformed wire payload decodes to `None`, never to an error.
    pub amendment: Option<AmendmentDetail>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ProformaInvoice {
    pub fn new(id: impl Into<EntityId>, status: PiStatus) -> Self {
        Self {
            id: Some(id.into()),
            customer_id: None,
            quotation_id: None,
            status,
            subtotal: None,
            discount_rate: None,
            discount_amount: None,
            tax_rate: None,
            tax_amount: None,
            total_amount: None,
            parent_pi_id: None,
            amendment: None,
            created_at: None,
        }
    }

    /// Whether this invoice is a revision of a previously approved one.
    pub fn is_revision(&self) -> bool {
        self.parent_pi_id.is_some()
    }
}

/// Describes what a revision dropped or shrank relative to the original
/// quotation's line items. An item id appears in at most one of the two
/// collections; `new` enforces that by letting removal win.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AmendmentDetail {
    pub removed_item_ids: HashSet<EntityId>,
    pub reduced_items: Vec<ReducedItem>,
}

/// Quantity override for a retained line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedItem {
    pub line_item_id: EntityId,
    pub quantity: Decimal,
}

impl AmendmentDetail {
    pub fn new(removed_item_ids: HashSet<EntityId>, reduced_items: Vec<ReducedItem>) -> Self {
        let reduced_items = reduced_items
            .into_iter()
            .filter(|item| !removed_item_ids.contains(&item.line_item_id))
            .collect();
        Self {
            removed_item_ids,
            reduced_items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed_item_ids.is_empty() && self.reduced_items.is_empty()
    }

    /// The override quantity for a line item, when one is recorded.
    pub fn reduced_quantity(&self, id: &EntityId) -> Option<Decimal> {
        self.reduced_items
            .iter()
            .find(|item| &item.line_item_id == id)
            .map(|item| item.quantity)
    }
}
