//! Wire-format mirror types for the upstream JSON collections.
//!
//! The remote data source has gone through several generations and the
//! records it returns are duck-typed: identifiers arrive as numbers, numeric
//! strings, or UUID strings; the owning-customer field is spelled
//! `customer_id`, `customerId`, or `customerID` depending on the source;
//! nested structures such as `amendment_detail` are sometimes delivered as a
//! JSON-encoded string instead of an object. Everything here exists to fold
//! that variance away exactly once, at the ingestion boundary, so the rest of
//! the crate only ever sees the canonical `models` shapes.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use super::{
    identifier::EntityId,
    lead::Lead,
    payment::{Payment, PaymentStatus},
    proforma::{AmendmentDetail, PiStatus, ProformaInvoice, ReducedItem},
    quotation::{LineItem, Quotation, QuotationStatus},
};

/// An identifier as it appears on the wire: JSON number (integral or not) or
/// string. `canonicalize` turns it into an [`EntityId`], dropping values that
/// cannot name a record (blank strings, non-integral floats).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawId {
    pub fn canonicalize(&self) -> Option<EntityId> {
        match self {
            RawId::Int(n) => Some(EntityId::from_i64(*n)),
            RawId::Float(f) => EntityId::from_f64(*f),
            RawId::Text(s) => EntityId::parse(s),
        }
    }
}

fn canonical_id(raw: &Option<RawId>) -> Option<EntityId> {
    raw.as_ref().and_then(RawId::canonicalize)
}

/// Timestamps are tolerated in RFC 3339 or `YYYY-MM-DD` form; anything else
/// ingests as absent.
fn parse_timestamp(raw: &Option<String>) -> Option<DateTime<Utc>> {
    let s = raw.as_deref()?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLead {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, alias = "customerId", alias = "customerID")]
    pub customer_id: Option<RawId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "businessName")]
    pub business: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "phoneNumber", alias = "mobile")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "gstNumber", alias = "gst_number")]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "productList")]
    pub products: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "salesPerson", alias = "sales_person")]
    pub salesperson: Option<String>,
    #[serde(default, alias = "teleCaller", alias = "tele_caller")]
    pub telecaller: Option<String>,
    #[serde(default, alias = "salesStatus")]
    pub sales_status: Option<String>,
    #[serde(default, alias = "salesRemark")]
    pub sales_remark: Option<String>,
    #[serde(default, alias = "followUpStatus")]
    pub follow_up_status: Option<String>,
    #[serde(default, alias = "followUpRemark")]
    pub follow_up_remark: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
}

impl RawLead {
    pub fn into_lead(self) -> Lead {
        Lead {
            id: canonical_id(&self.id),
            customer_id: canonical_id(&self.customer_id),
            name: non_blank(self.name).unwrap_or_default(),
            business: non_blank(self.business),
            address: non_blank(self.address),
            state: non_blank(self.state),
            phone: non_blank(self.phone),
            email: non_blank(self.email),
            tax_id: non_blank(self.tax_id),
            source: non_blank(self.source),
            products: non_blank(self.products),
            category: non_blank(self.category),
            salesperson: self.salesperson,
            telecaller: self.telecaller,
            sales_status: non_blank(self.sales_status),
            sales_remark: non_blank(self.sales_remark),
            follow_up_status: non_blank(self.follow_up_status),
            follow_up_remark: non_blank(self.follow_up_remark),
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuotation {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, alias = "customerId", alias = "customerID")]
    pub customer_id: Option<RawId>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default, alias = "discountRate")]
    pub discount_rate: Option<Decimal>,
    #[serde(default, alias = "discountAmount")]
    pub discount_amount: Option<Decimal>,
    #[serde(default, alias = "taxRate")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, alias = "taxAmount")]
    pub tax_amount: Option<Decimal>,
    #[serde(default, alias = "totalAmount", alias = "total_amount")]
    pub total: Option<Decimal>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "parentQuotationId")]
    pub parent_quotation_id: Option<RawId>,
}

impl RawQuotation {
    /// Converts to the canonical model. The fetch layer requests quotations
    /// already partitioned by status, so `bucket_status` wins whenever the
    /// record's own status field is absent or unrecognized.
    pub fn into_quotation(self, bucket_status: QuotationStatus) -> Quotation {
        let status = self
            .status
            .as_deref()
            .and_then(|s| QuotationStatus::from_str(s.trim()).ok())
            .unwrap_or(bucket_status);
        Quotation {
            id: canonical_id(&self.id),
            customer_id: canonical_id(&self.customer_id),
            status,
            subtotal: self.subtotal,
            discount_rate: self.discount_rate,
            discount_amount: self.discount_amount,
            tax_rate: self.tax_rate,
            tax_amount: self.tax_amount,
            total: self.total,
            created_at: parse_timestamp(&self.created_at),
            parent_quotation_id: canonical_id(&self.parent_quotation_id),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, alias = "productName", alias = "product_name")]
    pub product: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, alias = "unitPrice", alias = "price")]
    pub unit_price: Option<Decimal>,
    #[serde(default, alias = "taxRate")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, alias = "taxableAmount", alias = "taxable_amount")]
    pub amount: Option<Decimal>,
}

impl RawLineItem {
    pub fn into_line_item(self) -> LineItem {
        let quantity = self.quantity.unwrap_or_default();
        let unit_price = self.unit_price.unwrap_or_default();
        // Upstream computes the taxable amount; older records omit it.
        let amount = self.amount.unwrap_or_else(|| quantity * unit_price);
        LineItem {
            id: canonical_id(&self.id),
            product: non_blank(self.product).unwrap_or_default(),
            description: non_blank(self.description),
            quantity,
            unit: non_blank(self.unit),
            unit_price,
            tax_rate: self.tax_rate,
            amount,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawAmendmentDetail {
    #[serde(default, alias = "removedItemIds")]
    removed_item_ids: Vec<RawId>,
    #[serde(default, alias = "reducedItems")]
    reduced_items: Vec<RawReducedItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawReducedItem {
    #[serde(alias = "lineItemId", alias = "line_item_id", alias = "itemId")]
    id: RawId,
    quantity: Decimal,
}

/// Decodes an `amendment_detail` payload, which arrives either as a JSON
/// object or as a JSON-encoded string. Any decode failure means "no
/// amendment", never an error.
pub fn decode_amendment(value: &Value) -> Option<AmendmentDetail> {
    let raw: RawAmendmentDetail = match value {
        Value::String(s) => serde_json::from_str(s).ok()?,
        Value::Null => return None,
        other => serde_json::from_value(other.clone()).ok()?,
    };
    let removed: HashSet<EntityId> = raw
        .removed_item_ids
        .iter()
        .filter_map(RawId::canonicalize)
        .collect();
    let reduced: Vec<ReducedItem> = raw
        .reduced_items
        .into_iter()
        .filter_map(|item| {
            Some(ReducedItem {
                line_item_id: item.id.canonicalize()?,
                quantity: item.quantity,
            })
        })
        .collect();
    let amendment = AmendmentDetail::new(removed, reduced);
    if amendment.is_empty() {
        None
    } else {
        Some(amendment)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProformaInvoice {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, alias = "customerId", alias = "customerID")]
    pub customer_id: Option<RawId>,
    #[serde(default, alias = "quotationId")]
    pub quotation_id: Option<RawId>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default, alias = "discountRate")]
    pub discount_rate: Option<Decimal>,
    #[serde(default, alias = "discountAmount")]
    pub discount_amount: Option<Decimal>,
    #[serde(default, alias = "taxRate")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, alias = "taxAmount")]
    pub tax_amount: Option<Decimal>,
    #[serde(default, alias = "totalAmount", alias = "total")]
    pub total_amount: Option<Decimal>,
    #[serde(default, alias = "parentPiId")]
    pub parent_pi_id: Option<RawId>,
    #[serde(default, alias = "amendmentDetail")]
    pub amendment_detail: Option<Value>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

impl RawProformaInvoice {
    pub fn into_proforma_invoice(self) -> ProformaInvoice {
        let status = self
            .status
            .as_deref()
            .and_then(|s| PiStatus::from_str(s.trim()).ok())
            .unwrap_or(PiStatus::Unknown);
        let parent_pi_id = canonical_id(&self.parent_pi_id);
        // An amendment only means anything on a revision.
        let amendment = if parent_pi_id.is_some() {
            self.amendment_detail.as_ref().and_then(decode_amendment)
        } else {
            None
        };
        ProformaInvoice {
            id: canonical_id(&self.id),
            customer_id: canonical_id(&self.customer_id),
            quotation_id: canonical_id(&self.quotation_id),
            status,
            subtotal: self.subtotal,
            discount_rate: self.discount_rate,
            discount_amount: self.discount_amount,
            tax_rate: self.tax_rate,
            tax_amount: self.tax_amount,
            total_amount: self.total_amount,
            parent_pi_id,
            amendment,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPayment {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, alias = "quotationId")]
    pub quotation_id: Option<RawId>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default, alias = "approvalStatus", alias = "approval_status")]
    pub status: Option<String>,
    #[serde(default, alias = "paymentDate", alias = "payment_date")]
    pub paid_on: Option<String>,
    #[serde(default, alias = "paymentMethod", alias = "payment_method")]
    pub method: Option<String>,
}

impl RawPayment {
    pub fn into_payment(self) -> Payment {
        let status = self
            .status
            .as_deref()
            .and_then(|s| PaymentStatus::from_str(s.trim()).ok())
            .unwrap_or(PaymentStatus::Unknown);
        Payment {
            id: canonical_id(&self.id),
            quotation_id: canonical_id(&self.quotation_id),
            amount: self.amount.unwrap_or_default(),
            status,
            paid_on: parse_timestamp(&self.paid_on),
            method: non_blank(self.method),
        }
    }
}
