use chrono::{DateTime, Utc};
use serde::Serialize;

use super::identifier::EntityId;

/// A prospective-customer record tracked through sales stages.
///
/// Leads are created by an external import or manual-entry flow and mutated
/// by assignment and status updates; this crate only ever reads them. All
/// duck-typed variance in the wire format (`customerId` vs `customer_id`,
/// `followUpStatus` vs `follow_up_status`) is folded away by the ingestion
/// adapter before a `Lead` exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead {
    /// Primary identifier. Absent on malformed imports; such leads still
    /// flow through text filtering but never match an identifier lookup.
    pub id: Option<EntityId>,
    /// Alternate identifier linking the lead to customer-keyed documents.
    pub customer_id: Option<EntityId>,
    pub name: String,
    pub business: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub source: Option<String>,
    pub products: Option<String>,
    pub category: Option<String>,
    pub salesperson: Option<String>,
    pub telecaller: Option<String>,
    pub sales_status: Option<String>,
    pub sales_remark: Option<String>,
    pub follow_up_status: Option<String>,
    pub follow_up_remark: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Lead {
    fn default() -> Self {
        Self {
            id: None,
            customer_id: None,
            name: String::new(),
            business: None,
            address: None,
            state: None,
            phone: None,
            email: None,
            tax_id: None,
            source: None,
            products: None,
            category: None,
            salesperson: None,
            telecaller: None,
            sales_status: None,
            sales_remark: None,
            follow_up_status: None,
            follow_up_remark: None,
            created_at: None,
            updated_at: None,
        }
    }
}
