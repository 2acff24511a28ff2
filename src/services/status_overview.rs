//! Status aggregation for quotations and proforma invoices.
//!
//! Both aggregations answer the same dashboard question: how many distinct
//! customers sit in each approval state. Counts are therefore keyed on owning
//! customer, never on document id; a customer with two pending quotations is
//! one unit of pending exposure. Records with no discoverable customer id are
//! skipped, never an error.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::models::{EntityId, ProformaInvoice, Quotation};
use crate::services::identity::CustomerRef;

/// Per-status counts in the shape the front end renders. Each count equals
/// the length of the corresponding list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// Per-status membership lists, deduplicated by owning customer.
#[derive(Debug, Clone, Serialize)]
pub struct StatusLists<T> {
    pub pending: Vec<T>,
    pub approved: Vec<T>,
    pub rejected: Vec<T>,
}

impl<T> Default for StatusLists<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            approved: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// A status badge the user can select on the overview screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    Pending,
    Approved,
    Rejected,
}

impl<T> StatusLists<T> {
    pub fn for_badge(&self, badge: StatusBadge) -> &[T] {
        match badge {
            StatusBadge::Pending => &self.pending,
            StatusBadge::Approved => &self.approved,
            StatusBadge::Rejected => &self.rejected,
        }
    }

    fn counts(&self) -> StatusCounts {
        StatusCounts {
            pending: self.pending.len(),
            approved: self.approved.len(),
            rejected: self.rejected.len(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuotationOverview {
    pub counts: StatusCounts,
    pub lists: StatusLists<Quotation>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PiOverview {
    pub counts: StatusCounts,
    pub lists: StatusLists<ProformaInvoice>,
}

/// The five upstream quotation collections, fetched pre-partitioned by
/// status.
#[derive(Debug, Clone, Default)]
pub struct QuotationBuckets {
    pub pending_verification: Vec<Quotation>,
    pub pending: Vec<Quotation>,
    pub sent_for_approval: Vec<Quotation>,
    pub approved: Vec<Quotation>,
    pub rejected: Vec<Quotation>,
}

/// Keeps the first document seen per customer, dropping documents whose
/// customer cannot be identified. `seen` is shared across calls so that a
/// union of buckets deduplicates as one pass.
fn keep_first_per_customer<T: CustomerRef + Clone>(
    out: &mut Vec<T>,
    seen: &mut HashSet<EntityId>,
    bucket: &[T],
) {
    for entity in bucket {
        let Some(id) = entity.customer_id() else {
            continue;
        };
        if seen.insert(id.clone()) {
            out.push(entity.clone());
        }
    }
}

/// Aggregates the five status buckets into counts and membership lists.
///
/// The pending list is the union of the three pending-like buckets in the
/// fixed encounter order pending_verification, pending, sent_for_approval:
/// a customer appearing in more than one of them is attributed to the
/// earliest bucket and counted once. The order is preserved for numeric
/// parity with the existing dashboard, not because it carries business
/// meaning.
#[instrument(skip_all, fields(
    pending_verification = buckets.pending_verification.len(),
    pending = buckets.pending.len(),
    sent_for_approval = buckets.sent_for_approval.len(),
    approved = buckets.approved.len(),
    rejected = buckets.rejected.len(),
))]
pub fn aggregate_quotations(buckets: &QuotationBuckets) -> QuotationOverview {
    let mut lists = StatusLists::default();

    let mut seen_pending = HashSet::new();
    keep_first_per_customer(
        &mut lists.pending,
        &mut seen_pending,
        &buckets.pending_verification,
    );
    keep_first_per_customer(&mut lists.pending, &mut seen_pending, &buckets.pending);
    keep_first_per_customer(
        &mut lists.pending,
        &mut seen_pending,
        &buckets.sent_for_approval,
    );

    keep_first_per_customer(&mut lists.approved, &mut HashSet::new(), &buckets.approved);
    keep_first_per_customer(&mut lists.rejected, &mut HashSet::new(), &buckets.rejected);

    let counts = lists.counts();
    debug!(?counts, "aggregated quotation buckets");
    QuotationOverview { counts, lists }
}

/// Classifies the full proforma-invoice collection in a single pass.
///
/// `pending`, `pending_approval`, and `sent_for_approval` all count as
/// pending; drafts and unrecognized statuses are ignored. Each bucket
/// deduplicates by owning customer independently.
#[instrument(skip_all, fields(invoices = pis.len()))]
pub fn aggregate_proforma_invoices(pis: &[ProformaInvoice]) -> PiOverview {
    let mut lists: StatusLists<ProformaInvoice> = StatusLists::default();
    let mut seen_pending = HashSet::new();
    let mut seen_approved = HashSet::new();
    let mut seen_rejected = HashSet::new();

    for pi in pis {
        let Some(id) = pi.customer_id() else {
            continue;
        };
        let (list, seen) = if pi.status.is_pending_like() {
            (&mut lists.pending, &mut seen_pending)
        } else if pi.status == crate::models::PiStatus::Approved {
            (&mut lists.approved, &mut seen_approved)
        } else if pi.status == crate::models::PiStatus::Rejected {
            (&mut lists.rejected, &mut seen_rejected)
        } else {
            continue;
        };
        if seen.insert(id.clone()) {
            list.push(pi.clone());
        }
    }

    let counts = lists.counts();
    debug!(?counts, "aggregated proforma invoices");
    PiOverview { counts, lists }
}
