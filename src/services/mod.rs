//! Service layer: the four pure engines plus the orchestration façade.

pub mod identity;
pub mod invoice_totals;
pub mod lead_filter;
pub mod overview;
pub mod status_overview;

pub use identity::{CustomerRef, IdSet};
pub use invoice_totals::{
    advance_paid, compute_final_total, compute_totals, effective_line_items, InvoiceTotals,
};
pub use lead_filter::{filter_leads, is_assigned, AssignmentFilter, LeadColumn, LeadFilter};
pub use overview::{InvoicePreview, OverviewService};
pub use status_overview::{
    aggregate_proforma_invoices, aggregate_quotations, PiOverview, QuotationBuckets,
    QuotationOverview, StatusBadge, StatusCounts, StatusLists,
};
