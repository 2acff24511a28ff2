//! SalesDesk Core
//!
//! Cross-entity reconciliation and financial-recomputation engine behind the
//! SalesDesk sales-operations front end. The crate matches customer
//! identifiers across leads, quotations, and proforma invoices, aggregates
//! documents by status with per-customer deduplication, filters lead pools
//! against composite specifications, and recomputes invoice totals for fresh
//! and amended invoices.
//!
//! The engines in [`services`] are pure and synchronous; fetching from the
//! remote data source lives behind [`sources::SalesDataSource`], and
//! [`services::OverviewService`] wires the two together.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod sources;

pub use errors::ServiceError;
pub use models::{
    AmendmentDetail, EntityId, Lead, LineItem, Payment, PaymentStatus, PiStatus, ProformaInvoice,
    Quotation, QuotationStatus, ReducedItem,
};
pub use services::{
    AssignmentFilter, IdSet, InvoicePreview, InvoiceTotals, LeadColumn, LeadFilter,
    OverviewService, PiOverview, QuotationBuckets, QuotationOverview, StatusBadge, StatusCounts,
};
pub use sources::{HttpSalesDataSource, SalesDataSource};
