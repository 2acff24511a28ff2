//! Upstream data access.
//!
//! The engines are pure functions over already-fetched collections; this
//! module is the seam where fetching actually happens. `SalesDataSource`
//! abstracts the remote JSON API so orchestration can be exercised against
//! an in-memory fake in tests, with [`HttpSalesDataSource`] as the
//! production implementation.

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{
    EntityId, Lead, LineItem, Payment, ProformaInvoice, Quotation, QuotationStatus,
};

mod http;

pub use http::HttpSalesDataSource;

/// Read-only access to the remote sales collections. Every method returns
/// already-canonicalized models; raw wire shapes never escape the
/// implementation. An empty collection is a normal answer ("no data yet"),
/// never an error.
#[async_trait]
pub trait SalesDataSource: Send + Sync {
    async fn leads(&self) -> Result<Vec<Lead>, ServiceError>;

    /// One status bucket of quotations, as partitioned by the upstream API.
    async fn quotations_by_status(
        &self,
        status: QuotationStatus,
    ) -> Result<Vec<Quotation>, ServiceError>;

    /// The full, unfiltered proforma-invoice collection.
    async fn proforma_invoices(&self) -> Result<Vec<ProformaInvoice>, ServiceError>;

    async fn proforma_invoice(
        &self,
        id: &EntityId,
    ) -> Result<Option<ProformaInvoice>, ServiceError>;

    async fn quotation(&self, id: &EntityId) -> Result<Option<Quotation>, ServiceError>;

    async fn line_items(&self, quotation_id: &EntityId) -> Result<Vec<LineItem>, ServiceError>;

    async fn payments(&self, quotation_id: &EntityId) -> Result<Vec<Payment>, ServiceError>;
}
