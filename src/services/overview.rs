//! Orchestration over the data source and the pure engines.
//!
//! All upstream fetches for one screen are independent read-only requests
//! and go out concurrently; aggregation only starts once every fetch has
//! resolved, so partial results are never aggregated. The engines themselves
//! stay synchronous and side-effect-free: this service is the only place
//! where awaiting happens.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::models::{EntityId, Lead, LineItem, ProformaInvoice, Quotation, QuotationStatus};
use crate::services::identity::IdSet;
use crate::services::invoice_totals::{
    advance_paid, compute_final_total, compute_totals, effective_line_items, InvoiceTotals,
};
use crate::services::lead_filter::{filter_leads, LeadFilter};
use crate::services::status_overview::{
    aggregate_proforma_invoices, aggregate_quotations, PiOverview, QuotationBuckets,
    QuotationOverview, StatusBadge,
};
use crate::sources::SalesDataSource;

use rust_decimal::Decimal;

/// Everything an invoice preview or approval screen needs for one invoice.
#[derive(Debug, Clone, Serialize)]
pub struct InvoicePreview {
    pub invoice: ProformaInvoice,
    pub quotation: Quotation,
    /// The lines the invoice actually bills for, after any amendment.
    pub line_items: Vec<LineItem>,
    pub totals: InvoiceTotals,
    /// The figure presented as finally owed, advance payments considered.
    pub final_total: Decimal,
}

/// Fan-out/fan-in façade over a [`SalesDataSource`].
#[derive(Clone)]
pub struct OverviewService {
    source: Arc<dyn SalesDataSource>,
}

impl OverviewService {
    pub fn new(source: Arc<dyn SalesDataSource>) -> Self {
        Self { source }
    }

    async fn fetch_quotation_buckets(&self) -> Result<QuotationBuckets, ServiceError> {
        let (pending_verification, pending, sent_for_approval, approved, rejected) = tokio::try_join!(
            self.source
                .quotations_by_status(QuotationStatus::PendingVerification),
            self.source.quotations_by_status(QuotationStatus::Pending),
            self.source
                .quotations_by_status(QuotationStatus::SentForApproval),
            self.source.quotations_by_status(QuotationStatus::Approved),
            self.source.quotations_by_status(QuotationStatus::Rejected),
        )?;
        Ok(QuotationBuckets {
            pending_verification,
            pending,
            sent_for_approval,
            approved,
            rejected,
        })
    }

    /// Fetches the five quotation buckets concurrently and aggregates them.
    #[instrument(skip(self))]
    pub async fn quotation_overview(&self) -> Result<QuotationOverview, ServiceError> {
        let buckets = self.fetch_quotation_buckets().await?;
        let overview = aggregate_quotations(&buckets);
        info!(
            pending = overview.counts.pending,
            approved = overview.counts.approved,
            rejected = overview.counts.rejected,
            "quotation overview ready"
        );
        Ok(overview)
    }

    /// Fetches the full invoice collection and aggregates it.
    #[instrument(skip(self))]
    pub async fn pi_overview(&self) -> Result<PiOverview, ServiceError> {
        let pis = self.source.proforma_invoices().await?;
        let overview = aggregate_proforma_invoices(&pis);
        info!(
            pending = overview.counts.pending,
            approved = overview.counts.approved,
            rejected = overview.counts.rejected,
            "proforma invoice overview ready"
        );
        Ok(overview)
    }

    /// Filters the lead pool against a caller-assembled filter.
    #[instrument(skip(self, filter))]
    pub async fn filtered_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>, ServiceError> {
        let leads = self.source.leads().await?;
        Ok(filter_leads(&leads, filter))
    }

    /// The leads behind a selected quotation status badge: the badge's
    /// aggregated list supplies the customer-id set the lead filter matches
    /// against, on top of whatever base filter the caller already holds.
    #[instrument(skip(self, base_filter))]
    pub async fn leads_for_quotation_status(
        &self,
        badge: StatusBadge,
        base_filter: &LeadFilter,
    ) -> Result<Vec<Lead>, ServiceError> {
        let (buckets, leads) = tokio::try_join!(self.fetch_quotation_buckets(), self.source.leads())?;
        let overview = aggregate_quotations(&buckets);
        let ids = IdSet::from_entities(overview.lists.for_badge(badge));
        let filter = LeadFilter {
            customer_ids: Some(ids),
            ..base_filter.clone()
        };
        Ok(filter_leads(&leads, &filter))
    }

    /// Loads one invoice with its quotation, line items, and payment history
    /// joined concurrently, then computes its authoritative totals.
    #[instrument(skip(self), fields(pi_id = %pi_id))]
    pub async fn invoice_preview(&self, pi_id: &EntityId) -> Result<InvoicePreview, ServiceError> {
        let invoice = self
            .source
            .proforma_invoice(pi_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("proforma invoice {pi_id} not found")))?;

        let (quotation, line_items, payments) = match &invoice.quotation_id {
            Some(quotation_id) => {
                let (quotation, line_items, payments) = tokio::try_join!(
                    self.source.quotation(quotation_id),
                    self.source.line_items(quotation_id),
                    self.source.payments(quotation_id),
                )?;
                (quotation.unwrap_or_default(), line_items, payments)
            }
            // An invoice that lost its quotation link still previews from
            // whatever it stores itself.
            None => (Quotation::default(), Vec::new(), Vec::new()),
        };

        let totals = compute_totals(&invoice, &quotation, &line_items, &payments);
        let final_total = compute_final_total(
            invoice.total_amount,
            quotation.total,
            advance_paid(&payments),
            quotation.total,
        );
        let line_items = effective_line_items(&line_items, invoice.amendment.as_ref());

        info!(total = %totals.total, final_total = %final_total, "invoice preview assembled");
        Ok(InvoicePreview {
            invoice,
            quotation,
            line_items,
            totals,
            final_total,
        })
    }
}
