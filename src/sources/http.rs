use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::errors::ServiceError;
use crate::models::raw::{RawLead, RawLineItem, RawPayment, RawProformaInvoice, RawQuotation};
use crate::models::{
    EntityId, Lead, LineItem, Payment, ProformaInvoice, Quotation, QuotationStatus,
};
use crate::sources::SalesDataSource;

/// Production implementation of [`SalesDataSource`] over the remote JSON API.
///
/// Deserializes the tolerant raw shapes and converts them to canonical
/// models right here, so duck-typed wire records never reach the engines.
/// A 404 means the collection or record does not exist and is answered with
/// an empty result; any other non-success status surfaces as
/// `ExternalServiceError`.
#[derive(Debug, Clone)]
pub struct HttpSalesDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSalesDataSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ServiceError::ConfigError(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON collection; 404 is an empty collection.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ServiceError> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%url, "collection not found upstream, treating as empty");
            return Ok(Vec::new());
        }
        let response = response.error_for_status()?;
        Ok(response.json().await?)
    }

    /// GET a single JSON record; 404 is `None`.
    async fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ServiceError> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl SalesDataSource for HttpSalesDataSource {
    #[instrument(skip(self))]
    async fn leads(&self) -> Result<Vec<Lead>, ServiceError> {
        let raw: Vec<RawLead> = self.get_list("/leads").await?;
        debug!(count = raw.len(), "fetched leads");
        Ok(raw.into_iter().map(RawLead::into_lead).collect())
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn quotations_by_status(
        &self,
        status: QuotationStatus,
    ) -> Result<Vec<Quotation>, ServiceError> {
        let raw: Vec<RawQuotation> = self
            .get_list(&format!("/quotations?status={status}"))
            .await?;
        debug!(count = raw.len(), "fetched quotation bucket");
        Ok(raw
            .into_iter()
            .map(|q| q.into_quotation(status))
            .collect())
    }

    #[instrument(skip(self))]
    async fn proforma_invoices(&self) -> Result<Vec<ProformaInvoice>, ServiceError> {
        let raw: Vec<RawProformaInvoice> = self.get_list("/proforma-invoices").await?;
        debug!(count = raw.len(), "fetched proforma invoices");
        Ok(raw
            .into_iter()
            .map(RawProformaInvoice::into_proforma_invoice)
            .collect())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn proforma_invoice(
        &self,
        id: &EntityId,
    ) -> Result<Option<ProformaInvoice>, ServiceError> {
        let raw: Option<RawProformaInvoice> =
            self.get_one(&format!("/proforma-invoices/{id}")).await?;
        Ok(raw.map(RawProformaInvoice::into_proforma_invoice))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn quotation(&self, id: &EntityId) -> Result<Option<Quotation>, ServiceError> {
        let raw: Option<RawQuotation> = self.get_one(&format!("/quotations/{id}")).await?;
        // A single-record fetch has no bucket; records missing their own
        // status field land in the pending bucket until upstream says more.
        Ok(raw.map(|q| {
            if q.status.is_none() {
                warn!(%id, "quotation record carries no status");
            }
            q.into_quotation(QuotationStatus::Pending)
        }))
    }

    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    async fn line_items(&self, quotation_id: &EntityId) -> Result<Vec<LineItem>, ServiceError> {
        let raw: Vec<RawLineItem> = self
            .get_list(&format!("/quotations/{quotation_id}/line-items"))
            .await?;
        Ok(raw.into_iter().map(RawLineItem::into_line_item).collect())
    }

    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    async fn payments(&self, quotation_id: &EntityId) -> Result<Vec<Payment>, ServiceError> {
        let raw: Vec<RawPayment> = self
            .get_list(&format!("/quotations/{quotation_id}/payments"))
            .await?;
        Ok(raw.into_iter().map(RawPayment::into_payment).collect())
    }
}
