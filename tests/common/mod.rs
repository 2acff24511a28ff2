//! Shared fixtures for the integration suites: record builders and an
//! in-memory [`SalesDataSource`] fake.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use salesdesk_core::{
    EntityId, Lead, LineItem, Payment, PaymentStatus, PiStatus, ProformaInvoice, Quotation,
    QuotationStatus, SalesDataSource, ServiceError,
};

pub fn lead(id: i64, name: &str) -> Lead {
    Lead {
        id: Some(EntityId::from_i64(id)),
        name: name.to_string(),
        ..Lead::default()
    }
}

pub fn lead_for_customer(id: i64, customer: i64, name: &str) -> Lead {
    Lead {
        customer_id: Some(EntityId::from_i64(customer)),
        ..lead(id, name)
    }
}

pub fn quotation(id: i64, customer: i64, status: QuotationStatus) -> Quotation {
    Quotation {
        customer_id: Some(EntityId::from_i64(customer)),
        ..Quotation::new(id, status)
    }
}

pub fn pi(id: i64, customer: i64, status: PiStatus) -> ProformaInvoice {
    ProformaInvoice {
        customer_id: Some(EntityId::from_i64(customer)),
        ..ProformaInvoice::new(id, status)
    }
}

pub fn line_item(id: i64, quantity: Decimal, amount: Decimal) -> LineItem {
    LineItem {
        id: Some(EntityId::from_i64(id)),
        product: format!("item-{id}"),
        description: None,
        quantity,
        unit: Some("pcs".into()),
        unit_price: if quantity.is_zero() {
            Decimal::ZERO
        } else {
            amount / quantity
        },
        tax_rate: None,
        amount,
    }
}

pub fn payment(amount: Decimal, status: PaymentStatus) -> Payment {
    Payment {
        status,
        ..Payment::approved(amount)
    }
}

/// In-memory fake of the remote data source. Collections are plain fields;
/// `fail_leads` makes the lead fetch error so tests can assert that a failed
/// fan-out never aggregates partial results.
#[derive(Default)]
pub struct InMemorySource {
    pub leads: Vec<Lead>,
    pub buckets: HashMap<QuotationStatus, Vec<Quotation>>,
    pub pis: Vec<ProformaInvoice>,
    pub quotations: HashMap<EntityId, Quotation>,
    pub line_items: HashMap<EntityId, Vec<LineItem>>,
    pub payments: HashMap<EntityId, Vec<Payment>>,
    pub fail_leads: AtomicBool,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buckets(mut self, buckets: Vec<(QuotationStatus, Vec<Quotation>)>) -> Self {
        self.buckets = buckets.into_iter().collect();
        self
    }

    pub fn with_leads(mut self, leads: Vec<Lead>) -> Self {
        self.leads = leads;
        self
    }

    pub fn with_pis(mut self, pis: Vec<ProformaInvoice>) -> Self {
        self.pis = pis;
        self
    }

    pub fn with_quotation(mut self, quotation: Quotation) -> Self {
        let id = quotation.id.clone().expect("fixture quotation has an id");
        self.quotations.insert(id, quotation);
        self
    }

    pub fn with_line_items(mut self, quotation_id: i64, items: Vec<LineItem>) -> Self {
        self.line_items.insert(EntityId::from_i64(quotation_id), items);
        self
    }

    pub fn with_payments(mut self, quotation_id: i64, payments: Vec<Payment>) -> Self {
        self.payments.insert(EntityId::from_i64(quotation_id), payments);
        self
    }
}

#[async_trait]
impl SalesDataSource for InMemorySource {
    async fn leads(&self) -> Result<Vec<Lead>, ServiceError> {
        if self.fail_leads.load(Ordering::SeqCst) {
            return Err(ServiceError::ExternalServiceError(
                "lead fetch failed".into(),
            ));
        }
        Ok(self.leads.clone())
    }

    async fn quotations_by_status(
        &self,
        status: QuotationStatus,
    ) -> Result<Vec<Quotation>, ServiceError> {
        Ok(self.buckets.get(&status).cloned().unwrap_or_default())
    }

    async fn proforma_invoices(&self) -> Result<Vec<ProformaInvoice>, ServiceError> {
        Ok(self.pis.clone())
    }

    async fn proforma_invoice(
        &self,
        id: &EntityId,
    ) -> Result<Option<ProformaInvoice>, ServiceError> {
        Ok(self.pis.iter().find(|pi| pi.id.as_ref() == Some(id)).cloned())
    }

    async fn quotation(&self, id: &EntityId) -> Result<Option<Quotation>, ServiceError> {
        Ok(self.quotations.get(id).cloned())
    }

    async fn line_items(&self, quotation_id: &EntityId) -> Result<Vec<LineItem>, ServiceError> {
        Ok(self.line_items.get(quotation_id).cloned().unwrap_or_default())
    }

    async fn payments(&self, quotation_id: &EntityId) -> Result<Vec<Payment>, ServiceError> {
        Ok(self.payments.get(quotation_id).cloned().unwrap_or_default())
    }
}
