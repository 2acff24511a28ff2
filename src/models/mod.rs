//! Canonical data model for the reconciliation engine.
//!
//! `raw` holds the wire-format mirror types; everything else is the
//! canonical, post-ingestion shape the services operate on.

pub mod identifier;
pub mod lead;
pub mod payment;
pub mod proforma;
pub mod quotation;
pub mod raw;

pub use identifier::EntityId;
pub use lead::Lead;
pub use payment::{Payment, PaymentStatus};
pub use proforma::{AmendmentDetail, PiStatus, ProformaInvoice, ReducedItem};
pub use quotation::{LineItem, Quotation, QuotationStatus};
