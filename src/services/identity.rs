//! Identifier matching across record families.
//!
//! Leads, quotations, and proforma invoices evolved independently and
//! reference the same customer through identifiers that cross a
//! serialization boundary: numeric in one source, stringly in another, three
//! historical spellings of the field name. Ingestion already folds the field
//! spellings into one canonical field and the value forms into [`EntityId`],
//! so membership here is a plain set probe; a record with no discoverable
//! identifier simply never matches.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{EntityId, Lead, ProformaInvoice, Quotation};

/// Canonical owning-customer accessor, the seam shared by every record family
/// the aggregation and filtering engines consume.
pub trait CustomerRef {
    fn customer_id(&self) -> Option<&EntityId>;
}

impl CustomerRef for Quotation {
    fn customer_id(&self) -> Option<&EntityId> {
        self.customer_id.as_ref()
    }
}

impl CustomerRef for ProformaInvoice {
    fn customer_id(&self) -> Option<&EntityId> {
        self.customer_id.as_ref()
    }
}

impl CustomerRef for Lead {
    fn customer_id(&self) -> Option<&EntityId> {
        self.customer_id.as_ref()
    }
}

/// A deduplicated set of customer identifiers.
///
/// Because [`EntityId`] canonicalizes on construction, a single entry covers
/// every representation the identifier may later be probed with: `42`,
/// `"42"`, and `"42.0"` all hash to the same key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdSet {
    ids: HashSet<EntityId>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the customer id of every entity that has one. Entities with
    /// no discoverable id are skipped, never an error.
    pub fn from_entities<'a, T, I>(entities: I) -> Self
    where
        T: CustomerRef + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut set = Self::new();
        let mut dropped = 0usize;
        for entity in entities {
            match entity.customer_id() {
                Some(id) => {
                    set.ids.insert(id.clone());
                }
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "entities without a customer id skipped from id set");
        }
        set
    }

    pub fn insert(&mut self, id: EntityId) {
        self.ids.insert(id);
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether any of the lead's identifier candidates (its own id or its
    /// customer id) is present. A lead with neither never matches.
    pub fn matches_lead(&self, lead: &Lead) -> bool {
        lead.id
            .iter()
            .chain(lead.customer_id.iter())
            .any(|id| self.ids.contains(id))
    }
}

impl FromIterator<EntityId> for IdSet {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
