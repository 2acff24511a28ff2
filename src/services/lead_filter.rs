//! Composite lead filtering.
//!
//! The lead table reaches this engine through overlapping sources (the full
//! pool, a status badge's customer set, saved column filters), so one pass
//! applies every active predicate in a fixed short-circuit order and then
//! deduplicates survivors by lead id. The pass is linear whatever the input
//! size: predicates are precompiled once (lowercased needles, sentinel
//! checks) and no intermediate collections are built.

use serde::Serialize;
use std::collections::HashSet;
use strum::{Display, EnumString};
use tracing::{debug, instrument};

use crate::models::{EntityId, Lead};
use crate::services::identity::IdSet;

/// Values of an assignment field that mean "no one", compared trimmed and
/// case-insensitively.
const UNASSIGNED_SENTINELS: &[&str] = &["unassigned", "n/a", "na", "-", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AssignmentFilter {
    Assigned,
    Unassigned,
}

/// A filterable column of the lead table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LeadColumn {
    Name,
    Business,
    Address,
    State,
    Phone,
    Email,
    TaxId,
    Source,
    Products,
    Category,
    Salesperson,
    Telecaller,
    SalesStatus,
    SalesRemark,
    FollowUpStatus,
    FollowUpRemark,
    CreatedAt,
    UpdatedAt,
}

impl LeadColumn {
    /// The lead's rendered value for this column, as the front end displays
    /// it. Timestamps compare against their date form.
    fn value_of(self, lead: &Lead) -> Option<String> {
        match self {
            LeadColumn::Name => Some(lead.name.clone()),
            LeadColumn::Business => lead.business.clone(),
            LeadColumn::Address => lead.address.clone(),
            LeadColumn::State => lead.state.clone(),
            LeadColumn::Phone => lead.phone.clone(),
            LeadColumn::Email => lead.email.clone(),
            LeadColumn::TaxId => lead.tax_id.clone(),
            LeadColumn::Source => lead.source.clone(),
            LeadColumn::Products => lead.products.clone(),
            LeadColumn::Category => lead.category.clone(),
            LeadColumn::Salesperson => lead.salesperson.clone(),
            LeadColumn::Telecaller => lead.telecaller.clone(),
            LeadColumn::SalesStatus => lead.sales_status.clone(),
            LeadColumn::SalesRemark => lead.sales_remark.clone(),
            LeadColumn::FollowUpStatus => lead.follow_up_status.clone(),
            LeadColumn::FollowUpRemark => lead.follow_up_remark.clone(),
            LeadColumn::CreatedAt => lead.created_at.map(|t| t.format("%Y-%m-%d").to_string()),
            LeadColumn::UpdatedAt => lead.updated_at.map(|t| t.format("%Y-%m-%d").to_string()),
        }
    }
}

/// The composite filter specification a caller assembles from the UI state.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    /// Free-text search over name, email, and business.
    pub search_term: Option<String>,
    pub assignment: Option<AssignmentFilter>,
    /// Active only when `Some` and non-empty.
    pub customer_ids: Option<IdSet>,
    /// Per-column substring filters; an entry with a blank value passes
    /// unconditionally.
    pub column_filters: Vec<(LeadColumn, String)>,
}

impl LeadFilter {
    pub fn with_search(term: impl Into<String>) -> Self {
        Self {
            search_term: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn with_customer_ids(ids: IdSet) -> Self {
        Self {
            customer_ids: Some(ids),
            ..Self::default()
        }
    }
}

/// Whether the lead is assigned to anyone: at least one of the assignment
/// fields holds a value that is not a "no one" sentinel.
pub fn is_assigned(lead: &Lead) -> bool {
    [lead.salesperson.as_deref(), lead.telecaller.as_deref()]
        .into_iter()
        .flatten()
        .any(|name| {
            let trimmed = name.trim();
            !UNASSIGNED_SENTINELS
                .iter()
                .any(|s| trimmed.eq_ignore_ascii_case(s))
        })
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Predicates with their needles lowercased once, before the pass over the
/// pool.
struct CompiledFilter<'a> {
    search: Option<String>,
    assignment: Option<AssignmentFilter>,
    customer_ids: Option<&'a IdSet>,
    columns: Vec<(LeadColumn, String)>,
}

impl<'a> CompiledFilter<'a> {
    fn new(filter: &'a LeadFilter) -> Self {
        let search = filter
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let customer_ids = filter.customer_ids.as_ref().filter(|ids| !ids.is_empty());
        let columns = filter
            .column_filters
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(column, value)| (*column, value.trim().to_lowercase()))
            .collect();
        Self {
            search,
            assignment: filter.assignment,
            customer_ids,
            columns,
        }
    }

    fn accepts(&self, lead: &Lead) -> bool {
        if let Some(term) = &self.search {
            let hit = contains_ci(&lead.name, term)
                || lead.email.as_deref().is_some_and(|e| contains_ci(e, term))
                || lead
                    .business
                    .as_deref()
                    .is_some_and(|b| contains_ci(b, term));
            if !hit {
                return false;
            }
        }

        match self.assignment {
            Some(AssignmentFilter::Assigned) if !is_assigned(lead) => return false,
            Some(AssignmentFilter::Unassigned) if is_assigned(lead) => return false,
            _ => {}
        }

        if let Some(ids) = self.customer_ids {
            if !ids.matches_lead(lead) {
                return false;
            }
        }

        self.columns.iter().all(|(column, needle)| {
            column
                .value_of(lead)
                .is_some_and(|value| contains_ci(&value, needle))
        })
    }
}

/// Filters the pool against the composite filter.
///
/// Survivors keep their relative input order; the first occurrence wins when
/// the same lead id reaches the filter more than once. Leads without an id
/// cannot collide and are kept as-is.
#[instrument(skip_all, fields(pool = leads.len()))]
pub fn filter_leads(leads: &[Lead], filter: &LeadFilter) -> Vec<Lead> {
    let compiled = CompiledFilter::new(filter);
    let mut seen: HashSet<EntityId> = HashSet::new();
    let mut out = Vec::new();

    for lead in leads {
        if !compiled.accepts(lead) {
            continue;
        }
        if let Some(id) = &lead.id {
            if !seen.insert(id.clone()) {
                continue;
            }
        }
        out.push(lead.clone());
    }

    debug!(matched = out.len(), "lead filter pass complete");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(id: i64, name: &str) -> Lead {
        Lead {
            id: Some(EntityId::from_i64(id)),
            name: name.to_string(),
            ..Lead::default()
        }
    }

    #[test]
    fn empty_filter_returns_pool_unchanged() {
        let pool = vec![lead(1, "Asha"), lead(2, "Binod")];
        let result = filter_leads(&pool, &LeadFilter::default());
        assert_eq!(result, pool);
    }

    #[test]
    fn search_matches_name_email_and_business_case_insensitively() {
        let pool = vec![
            lead(1, "Asha Traders"),
            Lead {
                email: Some("sales@ASHA.example".into()),
                ..lead(2, "Binod")
            },
            Lead {
                business: Some("Asha & Sons".into()),
                ..lead(3, "Chitra")
            },
            lead(4, "Deepak"),
        ];
        let result = filter_leads(&pool, &LeadFilter::with_search("asha"));
        let ids: Vec<_> = result.iter().map(|l| l.id.clone().unwrap()).collect();
        assert_eq!(
            ids,
            vec![
                EntityId::from_i64(1),
                EntityId::from_i64(2),
                EntityId::from_i64(3)
            ]
        );
    }

    #[test]
    fn assignment_sentinels_mean_unassigned() {
        for sentinel in ["Unassigned", "N/A", "na", "-", "", "  "] {
            let l = Lead {
                salesperson: Some(sentinel.into()),
                ..lead(1, "x")
            };
            assert!(!is_assigned(&l), "sentinel {sentinel:?}");
        }
        let l = Lead {
            telecaller: Some("Ravi".into()),
            ..lead(1, "x")
        };
        assert!(is_assigned(&l));
    }

    #[test]
    fn assignment_filter_respects_both_fields() {
        let pool = vec![
            Lead {
                salesperson: Some("Ravi".into()),
                ..lead(1, "a")
            },
            Lead {
                salesperson: Some("unassigned".into()),
                telecaller: Some("-".into()),
                ..lead(2, "b")
            },
        ];
        let assigned = filter_leads(
            &pool,
            &LeadFilter {
                assignment: Some(AssignmentFilter::Assigned),
                ..LeadFilter::default()
            },
        );
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, Some(EntityId::from_i64(1)));

        let unassigned = filter_leads(
            &pool,
            &LeadFilter {
                assignment: Some(AssignmentFilter::Unassigned),
                ..LeadFilter::default()
            },
        );
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].id, Some(EntityId::from_i64(2)));
    }

    #[test]
    fn empty_id_set_deactivates_the_customer_predicate() {
        let pool = vec![lead(1, "a")];
        let filter = LeadFilter::with_customer_ids(IdSet::new());
        assert_eq!(filter_leads(&pool, &filter).len(), 1);
    }

    #[test]
    fn customer_id_predicate_uses_identity_matching() {
        let mut ids = IdSet::new();
        ids.insert(EntityId::from_i64(2));
        let pool = vec![lead(1, "a"), lead(2, "b")];
        let result = filter_leads(&pool, &LeadFilter::with_customer_ids(ids));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, Some(EntityId::from_i64(2)));
    }

    #[test]
    fn blank_column_filter_passes_unconditionally() {
        let pool = vec![lead(1, "a")];
        let filter = LeadFilter {
            column_filters: vec![(LeadColumn::State, "   ".into())],
            ..LeadFilter::default()
        };
        assert_eq!(filter_leads(&pool, &filter).len(), 1);
    }

    #[test]
    fn column_filter_is_substring_and_case_insensitive() {
        let pool = vec![
            Lead {
                state: Some("Maharashtra".into()),
                ..lead(1, "a")
            },
            Lead {
                state: Some("Karnataka".into()),
                ..lead(2, "b")
            },
            lead(3, "c"),
        ];
        let filter = LeadFilter {
            column_filters: vec![(LeadColumn::State, "MAHA".into())],
            ..LeadFilter::default()
        };
        let result = filter_leads(&pool, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, Some(EntityId::from_i64(1)));
    }

    #[test]
    fn assignment_failure_short_circuits_column_matches() {
        // The lead matches the column filter but fails assignment first.
        let pool = vec![Lead {
            state: Some("Kerala".into()),
            ..lead(1, "a")
        }];
        let filter = LeadFilter {
            assignment: Some(AssignmentFilter::Assigned),
            column_filters: vec![(LeadColumn::State, "kerala".into())],
            ..LeadFilter::default()
        };
        assert!(filter_leads(&pool, &filter).is_empty());
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence_only() {
        let pool = vec![lead(1, "first"), lead(2, "other"), lead(1, "second")];
        let result = filter_leads(&pool, &LeadFilter::default());
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "first");
    }

    #[test]
    fn leads_without_ids_are_exempt_from_dedup() {
        let pool = vec![
            Lead {
                name: "a".into(),
                ..Lead::default()
            },
            Lead {
                name: "b".into(),
                ..Lead::default()
            },
        ];
        assert_eq!(filter_leads(&pool, &LeadFilter::default()).len(), 2);
    }

    #[test]
    fn column_names_parse_from_cli_form() {
        use std::str::FromStr;
        assert_eq!(
            LeadColumn::from_str("follow_up_status").unwrap(),
            LeadColumn::FollowUpStatus
        );
        assert_eq!(LeadColumn::from_str("Email").unwrap(), LeadColumn::Email);
    }
}
