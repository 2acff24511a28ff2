//! Financial recomputation for proforma invoices.
//!
//! Amounts round half-up to the whole currency unit. That is a business rule
//! inherited from the approved documents already in circulation, not a
//! floating-point shortcut, and it must reproduce their figures exactly.
//!
//! A revised invoice (one carrying `parent_pi_id`) stores its own subtotal,
//! tax, and total, and those stored values win over anything recomputed from
//! line items: the revision may have dropped or shrunk lines, and the stored
//! figures already reflect that. Recomputation from the effective line items
//! is only the fallback for revisions whose stored values are missing.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::models::{
    AmendmentDetail, LineItem, Payment, PaymentStatus, ProformaInvoice, Quotation,
};

/// The authoritative money figures for one invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub advance_payment: Decimal,
    pub balance_due: Decimal,
}

/// Half-up rounding to the whole currency unit.
fn round_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn percent_of(base: Decimal, rate: Decimal) -> Decimal {
    base * rate / Decimal::ONE_HUNDRED
}

/// The line items a revised invoice actually bills for.
///
/// Items named in `removed_item_ids` are dropped; items named in
/// `reduced_items` get the override quantity with their amount scaled
/// proportionally (a zero original quantity scales to zero, never a division
/// error). Everything else passes through unchanged. The input is never
/// mutated.
pub fn effective_line_items(
    items: &[LineItem],
    amendment: Option<&AmendmentDetail>,
) -> Vec<LineItem> {
    let Some(amendment) = amendment else {
        return items.to_vec();
    };
    items
        .iter()
        .filter(|item| {
            item.id
                .as_ref()
                .map_or(true, |id| !amendment.removed_item_ids.contains(id))
        })
        .map(|item| {
            let reduced = item
                .id
                .as_ref()
                .and_then(|id| amendment.reduced_quantity(id));
            match reduced {
                Some(new_quantity) => {
                    let amount = if item.quantity.is_zero() {
                        Decimal::ZERO
                    } else {
                        item.amount / item.quantity * new_quantity
                    };
                    LineItem {
                        quantity: new_quantity,
                        amount,
                        ..item.clone()
                    }
                }
                None => item.clone(),
            }
        })
        .collect()
}

/// Sum of payments whose approval status is `approved`; pending, rejected,
/// and unrecognized payments are excluded.
pub fn advance_paid(payments: &[Payment]) -> Decimal {
    payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Approved)
        .map(|p| p.amount)
        .sum()
}

/// Computes the authoritative totals for an invoice.
///
/// Fresh invoices recompute everything from the quotation's line items;
/// revisions trust their stored figures (see module docs). The advance paid
/// and the outstanding balance against the quotation are folded into the
/// result.
#[instrument(skip_all, fields(revision = pi.is_revision(), items = line_items.len()))]
pub fn compute_totals(
    pi: &ProformaInvoice,
    quotation: &Quotation,
    line_items: &[LineItem],
    payments: &[Payment],
) -> InvoiceTotals {
    let discount_rate = quotation.discount_rate.unwrap_or_default();
    let tax_rate = quotation.tax_rate.unwrap_or_default();

    let items = effective_line_items(line_items, pi.amendment.as_ref());
    let computed_subtotal = round_unit(items.iter().map(|i| i.amount).sum());

    let (subtotal, discount_amount, taxable_amount, tax_amount, total) = if pi.is_revision() {
        let subtotal = pi.subtotal.map(round_unit).unwrap_or(computed_subtotal);
        let discount_amount = pi
            .discount_amount
            .or(quotation.discount_amount)
            .map(round_unit)
            .unwrap_or_else(|| round_unit(percent_of(subtotal, discount_rate)));
        let taxable_amount = (subtotal - discount_amount).max(Decimal::ZERO);
        let tax_amount = pi
            .tax_amount
            .map(round_unit)
            .unwrap_or_else(|| round_unit(percent_of(taxable_amount, tax_rate)));
        let total = pi
            .total_amount
            .map(round_unit)
            .unwrap_or(taxable_amount + tax_amount);
        (subtotal, discount_amount, taxable_amount, tax_amount, total)
    } else {
        let subtotal = computed_subtotal;
        let discount_amount = quotation
            .discount_amount
            .map(round_unit)
            .unwrap_or_else(|| round_unit(percent_of(subtotal, discount_rate)));
        let taxable_amount = (subtotal - discount_amount).max(Decimal::ZERO);
        let tax_amount = quotation
            .tax_amount
            .map(round_unit)
            .unwrap_or_else(|| round_unit(percent_of(taxable_amount, tax_rate)));
        let total = taxable_amount + tax_amount;
        (subtotal, discount_amount, taxable_amount, tax_amount, total)
    };

    let advance_payment = advance_paid(payments);
    let quotation_total = quotation.total.unwrap_or(total);
    let balance_due = (quotation_total - advance_payment).max(Decimal::ZERO);

    let totals = InvoiceTotals {
        subtotal,
        discount_rate,
        discount_amount,
        taxable_amount,
        tax_rate,
        tax_amount,
        total,
        advance_payment,
        balance_due,
    };
    debug!(total = %totals.total, balance_due = %totals.balance_due, "invoice totals computed");
    totals
}

/// The amount an approval screen presents as the final figure owed.
///
/// With an advance recorded against a real original-quotation total, the
/// subtracted remainder applies unless the invoice states its own total and
/// that total is plausible (non-zero, not above the original): a figure a
/// human recorded on the invoice outranks the arithmetic. Without an
/// advance, a positive invoice total wins, then the quotation's.
pub fn compute_final_total(
    pi_total: Option<Decimal>,
    quotation_total: Option<Decimal>,
    advance_paid: Decimal,
    original_quotation_total: Option<Decimal>,
) -> Decimal {
    let original = original_quotation_total.unwrap_or_default();
    if advance_paid > Decimal::ZERO && original > Decimal::ZERO {
        match pi_total {
            Some(total) if total > Decimal::ZERO && total <= original => total,
            _ => original - advance_paid,
        }
    } else {
        match pi_total {
            Some(total) if total > Decimal::ZERO => total,
            _ => quotation_total.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{EntityId, PiStatus, QuotationStatus, ReducedItem};

    fn item(id: i64, quantity: Decimal, amount: Decimal) -> LineItem {
        LineItem {
            id: Some(EntityId::from_i64(id)),
            product: format!("item-{id}"),
            description: None,
            quantity,
            unit: None,
            unit_price: if quantity.is_zero() {
                Decimal::ZERO
            } else {
                amount / quantity
            },
            tax_rate: None,
            amount,
        }
    }

    fn quotation_with_rates(discount: Decimal, tax: Decimal) -> Quotation {
        Quotation {
            discount_rate: Some(discount),
            tax_rate: Some(tax),
            ..Quotation::new(1, QuotationStatus::Approved)
        }
    }

    #[test]
    fn fresh_invoice_rounding_parity() {
        // Subtotal 10000, no discount, 18% tax: the figures approved
        // documents already carry.
        let pi = ProformaInvoice::new(1, PiStatus::PendingApproval);
        let quotation = quotation_with_rates(dec!(0), dec!(18));
        let items = vec![item(1, dec!(4), dec!(6000)), item(2, dec!(2), dec!(4000))];

        let totals = compute_totals(&pi, &quotation, &items, &[]);
        assert_eq!(totals.subtotal, dec!(10000));
        assert_eq!(totals.discount_amount, dec!(0));
        assert_eq!(totals.taxable_amount, dec!(10000));
        assert_eq!(totals.tax_amount, dec!(1800));
        assert_eq!(totals.total, dec!(11800));
    }

    #[test]
    fn tax_rounds_half_up_to_whole_units() {
        let pi = ProformaInvoice::new(1, PiStatus::PendingApproval);
        let quotation = quotation_with_rates(dec!(0), dec!(18));
        // 18% of 1475 = 265.5, rounds up to 266.
        let items = vec![item(1, dec!(1), dec!(1475))];
        let totals = compute_totals(&pi, &quotation, &items, &[]);
        assert_eq!(totals.tax_amount, dec!(266));
    }

    #[test]
    fn quotation_stored_amounts_beat_rate_recomputation() {
        let pi = ProformaInvoice::new(1, PiStatus::PendingApproval);
        let quotation = Quotation {
            discount_amount: Some(dec!(500)),
            tax_amount: Some(dec!(1710)),
            ..quotation_with_rates(dec!(10), dec!(18))
        };
        let items = vec![item(1, dec!(1), dec!(10000))];
        let totals = compute_totals(&pi, &quotation, &items, &[]);
        assert_eq!(totals.discount_amount, dec!(500));
        assert_eq!(totals.taxable_amount, dec!(9500));
        assert_eq!(totals.tax_amount, dec!(1710));
        assert_eq!(totals.total, dec!(11210));
    }

    #[test]
    fn discount_never_drives_taxable_below_zero() {
        let pi = ProformaInvoice::new(1, PiStatus::PendingApproval);
        let quotation = Quotation {
            discount_amount: Some(dec!(5000)),
            ..quotation_with_rates(dec!(0), dec!(18))
        };
        let items = vec![item(1, dec!(1), dec!(1000))];
        let totals = compute_totals(&pi, &quotation, &items, &[]);
        assert_eq!(totals.taxable_amount, dec!(0));
        assert_eq!(totals.tax_amount, dec!(0));
    }

    #[test]
    fn revision_stored_totals_are_authoritative() {
        // Three original lines, one removed by the amendment. The stored
        // figures already reflect the removal and must win over a
        // recomputation from the two surviving raw lines.
        let amendment = AmendmentDetail::new(
            [EntityId::from_i64(3)].into_iter().collect::<HashSet<_>>(),
            vec![],
        );
        let pi = ProformaInvoice {
            subtotal: Some(dec!(8000)),
            tax_amount: Some(dec!(1440)),
            total_amount: Some(dec!(9440)),
            parent_pi_id: Some(EntityId::from_i64(10)),
            amendment: Some(amendment),
            ..ProformaInvoice::new(11, PiStatus::PendingApproval)
        };
        let quotation = quotation_with_rates(dec!(0), dec!(18));
        let items = vec![
            item(1, dec!(1), dec!(6000)),
            item(2, dec!(1), dec!(5000)),
            item(3, dec!(1), dec!(4000)),
        ];
        let totals = compute_totals(&pi, &quotation, &items, &[]);
        assert_eq!(totals.subtotal, dec!(8000));
        assert_eq!(totals.tax_amount, dec!(1440));
        assert_eq!(totals.total, dec!(9440));
    }

    #[test]
    fn revision_without_stored_values_recomputes_from_effective_items() {
        let amendment = AmendmentDetail::new(
            [EntityId::from_i64(2)].into_iter().collect::<HashSet<_>>(),
            vec![ReducedItem {
                line_item_id: EntityId::from_i64(1),
                quantity: dec!(1),
            }],
        );
        let pi = ProformaInvoice {
            parent_pi_id: Some(EntityId::from_i64(10)),
            amendment: Some(amendment),
            ..ProformaInvoice::new(11, PiStatus::PendingApproval)
        };
        let quotation = quotation_with_rates(dec!(0), dec!(18));
        // Line 1: 2 units for 4000, reduced to 1 unit (2000); line 2 removed.
        let items = vec![item(1, dec!(2), dec!(4000)), item(2, dec!(1), dec!(5000))];
        let totals = compute_totals(&pi, &quotation, &items, &[]);
        assert_eq!(totals.subtotal, dec!(2000));
        assert_eq!(totals.tax_amount, dec!(360));
        assert_eq!(totals.total, dec!(2360));
    }

    #[test]
    fn effective_items_guard_zero_quantity() {
        let amendment = AmendmentDetail::new(
            HashSet::new(),
            vec![ReducedItem {
                line_item_id: EntityId::from_i64(1),
                quantity: dec!(3),
            }],
        );
        let items = vec![item(1, dec!(0), dec!(500))];
        let effective = effective_line_items(&items, Some(&amendment));
        assert_eq!(effective[0].amount, dec!(0));
        assert_eq!(effective[0].quantity, dec!(3));
    }

    #[test]
    fn effective_items_never_mutate_the_input() {
        let amendment = AmendmentDetail::new(
            [EntityId::from_i64(1)].into_iter().collect::<HashSet<_>>(),
            vec![],
        );
        let items = vec![item(1, dec!(1), dec!(100)), item(2, dec!(1), dec!(200))];
        let effective = effective_line_items(&items, Some(&amendment));
        assert_eq!(effective.len(), 1);
        assert_eq!(items.len(), 2, "input untouched");
        assert_eq!(items[0].amount, dec!(100));
    }

    #[test]
    fn advance_counts_only_approved_payments() {
        let payments = vec![
            Payment::approved(dec!(10000)),
            Payment::approved(dec!(5000)),
            Payment {
                status: PaymentStatus::Pending,
                ..Payment::approved(dec!(20000))
            },
        ];
        assert_eq!(advance_paid(&payments), dec!(15000));
    }

    #[test]
    fn balance_due_excludes_unapproved_payments() {
        let pi = ProformaInvoice::new(1, PiStatus::Approved);
        let quotation = Quotation {
            total: Some(dec!(50000)),
            ..quotation_with_rates(dec!(0), dec!(0))
        };
        let payments = vec![
            Payment::approved(dec!(10000)),
            Payment::approved(dec!(5000)),
            Payment {
                status: PaymentStatus::Pending,
                ..Payment::approved(dec!(20000))
            },
        ];
        let totals = compute_totals(&pi, &quotation, &[], &payments);
        assert_eq!(totals.advance_payment, dec!(15000));
        assert_eq!(totals.balance_due, dec!(35000));
    }

    #[test]
    fn balance_due_floors_at_zero() {
        let pi = ProformaInvoice::new(1, PiStatus::Approved);
        let quotation = Quotation {
            total: Some(dec!(1000)),
            ..quotation_with_rates(dec!(0), dec!(0))
        };
        let payments = vec![Payment::approved(dec!(1500))];
        let totals = compute_totals(&pi, &quotation, &[], &payments);
        assert_eq!(totals.balance_due, dec!(0));
    }

    #[test]
    fn final_total_prefers_plausible_pi_total_over_remainder() {
        // Advance recorded: the PI's own figure wins while it stays within
        // the original quotation total.
        assert_eq!(
            compute_final_total(Some(dec!(9440)), Some(dec!(9440)), dec!(2000), Some(dec!(11800))),
            dec!(9440)
        );
        // PI total above the original is implausible: subtract instead.
        assert_eq!(
            compute_final_total(Some(dec!(15000)), None, dec!(2000), Some(dec!(11800))),
            dec!(9800)
        );
        // Zero PI total: subtract.
        assert_eq!(
            compute_final_total(Some(dec!(0)), None, dec!(2000), Some(dec!(11800))),
            dec!(9800)
        );
    }

    #[test]
    fn final_total_without_advance_prefers_positive_pi_total() {
        assert_eq!(
            compute_final_total(Some(dec!(9440)), Some(dec!(11800)), dec!(0), Some(dec!(11800))),
            dec!(9440)
        );
        assert_eq!(
            compute_final_total(None, Some(dec!(11800)), dec!(0), None),
            dec!(11800)
        );
        assert_eq!(compute_final_total(None, None, dec!(0), None), dec!(0));
    }

    #[test]
    fn empty_inputs_degrade_to_zero_totals() {
        let pi = ProformaInvoice::new(1, PiStatus::Draft);
        let quotation = Quotation::new(1, QuotationStatus::Approved);
        let totals = compute_totals(&pi, &quotation, &[], &[]);
        assert_eq!(totals, InvoiceTotals::default());
    }
}
