//! Aggregate figures shown on the dashboard, derived from a list of
//! invoices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::invoice::{Invoice, InvoiceStatus};
use crate::money;

/// Counts and revenue sums over a set of invoices. All money figures are
/// payable amounts, recomputed from each invoice's line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub invoice_count: usize,
    pub draft_count: usize,
    pub sent_count: usize,
    pub paid_count: usize,
    /// Payable sum over sent and paid invoices.
    pub total_billed: Decimal,
    /// Payable sum over paid invoices.
    pub total_collected: Decimal,
    /// Payable sum over sent invoices awaiting payment.
    pub total_outstanding: Decimal,
}

/// Summarize invoices for the dashboard.
pub fn summarize(invoices: &[Invoice]) -> DashboardStats {
    let mut stats = DashboardStats::default();

    for invoice in invoices {
        stats.invoice_count += 1;
        let payable = money::compute_totals(&invoice.items).payable();

        match invoice.status {
            InvoiceStatus::Draft => {
                stats.draft_count += 1;
            }
            InvoiceStatus::Sent => {
                stats.sent_count += 1;
                stats.total_billed += payable;
                stats.total_outstanding += payable;
            }
            InvoiceStatus::Paid => {
                stats.paid_count += 1;
                stats.total_billed += payable;
                stats.total_collected += payable;
            }
        }
    }

    stats
}
