//! Invoice form state: the draft an editor mutates, with totals kept
//! current on every change.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::FormError;
use crate::models::client::Client;
use crate::models::config::BeejakConfig;
use crate::models::invoice::{Invoice, InvoiceStatus, InvoiceTotals, LineItem};
use crate::money;

/// An invoice being edited.
///
/// Every mutation re-derives line amounts and recomputes the totals, so
/// [`InvoiceForm::totals`] is never stale. Line amounts always equal
/// quantity times rate; a mutation that writes `amount` directly is
/// overwritten by the derivation.
#[derive(Debug, Clone)]
pub struct InvoiceForm {
    invoice: Invoice,
    totals: InvoiceTotals,
}

impl InvoiceForm {
    /// Start a draft for a client, applying the configured defaults:
    /// number prefix, due days, and draft status.
    pub fn new(client: Client, invoice_date: NaiveDate, config: &BeejakConfig) -> Self {
        let invoice = Invoice {
            id: None,
            invoice_number: format!(
                "{}{}",
                config.invoice.number_prefix,
                invoice_date.format("%Y%m%d")
            ),
            invoice_date,
            due_date: Some(invoice_date + Duration::days(config.invoice.due_days)),
            status: InvoiceStatus::Draft,
            client,
            items: Vec::new(),
            notes: None,
            totals: None,
        };
        Self {
            totals: money::compute_totals(&invoice.items),
            invoice,
        }
    }

    /// Resume editing an existing invoice. Stored totals are discarded
    /// and recomputed from the items.
    pub fn from_invoice(mut invoice: Invoice) -> Self {
        invoice.totals = None;
        let totals = money::compute_totals(&invoice.items);
        Self { invoice, totals }
    }

    /// The invoice as currently drafted, without totals stamped.
    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    /// Current totals, recomputed on the last mutation.
    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    /// Finish editing: the invoice with current totals stamped in.
    pub fn into_invoice(mut self) -> Invoice {
        self.invoice.totals = Some(self.totals);
        self.invoice
    }

    /// Append a line item and return its index. The amount is derived
    /// from quantity and rate.
    pub fn add_item(
        &mut self,
        description: impl Into<String>,
        hsn_code: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
        gst_rate: Decimal,
    ) -> usize {
        self.invoice
            .items
            .push(LineItem::new(description, hsn_code, quantity, rate, gst_rate));
        self.recompute();
        self.invoice.items.len() - 1
    }

    /// Mutate a line item in place, then re-derive its amount and the
    /// totals.
    pub fn update_item<F>(&mut self, index: usize, mutate: F) -> Result<(), FormError>
    where
        F: FnOnce(&mut LineItem),
    {
        let len = self.invoice.items.len();
        let item = self
            .invoice
            .items
            .get_mut(index)
            .ok_or(FormError::NoSuchItem { index, len })?;
        mutate(item);
        item.amount = item.quantity * item.rate;
        self.recompute();
        Ok(())
    }

    /// Remove a line item and return it.
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, FormError> {
        let len = self.invoice.items.len();
        if index >= len {
            return Err(FormError::NoSuchItem { index, len });
        }
        let item = self.invoice.items.remove(index);
        self.recompute();
        Ok(item)
    }

    /// Replace the whole item list, e.g. after a paste or import. Stored
    /// amounts are taken as-is; [`Invoice::validate`] reports drift.
    pub fn set_items(&mut self, items: Vec<LineItem>) {
        self.invoice.items = items;
        self.recompute();
    }

    pub fn set_client(&mut self, client: Client) {
        self.invoice.client = client;
    }

    pub fn set_invoice_number(&mut self, number: impl Into<String>) {
        self.invoice.invoice_number = number.into();
    }

    pub fn set_dates(&mut self, invoice_date: NaiveDate, due_date: Option<NaiveDate>) {
        self.invoice.invoice_date = invoice_date;
        self.invoice.due_date = due_date;
    }

    pub fn set_status(&mut self, status: InvoiceStatus) {
        self.invoice.status = status;
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.invoice.notes = notes;
    }

    /// Consistency issues in the current draft; empty when clean.
    pub fn validate(&self) -> Vec<String> {
        self.invoice.validate()
    }

    fn recompute(&mut self) {
        self.totals = money::compute_totals(&self.invoice.items);
        debug!(
            "Recomputed totals for invoice {}: payable {}",
            self.invoice.invoice_number,
            self.totals.payable()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use uuid::Uuid;

    fn test_client() -> Client {
        Client {
            id: Uuid::new_v4(),
            name: "Sharma Electricals".to_string(),
            email: String::new(),
            phone: String::new(),
            address: "7 Nehru Place, Delhi".to_string(),
            gstin: None,
        }
    }

    fn april_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    #[test]
    fn test_new_applies_config_defaults() {
        let form = InvoiceForm::new(test_client(), april_first(), &BeejakConfig::default());
        let invoice = form.invoice();

        assert_eq!(invoice.invoice_number, "INV-20250401");
        assert_eq!(
            invoice.due_date,
            Some(NaiveDate::from_ymd_opt(2025, 4, 16).unwrap())
        );
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(form.totals().payable(), Decimal::ZERO);
    }

    #[test]
    fn test_add_item_recomputes_totals() {
        let mut form = InvoiceForm::new(test_client(), april_first(), &BeejakConfig::default());

        let index = form.add_item(
            "Copper wire",
            "8544",
            Decimal::from(2),
            Decimal::from(1000),
            Decimal::from(18),
        );

        assert_eq!(index, 0);
        assert_eq!(form.totals().subtotal, Decimal::from(2000));
        assert_eq!(form.totals().gst_amount, Decimal::from(360));
        assert_eq!(form.totals().total, Decimal::from(2360));
    }

    #[test]
    fn test_update_item_rederives_amount() {
        let mut form = InvoiceForm::new(test_client(), april_first(), &BeejakConfig::default());
        form.add_item("Switchboard", "8536", Decimal::from(1), Decimal::from(500), Decimal::from(18));

        form.update_item(0, |item| {
            item.quantity = Decimal::from(3);
        })
        .unwrap();

        assert_eq!(form.invoice().items[0].amount, Decimal::from(1500));
        assert_eq!(form.totals().subtotal, Decimal::from(1500));
    }

    #[test]
    fn test_update_item_overrides_direct_amount_writes() {
        let mut form = InvoiceForm::new(test_client(), april_first(), &BeejakConfig::default());
        form.add_item("Switchboard", "8536", Decimal::from(1), Decimal::from(500), Decimal::from(18));

        form.update_item(0, |item| {
            item.amount = Decimal::from(9999);
        })
        .unwrap();

        assert_eq!(form.invoice().items[0].amount, Decimal::from(500));
    }

    #[test]
    fn test_update_item_out_of_range() {
        let mut form = InvoiceForm::new(test_client(), april_first(), &BeejakConfig::default());
        let err = form.update_item(3, |_| {}).unwrap_err();
        assert!(matches!(err, FormError::NoSuchItem { index: 3, len: 0 }));
    }

    #[test]
    fn test_remove_item_recomputes() {
        let mut form = InvoiceForm::new(test_client(), april_first(), &BeejakConfig::default());
        form.add_item("A", "", Decimal::from(1), Decimal::from(100), Decimal::from(5));
        form.add_item("B", "", Decimal::from(1), Decimal::from(200), Decimal::from(5));

        let removed = form.remove_item(0).unwrap();
        assert_eq!(removed.description, "A");
        assert_eq!(form.totals().subtotal, Decimal::from(200));
    }

    #[test]
    fn test_set_items_trusts_stored_amounts() {
        let mut form = InvoiceForm::new(test_client(), april_first(), &BeejakConfig::default());
        let mut item = LineItem::new("Drifted", "", Decimal::from(2), Decimal::from(50), Decimal::ZERO);
        item.amount = Decimal::from(70);
        form.set_items(vec![item]);

        assert_eq!(form.totals().subtotal, Decimal::from(70));
        assert!(form
            .validate()
            .iter()
            .any(|i| i.contains("does not match quantity x rate")));
    }

    #[test]
    fn test_into_invoice_stamps_totals() {
        let mut form = InvoiceForm::new(test_client(), april_first(), &BeejakConfig::default());
        form.add_item("Fan", "8414", Decimal::from(1), Decimal::from_str("1186.44").unwrap(), Decimal::from(18));

        let invoice = form.into_invoice();
        let totals = invoice.totals.unwrap();

        // 1186.44 * 1.18 = 1399.9992, rounds to 1400.00
        assert_eq!(totals.total, Decimal::from_str("1400.00").unwrap());
        assert_eq!(totals.round_off, Decimal::from_str("0.00").unwrap());
    }

    #[test]
    fn test_from_invoice_discards_stored_totals() {
        let mut form = InvoiceForm::new(test_client(), april_first(), &BeejakConfig::default());
        form.add_item("Fan", "8414", Decimal::from(1), Decimal::from(1000), Decimal::from(18));
        let mut invoice = form.into_invoice();
        if let Some(totals) = invoice.totals.as_mut() {
            totals.subtotal = Decimal::from(1);
        }

        let resumed = InvoiceForm::from_invoice(invoice);
        assert_eq!(resumed.totals().subtotal, Decimal::from(1000));
    }
}
