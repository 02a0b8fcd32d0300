//! Invoice data structures as exchanged with the backend and the UI.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::client::Client;
use crate::money;

/// One billed line on an invoice.
///
/// `amount` is stored independently of `quantity` and `rate`; the editing
/// layer keeps it equal to their product, and [`Invoice::validate`] reports
/// any drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    /// Harmonized System of Nomenclature code printed per line.
    #[serde(default)]
    pub hsn_code: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    /// GST percentage in the 0-100 range.
    pub gst_rate: Decimal,
    pub amount: Decimal,
}

impl LineItem {
    /// Create a line with `amount` derived from quantity and rate.
    pub fn new(
        description: impl Into<String>,
        hsn_code: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
        gst_rate: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            hsn_code: hsn_code.into(),
            quantity,
            rate,
            gst_rate,
            amount: quantity * rate,
        }
    }
}

/// Lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
        }
    }
}

/// Computed money figures for an invoice.
///
/// Always derived from the line items in full; never adjusted
/// incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    /// Sum of line amounts before tax.
    pub subtotal: Decimal,
    /// Sum of per-line GST shares.
    pub gst_amount: Decimal,
    /// Subtotal plus GST, before rounding.
    pub total: Decimal,
    /// Adjustment that brings the total to a whole rupee.
    pub round_off: Decimal,
}

impl InvoiceTotals {
    /// The whole-rupee amount actually payable.
    pub fn payable(&self) -> Decimal {
        self.total + self.round_off
    }
}

/// An invoice as persisted by the backend or drafted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Backend-assigned identifier; absent on local drafts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: InvoiceStatus,
    pub client: Client,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Stored totals are a display hint; readers recompute from the items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<InvoiceTotals>,
}

impl Invoice {
    /// Check internal consistency and return human-readable issues.
    ///
    /// An empty vector means the invoice is consistent. Comparisons use a
    /// one-paisa tolerance.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let tolerance = money::MONEY_TOLERANCE;

        if self.invoice_number.trim().is_empty() {
            issues.push("invoice number is empty".to_string());
        }

        if let (Some(due), date) = (self.due_date, self.invoice_date) {
            if due < date {
                issues.push(format!(
                    "due date {} is before invoice date {}",
                    due, date
                ));
            }
        }

        for (i, item) in self.items.iter().enumerate() {
            let line = i + 1;

            if item.quantity < Decimal::ZERO {
                issues.push(format!("line {}: negative quantity {}", line, item.quantity));
            }
            if item.rate < Decimal::ZERO {
                issues.push(format!("line {}: negative rate {}", line, item.rate));
            }
            if item.gst_rate < Decimal::ZERO || item.gst_rate > Decimal::ONE_HUNDRED {
                issues.push(format!(
                    "line {}: GST rate {} outside 0-100",
                    line, item.gst_rate
                ));
            }

            let expected = item.quantity * item.rate;
            if (expected - item.amount).abs() > tolerance {
                issues.push(format!(
                    "line {}: amount {} does not match quantity x rate ({})",
                    line, item.amount, expected
                ));
            }
        }

        if let Some(stored) = &self.totals {
            let computed = money::compute_totals(&self.items);
            if (stored.subtotal - computed.subtotal).abs() > tolerance {
                issues.push(format!(
                    "stored subtotal {} does not match computed {}",
                    stored.subtotal, computed.subtotal
                ));
            }
            if (stored.gst_amount - computed.gst_amount).abs() > tolerance {
                issues.push(format!(
                    "stored GST amount {} does not match computed {}",
                    stored.gst_amount, computed.gst_amount
                ));
            }
            if (stored.total - computed.total).abs() > tolerance {
                issues.push(format!(
                    "stored total {} does not match computed {}",
                    stored.total, computed.total
                ));
            }
        }

        issues
    }
}

/// Payload for creating an invoice. The backend assigns the id and expands
/// the client reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCreate {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: InvoiceStatus,
    pub client_id: Uuid,
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InvoiceCreate {
    /// Build a create payload from a drafted invoice.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            status: invoice.status,
            client_id: invoice.client.id,
            items: invoice.items.clone(),
            notes: invoice.notes.clone(),
        }
    }
}

/// Partial-update payload for an invoice. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn test_client() -> Client {
        Client {
            id: Uuid::new_v4(),
            name: "Acme Traders".to_string(),
            email: String::new(),
            phone: String::new(),
            address: "14 MG Road, Pune".to_string(),
            gstin: Some("27AAAPA1234A1Z5".to_string()),
        }
    }

    fn test_invoice() -> Invoice {
        Invoice {
            id: None,
            invoice_number: "INV-2025-001".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            due_date: Some(NaiveDate::from_ymd_opt(2025, 4, 16).unwrap()),
            status: InvoiceStatus::Draft,
            client: test_client(),
            items: vec![
                LineItem::new(
                    "Laptop stand",
                    "8473",
                    Decimal::from(2),
                    Decimal::from(1500),
                    Decimal::from(18),
                ),
                LineItem::new(
                    "HDMI cable",
                    "8544",
                    Decimal::from(3),
                    Decimal::from(250),
                    Decimal::from(12),
                ),
            ],
            notes: Some("Payment within 15 days".to_string()),
            totals: None,
        }
    }

    #[test]
    fn test_line_item_derives_amount() {
        let item = LineItem::new(
            "Widget",
            "8471",
            Decimal::from(4),
            Decimal::from_str("12.50").unwrap(),
            Decimal::from(18),
        );
        assert_eq!(item.amount, Decimal::from(50));
    }

    #[test]
    fn test_validate_accepts_consistent_invoice() {
        let invoice = test_invoice();
        assert!(invoice.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_amount_drift() {
        let mut invoice = test_invoice();
        invoice.items[0].amount = Decimal::from(9999);

        let issues = invoice.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("does not match quantity x rate"));
    }

    #[test]
    fn test_validate_reports_stored_totals_drift() {
        let mut invoice = test_invoice();
        let mut totals = money::compute_totals(&invoice.items);
        totals.subtotal += Decimal::from(10);
        invoice.totals = Some(totals);

        let issues = invoice.validate();
        assert!(issues.iter().any(|i| i.contains("stored subtotal")));
    }

    #[test]
    fn test_validate_reports_bad_gst_rate() {
        let mut invoice = test_invoice();
        invoice.items[1].gst_rate = Decimal::from(120);

        let issues = invoice.validate();
        assert!(issues.iter().any(|i| i.contains("outside 0-100")));
    }

    #[test]
    fn test_validate_reports_due_before_issue() {
        let mut invoice = test_invoice();
        invoice.due_date = Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        let issues = invoice.validate();
        assert!(issues.iter().any(|i| i.contains("before invoice date")));
    }

    #[test]
    fn test_invoice_json_roundtrip() {
        let mut invoice = test_invoice();
        invoice.totals = Some(money::compute_totals(&invoice.items));

        let json = serde_json::to_string(&invoice).unwrap();
        let back: Invoice = serde_json::from_str(&json).unwrap();
        assert_eq!(invoice, back);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&InvoiceStatus::Paid).unwrap();
        assert_eq!(json, r#""paid""#);
    }

    #[test]
    fn test_create_payload_references_client_by_id() {
        let invoice = test_invoice();
        let payload = InvoiceCreate::from_invoice(&invoice);

        assert_eq!(payload.client_id, invoice.client.id);
        assert_eq!(payload.items.len(), 2);

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("clientId").is_some());
        assert!(json.get("client").is_none());
    }
}
