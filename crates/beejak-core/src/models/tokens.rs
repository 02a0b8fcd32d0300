//! Data tokens: the read-only catalog of value paths a template component
//! can reference, and the projection of an invoice into those values.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::config::BusinessConfig;
use crate::models::invoice::Invoice;
use crate::{money, words};

/// One entry in the token catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenDescriptor {
    /// Dotted path used in component `fields`, e.g. `client.name`.
    pub path: &'static str,
    /// Label shown in the designer palette.
    pub label: &'static str,
    /// Palette group the token belongs to.
    pub group: &'static str,
}

/// Every token path a template may reference.
pub const TOKENS: [TokenDescriptor; 19] = [
    TokenDescriptor { path: "business.name", label: "Business Name", group: "business" },
    TokenDescriptor { path: "business.gstin", label: "Business GSTIN", group: "business" },
    TokenDescriptor { path: "business.address", label: "Business Address", group: "business" },
    TokenDescriptor { path: "business.phone", label: "Business Phone", group: "business" },
    TokenDescriptor { path: "business.email", label: "Business Email", group: "business" },
    TokenDescriptor { path: "invoice.number", label: "Invoice Number", group: "invoice" },
    TokenDescriptor { path: "invoice.date", label: "Invoice Date", group: "invoice" },
    TokenDescriptor { path: "invoice.dueDate", label: "Due Date", group: "invoice" },
    TokenDescriptor { path: "invoice.status", label: "Status", group: "invoice" },
    TokenDescriptor { path: "invoice.notes", label: "Notes", group: "invoice" },
    TokenDescriptor { path: "client.name", label: "Client Name", group: "client" },
    TokenDescriptor { path: "client.address", label: "Client Address", group: "client" },
    TokenDescriptor { path: "client.gstin", label: "Client GSTIN", group: "client" },
    TokenDescriptor { path: "client.phone", label: "Client Phone", group: "client" },
    TokenDescriptor { path: "client.email", label: "Client Email", group: "client" },
    TokenDescriptor { path: "totals.subtotal", label: "Subtotal", group: "totals" },
    TokenDescriptor { path: "totals.gstAmount", label: "GST Amount", group: "totals" },
    TokenDescriptor { path: "totals.roundOff", label: "Round Off", group: "totals" },
    TokenDescriptor { path: "totals.total", label: "Total", group: "totals" },
];

/// Spoken form of the payable total; separate because it is derived, not
/// listed in the palette alongside the numeric totals.
pub const TOTAL_IN_WORDS: TokenDescriptor = TokenDescriptor {
    path: "totals.totalInWords",
    label: "Total in Words",
    group: "totals",
};

/// The catalog shown in the designer palette.
pub fn catalog() -> &'static [TokenDescriptor] {
    &TOKENS
}

/// Project an invoice into the flat token map a renderer consumes.
///
/// Totals are always recomputed from the line items; the invoice's stored
/// totals are ignored. Dates render day-first. Missing optional values
/// render as empty strings so every catalog path is present in the map.
pub fn project(invoice: &Invoice, business: &BusinessConfig) -> BTreeMap<String, String> {
    let totals = money::compute_totals(&invoice.items);
    let payable = totals.payable();

    let mut map = BTreeMap::new();

    map.insert("business.name".to_string(), business.name.clone());
    map.insert("business.gstin".to_string(), business.gstin.clone());
    map.insert("business.address".to_string(), business.address.clone());
    map.insert("business.phone".to_string(), business.phone.clone());
    map.insert("business.email".to_string(), business.email.clone());

    map.insert("invoice.number".to_string(), invoice.invoice_number.clone());
    map.insert(
        "invoice.date".to_string(),
        invoice.invoice_date.format("%d/%m/%Y").to_string(),
    );
    map.insert(
        "invoice.dueDate".to_string(),
        invoice
            .due_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
    );
    map.insert("invoice.status".to_string(), invoice.status.to_string());
    map.insert(
        "invoice.notes".to_string(),
        invoice.notes.clone().unwrap_or_default(),
    );

    map.insert("client.name".to_string(), invoice.client.name.clone());
    map.insert("client.address".to_string(), invoice.client.address.clone());
    map.insert(
        "client.gstin".to_string(),
        invoice.client.gstin.clone().unwrap_or_default(),
    );
    map.insert("client.phone".to_string(), invoice.client.phone.clone());
    map.insert("client.email".to_string(), invoice.client.email.clone());

    map.insert(
        "totals.subtotal".to_string(),
        money::format_inr(totals.subtotal),
    );
    map.insert(
        "totals.gstAmount".to_string(),
        money::format_inr(totals.gst_amount),
    );
    map.insert(
        "totals.roundOff".to_string(),
        money::format_inr(totals.round_off),
    );
    map.insert("totals.total".to_string(), money::format_inr(payable));
    map.insert(
        TOTAL_IN_WORDS.path.to_string(),
        words::amount_in_words(payable).unwrap_or_default(),
    );

    map
}
