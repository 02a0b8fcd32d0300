//! WASM bindings for GST invoicing.
//!
//! This crate provides WebAssembly bindings for use in browsers.

use wasm_bindgen::prelude::*;

use beejak_core::InvoiceForm;
use beejak_core::models::client::Client;
use beejak_core::models::config::{BeejakConfig, BusinessConfig};
use beejak_core::models::invoice::{Invoice, LineItem};
use beejak_core::models::template::{TemplateComponent, TemplateLayout, ThemeColors};
use beejak_core::models::tokens;
use beejak_core::session::{Session, TokenStore, UserProfile};
use beejak_core::{money, words};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Spell an amount in words: 1234.5 becomes
/// "One Thousand Two Hundred and Thirty Four Rupees and Fifty Paise".
#[wasm_bindgen]
pub fn amount_in_words(amount: f64) -> Result<String, JsValue> {
    words::amount_in_words(money::to_decimal(amount))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format an amount with Indian digit grouping (12,34,567.89).
#[wasm_bindgen]
pub fn format_amount(amount: f64) -> String {
    money::format_inr(money::to_decimal(amount))
}

/// Parse an Indian-formatted amount (e.g., "1,23,456.78").
#[wasm_bindgen]
pub fn parse_amount(text: &str) -> Option<f64> {
    money::parse_inr(text).map(money::to_f64)
}

/// Compute invoice totals for an array of line items.
#[wasm_bindgen]
pub fn compute_totals(items: JsValue) -> Result<JsValue, JsValue> {
    let items: Vec<LineItem> =
        serde_wasm_bindgen::from_value(items).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let totals = money::compute_totals(&items);
    serde_wasm_bindgen::to_value(&totals).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Check a template layout; resolves to nothing when valid, throws the
/// first problem otherwise.
#[wasm_bindgen]
pub fn validate_layout(layout: JsValue) -> Result<(), JsValue> {
    let layout: TemplateLayout =
        serde_wasm_bindgen::from_value(layout).map_err(|e| JsValue::from_str(&e.to_string()))?;

    layout
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The layout a fresh template starts from.
#[wasm_bindgen]
pub fn default_layout() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&TemplateLayout::starter())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The catalog of token paths the designer palette offers.
#[wasm_bindgen]
pub fn token_catalog() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(tokens::catalog())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Project an invoice and business details into the flat token map a
/// renderer consumes. Returns a plain object keyed by token path.
#[wasm_bindgen]
pub fn project_tokens(invoice: JsValue, business: JsValue) -> Result<JsValue, JsValue> {
    let invoice: Invoice =
        serde_wasm_bindgen::from_value(invoice).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let business: BusinessConfig =
        serde_wasm_bindgen::from_value(business).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let map = tokens::project(&invoice, &business);
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    map.serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Aggregate counts and revenue figures over a list of invoices.
#[wasm_bindgen]
pub fn dashboard_stats(invoices: JsValue) -> Result<JsValue, JsValue> {
    let invoices: Vec<Invoice> =
        serde_wasm_bindgen::from_value(invoices).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let stats = beejak_core::dashboard::summarize(&invoices);
    serde_wasm_bindgen::to_value(&stats).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// An invoice draft for browser forms. Totals are recomputed on every
/// mutation; line amounts always equal quantity times rate.
#[wasm_bindgen]
pub struct InvoiceDraft {
    form: InvoiceForm,
}

#[wasm_bindgen]
impl InvoiceDraft {
    /// Start an empty draft dated `invoice_date` (YYYY-MM-DD).
    #[wasm_bindgen(constructor)]
    pub fn new(invoice_date: &str) -> Result<InvoiceDraft, JsValue> {
        let date = NaiveDate::parse_from_str(invoice_date, "%Y-%m-%d")
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let client = Client {
            id: Uuid::nil(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            gstin: None,
        };

        Ok(Self {
            form: InvoiceForm::new(client, date, &BeejakConfig::default()),
        })
    }

    /// Resume a draft from invoice JSON, discarding its stored totals.
    #[wasm_bindgen]
    pub fn from_json(json: &str) -> Result<InvoiceDraft, JsValue> {
        let invoice: Invoice =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            form: InvoiceForm::from_invoice(invoice),
        })
    }

    #[wasm_bindgen]
    pub fn set_client(&mut self, client: JsValue) -> Result<(), JsValue> {
        let client: Client = serde_wasm_bindgen::from_value(client)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.form.set_client(client);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_invoice_number(&mut self, number: &str) {
        self.form.set_invoice_number(number);
    }

    /// Set invoice and due dates (YYYY-MM-DD; empty due date clears it).
    #[wasm_bindgen]
    pub fn set_dates(&mut self, invoice_date: &str, due_date: Option<String>) -> Result<(), JsValue> {
        let date = NaiveDate::parse_from_str(invoice_date, "%Y-%m-%d")
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let due = match due_date.as_deref() {
            Some("") | None => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|e| JsValue::from_str(&e.to_string()))?,
            ),
        };

        self.form.set_dates(date, due);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_notes(&mut self, notes: Option<String>) {
        self.form.set_notes(notes.filter(|n| !n.is_empty()));
    }

    /// Append a line item and return its index.
    #[wasm_bindgen]
    pub fn add_item(
        &mut self,
        description: &str,
        hsn_code: &str,
        quantity: f64,
        rate: f64,
        gst_rate: f64,
    ) -> usize {
        self.form.add_item(
            description,
            hsn_code,
            money::to_decimal(quantity),
            money::to_decimal(rate),
            money::to_decimal(gst_rate),
        )
    }

    /// Replace a line's quantity, rate, and GST rate; the amount is
    /// re-derived.
    #[wasm_bindgen]
    pub fn update_item(
        &mut self,
        index: usize,
        quantity: f64,
        rate: f64,
        gst_rate: f64,
    ) -> Result<(), JsValue> {
        self.form
            .update_item(index, |item| {
                item.quantity = money::to_decimal(quantity);
                item.rate = money::to_decimal(rate);
                item.gst_rate = money::to_decimal(gst_rate);
            })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn remove_item(&mut self, index: usize) -> Result<(), JsValue> {
        self.form
            .remove_item(index)
            .map(|_| ())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn item_count(&self) -> usize {
        self.form.invoice().items.len()
    }

    #[wasm_bindgen]
    pub fn subtotal(&self) -> f64 {
        money::to_f64(self.form.totals().subtotal)
    }

    #[wasm_bindgen]
    pub fn gst_amount(&self) -> f64 {
        money::to_f64(self.form.totals().gst_amount)
    }

    #[wasm_bindgen]
    pub fn round_off(&self) -> f64 {
        money::to_f64(self.form.totals().round_off)
    }

    /// The whole-rupee amount payable.
    #[wasm_bindgen]
    pub fn payable(&self) -> f64 {
        money::to_f64(self.form.totals().payable())
    }

    /// Current totals as an object.
    #[wasm_bindgen]
    pub fn totals(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.form.totals())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The payable total in words.
    #[wasm_bindgen]
    pub fn total_in_words(&self) -> Result<String, JsValue> {
        words::amount_in_words(self.form.totals().payable())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Consistency issues in the draft; an empty array means clean.
    #[wasm_bindgen]
    pub fn validate(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.form.validate())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Serialize the draft with current totals stamped in.
    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, JsValue> {
        let invoice = self.form.clone().into_invoice();
        serde_json::to_string_pretty(&invoice).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Template layout editor for the designer UI.
#[wasm_bindgen]
pub struct TemplateEditor {
    layout: TemplateLayout,
}

#[wasm_bindgen]
impl TemplateEditor {
    /// Open the editor on the starter layout.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            layout: TemplateLayout::starter(),
        }
    }

    /// Open the editor on an existing layout, re-validating it.
    #[wasm_bindgen]
    pub fn from_layout(layout: JsValue) -> Result<TemplateEditor, JsValue> {
        let layout: TemplateLayout = serde_wasm_bindgen::from_value(layout)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        layout
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { layout })
    }

    #[wasm_bindgen]
    pub fn insert(&mut self, component: JsValue) -> Result<(), JsValue> {
        let component: TemplateComponent = serde_wasm_bindgen::from_value(component)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.layout
            .insert(component)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn update(&mut self, component: JsValue) -> Result<(), JsValue> {
        let component: TemplateComponent = serde_wasm_bindgen::from_value(component)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.layout
            .update(component)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Remove a component and return it.
    #[wasm_bindgen]
    pub fn remove(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let removed = self
            .layout
            .remove(id)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&removed).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Move a component to a new z-position.
    #[wasm_bindgen]
    pub fn move_component(&mut self, id: &str, to: usize) -> Result<(), JsValue> {
        self.layout
            .move_component(id, to)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Look up a component by id; resolves to undefined when absent.
    #[wasm_bindgen]
    pub fn component(&self, id: &str) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.layout.component(id))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Component ids in z-order.
    #[wasm_bindgen]
    pub fn component_ids(&self) -> js_sys::Array {
        self.layout
            .components
            .iter()
            .map(|c| JsValue::from_str(&c.id))
            .collect()
    }

    #[wasm_bindgen]
    pub fn set_theme(&mut self, theme: JsValue) -> Result<(), JsValue> {
        let theme: ThemeColors = serde_wasm_bindgen::from_value(theme)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.layout.theme = theme;
        Ok(())
    }

    /// The full layout as an object.
    #[wasm_bindgen]
    pub fn layout(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.layout)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The full layout as JSON, for saving.
    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(&self.layout)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn validate(&self) -> Result<(), JsValue> {
        self.layout
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for TemplateEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Token store backed by the browser's localStorage.
struct BrowserTokenStore {
    storage: web_sys::Storage,
}

impl TokenStore for BrowserTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, beejak_core::SessionError> {
        self.storage
            .get_item(key)
            .map_err(|_| beejak_core::SessionError::Storage("localStorage get failed".to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), beejak_core::SessionError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| beejak_core::SessionError::Storage("localStorage set failed".to_string()))
    }

    fn remove(&mut self, key: &str) -> Result<(), beejak_core::SessionError> {
        self.storage
            .remove_item(key)
            .map_err(|_| beejak_core::SessionError::Storage("localStorage remove failed".to_string()))
    }
}

/// Session state persisted in localStorage.
#[wasm_bindgen]
pub struct SessionHandle {
    session: Session<BrowserTokenStore>,
}

#[wasm_bindgen]
impl SessionHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<SessionHandle, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window object"))?;
        let storage = window
            .local_storage()
            .map_err(|_| JsValue::from_str("localStorage unavailable"))?
            .ok_or_else(|| JsValue::from_str("localStorage unavailable"))?;

        Ok(Self {
            session: Session::new(BrowserTokenStore { storage }),
        })
    }

    /// Store a fresh login (token plus user object).
    #[wasm_bindgen]
    pub fn login(&mut self, token: &str, user: JsValue) -> Result<(), JsValue> {
        let user: UserProfile = serde_wasm_bindgen::from_value(user)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.session
            .login(token, &user)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn logout(&mut self) -> Result<(), JsValue> {
        self.session
            .clear()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn token(&self) -> Result<Option<String>, JsValue> {
        self.session
            .token()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The signed-in user; resolves to undefined when logged out.
    #[wasm_bindgen]
    pub fn user(&self) -> Result<JsValue, JsValue> {
        let user = self
            .session
            .user()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&user).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn is_authenticated(&self) -> Result<bool, JsValue> {
        self.session
            .is_authenticated()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Whether the stored token has expired, judged against the browser
    /// clock.
    #[wasm_bindgen]
    pub fn is_expired(&self) -> Result<bool, JsValue> {
        let now = (js_sys::Date::now() / 1000.0) as i64;
        self.session
            .is_expired(now)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_amount_in_words() {
        assert_eq!(
            amount_in_words(1234.50).unwrap(),
            "One Thousand Two Hundred and Thirty Four Rupees and Fifty Paise"
        );
        assert_eq!(amount_in_words(0.0).unwrap(), "Zero Rupees");
        assert!(amount_in_words(-1.0).is_err());
    }

    #[wasm_bindgen_test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234567.89), "12,34,567.89");
        assert_eq!(format_amount(100000.0), "1,00,000.00");
    }

    #[wasm_bindgen_test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,23,456.78"), Some(123456.78));
        assert_eq!(parse_amount("12,345,678"), None);
    }

    #[wasm_bindgen_test]
    fn test_draft_totals_flow() {
        let mut draft = InvoiceDraft::new("2025-04-01").unwrap();
        draft.add_item("Widget", "8471", 2.0, 1500.0, 18.0);

        assert_eq!(draft.item_count(), 1);
        assert_eq!(draft.subtotal(), 3000.0);
        assert_eq!(draft.gst_amount(), 540.0);
        assert_eq!(draft.payable(), 3540.0);

        draft.update_item(0, 3.0, 1500.0, 18.0).unwrap();
        assert_eq!(draft.subtotal(), 4500.0);

        assert!(draft.update_item(5, 1.0, 1.0, 0.0).is_err());
    }

    #[wasm_bindgen_test]
    fn test_template_editor_rejects_duplicates() {
        let mut editor = TemplateEditor::new();
        let duplicate = serde_wasm_bindgen::to_value(&TemplateComponent::new(
            "header",
            beejak_core::ComponentType::Header,
            5.0,
            2.0,
            90.0,
            8.0,
        ))
        .unwrap();

        assert!(editor.insert(duplicate).is_err());
        assert_eq!(editor.component_ids().length(), 6);
    }

    #[wasm_bindgen_test]
    fn test_dashboard_stats() {
        use beejak_core::InvoiceStatus;
        use beejak_core::dashboard::DashboardStats;

        let paid = Invoice {
            id: None,
            invoice_number: "INV-1".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            due_date: None,
            status: InvoiceStatus::Paid,
            client: Client {
                id: Uuid::nil(),
                name: "Client".to_string(),
                email: String::new(),
                phone: String::new(),
                address: String::new(),
                gstin: None,
            },
            items: vec![LineItem::new(
                "Service",
                "9983",
                money::to_decimal(1.0),
                money::to_decimal(1000.0),
                money::to_decimal(18.0),
            )],
            notes: None,
            totals: None,
        };
        let mut draft = paid.clone();
        draft.invoice_number = "INV-2".to_string();
        draft.status = InvoiceStatus::Draft;

        let value = serde_wasm_bindgen::to_value(&vec![paid, draft]).unwrap();
        let stats: DashboardStats =
            serde_wasm_bindgen::from_value(dashboard_stats(value).unwrap()).unwrap();

        assert_eq!(stats.invoice_count, 2);
        assert_eq!(stats.paid_count, 1);
        assert_eq!(stats.draft_count, 1);
        assert_eq!(stats.total_collected, money::to_decimal(1180.0));
        assert_eq!(stats.total_outstanding, money::to_decimal(0.0));
    }

    #[wasm_bindgen_test]
    fn test_session_roundtrip_in_browser() {
        let mut session = SessionHandle::new().unwrap();
        session.logout().unwrap();
        assert!(!session.is_authenticated().unwrap());

        // payload is {"exp": 33_000_000_000}, far in the future
        let token = "h.eyJleHAiOjMzMDAwMDAwMDAwfQ.s";
        let user = serde_wasm_bindgen::to_value(&UserProfile {
            id: Uuid::nil(),
            name: "Asha Patel".to_string(),
            email: "asha@beejak.example".to_string(),
        })
        .unwrap();

        session.login(token, user).unwrap();
        assert!(session.is_authenticated().unwrap());
        assert!(!session.is_expired().unwrap());

        session.logout().unwrap();
        assert!(!session.is_authenticated().unwrap());
    }
}
