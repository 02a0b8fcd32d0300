//! Core library for GST invoicing.
//!
//! This crate provides:
//! - Invoice totals with GST and whole-rupee round-off
//! - Amounts in words on the Indian scale (thousand, lakh, crore)
//! - Indian-format amount display and parsing
//! - Invoice template layouts with validated components
//! - Invoice form state that keeps totals current while editing
//! - Session handling over an injected token store

pub mod dashboard;
pub mod error;
pub mod form;
pub mod models;
pub mod money;
pub mod session;
pub mod words;

pub use error::{BeejakError, FormError, Result, SessionError, TemplateError, WordsError};
pub use form::InvoiceForm;
pub use models::client::{Client, ClientCreate, ClientUpdate};
pub use models::config::BeejakConfig;
pub use models::invoice::{Invoice, InvoiceStatus, InvoiceTotals, LineItem};
pub use models::template::{
    ComponentType, InvoiceTemplate, ItemColumn, TemplateComponent, TemplateLayout,
};
pub use models::tokens::TokenDescriptor;
pub use session::{MemoryTokenStore, Session, TokenStore, UserProfile};
pub use words::amount_in_words;
