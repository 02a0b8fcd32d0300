//! Invoice money arithmetic: GST totals, round-off, and Indian-format
//! amounts.
//!
//! All aggregates round half away from zero, the convention printed GST
//! invoices follow. The round-off line adjusts the grand total to a whole
//! rupee.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::{debug, error};

use crate::models::invoice::{InvoiceTotals, LineItem};

/// Paise precision used for every stored amount.
pub const DECIMAL_PLACES: u32 = 2;

/// One paisa; comparisons within this are considered equal.
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

lazy_static! {
    /// Amount with optional Indian-style grouping: `1,23,456.78`.
    pub static ref INR_AMOUNT: Regex =
        Regex::new(r"^-?(?:\d{1,2}(?:,\d{2})*,\d{3}|\d+)(?:\.\d+)?$").unwrap();
}

/// Round to paise, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// GST share of a single line, unrounded.
pub fn gst_share(item: &LineItem) -> Decimal {
    item.amount * item.gst_rate / Decimal::ONE_HUNDRED
}

/// Sum of line amounts; an empty list sums to zero.
pub fn subtotal(items: &[LineItem]) -> Decimal {
    items.iter().map(|i| i.amount).sum()
}

/// Sum of per-line GST shares, unrounded. Rounding happens at the
/// display step.
pub fn gst_amount(items: &[LineItem]) -> Decimal {
    items.iter().map(gst_share).sum()
}

/// Grand total, accumulated per line rather than derived from
/// `subtotal` plus `gst_amount`.
pub fn total_amount(items: &[LineItem]) -> Decimal {
    items.iter().map(|i| i.amount + gst_share(i)).sum()
}

/// The adjustment that brings `total` to a whole rupee.
///
/// Half-rupee fractions round away from zero, so `117.50` gets `+0.50`
/// and `-117.50` gets `-0.50`.
pub fn round_off(total: Decimal) -> Decimal {
    total.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) - total
}

/// Compute all invoice totals from the line items in one pass.
///
/// The grand total is its own accumulation of `amount + gst` per line,
/// not the sum of the already-rounded subtotal and GST figures.
pub fn compute_totals(items: &[LineItem]) -> InvoiceTotals {
    let mut subtotal = Decimal::ZERO;
    let mut gst_amount = Decimal::ZERO;
    let mut total = Decimal::ZERO;

    for item in items {
        let gst = gst_share(item);
        subtotal += item.amount;
        gst_amount += gst;
        total += item.amount + gst;
    }

    let subtotal = round_money(subtotal);
    let gst_amount = round_money(gst_amount);
    let total = round_money(total);
    let round_off = round_off(total);

    debug!(
        "Computed totals for {} items: subtotal={} gst={} total={} round_off={}",
        items.len(),
        subtotal,
        gst_amount,
        total,
        round_off
    );

    InvoiceTotals {
        subtotal,
        gst_amount,
        total,
        round_off,
    }
}

/// Lossy conversion for the JS boundary, rounded to paise first.
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or(0.0)
}

/// Convert a float from the JS boundary into a paise-precision amount.
///
/// Non-representable values (NaN, infinities) become zero.
pub fn to_decimal(value: f64) -> Decimal {
    match Decimal::from_f64_retain(value) {
        Some(decimal) => round_money(decimal),
        None => {
            error!("Cannot represent {} as a decimal amount, using zero", value);
            Decimal::ZERO
        }
    }
}

/// Format an amount with Indian digit grouping and exactly two decimals:
/// `1234567.891` becomes `12,34,567.89`.
pub fn format_inr(value: Decimal) -> String {
    let rounded = round_money(value);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text.as_str(), "00"),
    };

    let grouped = group_indian(int_part);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}.{}", grouped, frac_part)
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}

/// Insert commas Indian style: last group of three, then groups of two.
fn group_indian(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 2);
    for (i, ch) in digits.chars().enumerate() {
        let remaining = len - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse an amount in Indian format, with or without grouping and an
/// optional rupee sign. Returns `None` when the text is not an amount or
/// the commas sit in the wrong places.
pub fn parse_inr(text: &str) -> Option<Decimal> {
    let trimmed = text
        .trim()
        .trim_start_matches('₹')
        .trim_start_matches("Rs.")
        .trim_start_matches("Rs")
        .trim();

    if !INR_AMOUNT.is_match(trimmed) {
        return None;
    }

    let plain: String = trimmed.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&plain).ok().map(round_money)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(amount: &str, gst_rate: &str) -> LineItem {
        LineItem {
            description: "item".to_string(),
            hsn_code: String::new(),
            quantity: Decimal::ONE,
            rate: Decimal::from_str(amount).unwrap(),
            gst_rate: Decimal::from_str(gst_rate).unwrap(),
            amount: Decimal::from_str(amount).unwrap(),
        }
    }

    #[test]
    fn test_compute_totals_basic() {
        let items = vec![item("1000", "18"), item("500", "12")];
        let totals = compute_totals(&items);

        assert_eq!(totals.subtotal, Decimal::from(1500));
        assert_eq!(totals.gst_amount, Decimal::from(240));
        assert_eq!(totals.total, Decimal::from(1740));
        assert_eq!(totals.round_off, Decimal::ZERO);
        assert_eq!(totals.payable(), Decimal::from(1740));
    }

    #[test]
    fn test_compute_totals_empty() {
        let totals = compute_totals(&[]);
        assert_eq!(totals, InvoiceTotals::default());
    }

    #[test]
    fn test_sums_over_empty_list() {
        assert_eq!(subtotal(&[]), Decimal::ZERO);
        assert_eq!(gst_amount(&[]), Decimal::ZERO);
        assert_eq!(total_amount(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_gst_amount_zero_rates() {
        let items = vec![item("1000", "0"), item("250.50", "0")];
        assert_eq!(gst_amount(&items), Decimal::ZERO);
        assert_eq!(total_amount(&items), subtotal(&items));
    }

    #[test]
    fn test_total_grows_with_any_amount() {
        let mut items = vec![item("1000", "18"), item("500", "12")];
        let before = total_amount(&items);

        items[1].amount += Decimal::ONE;
        assert!(total_amount(&items) > before);
    }

    #[test]
    fn test_round_off_to_whole_rupee() {
        let items = vec![item("99.99", "18")];
        let totals = compute_totals(&items);

        // 99.99 + 17.9982 = 117.9882, rounds to 117.99
        assert_eq!(totals.total, Decimal::from_str("117.99").unwrap());
        assert_eq!(totals.round_off, Decimal::from_str("0.01").unwrap());
        assert_eq!(totals.payable(), Decimal::from(118));
    }

    #[test]
    fn test_round_off_half_goes_up() {
        let items = vec![item("100.50", "0")];
        let totals = compute_totals(&items);

        assert_eq!(totals.round_off, Decimal::from_str("0.50").unwrap());
        assert_eq!(totals.payable(), Decimal::from(101));
    }

    #[test]
    fn test_round_off_downward() {
        let items = vec![item("100.25", "0")];
        let totals = compute_totals(&items);

        assert_eq!(totals.round_off, Decimal::from_str("-0.25").unwrap());
        assert_eq!(totals.payable(), Decimal::from(100));
    }

    #[test]
    fn test_total_accumulates_independently() {
        let items = vec![
            item("33.33", "18"),
            item("66.67", "12"),
            item("10.01", "5"),
        ];
        let totals = compute_totals(&items);

        let expected: Decimal = items
            .iter()
            .map(|i| i.amount + i.amount * i.gst_rate / Decimal::ONE_HUNDRED)
            .sum();
        assert_eq!(totals.total, round_money(expected));
    }

    #[test]
    fn test_format_inr_grouping() {
        assert_eq!(format_inr(Decimal::from_str("1234567.891").unwrap()), "12,34,567.89");
        assert_eq!(format_inr(Decimal::from(100)), "100.00");
        assert_eq!(format_inr(Decimal::from(1000)), "1,000.00");
        assert_eq!(format_inr(Decimal::from(100000)), "1,00,000.00");
        assert_eq!(format_inr(Decimal::from(10000000)), "1,00,00,000.00");
        assert_eq!(format_inr(Decimal::ZERO), "0.00");
        assert_eq!(format_inr(Decimal::from_str("-1234.5").unwrap()), "-1,234.50");
    }

    #[test]
    fn test_parse_inr() {
        assert_eq!(
            parse_inr("1,23,456.78"),
            Some(Decimal::from_str("123456.78").unwrap())
        );
        assert_eq!(parse_inr("₹ 1,23,456.78"), Some(Decimal::from_str("123456.78").unwrap()));
        assert_eq!(parse_inr("Rs. 500"), Some(Decimal::from(500)));
        assert_eq!(parse_inr("1234.5"), Some(Decimal::from_str("1234.50").unwrap()));
        assert_eq!(parse_inr("-2,500"), Some(Decimal::from(-2500)));
        assert_eq!(parse_inr("12,345,678"), None);
        assert_eq!(parse_inr("1,2345"), None);
        assert_eq!(parse_inr("total"), None);
        assert_eq!(parse_inr(""), None);
    }

    #[test]
    fn test_format_parse_roundtrip() {
        for raw in ["0", "5", "999", "1000", "99999.99", "123456.78", "10000000"] {
            let value = Decimal::from_str(raw).unwrap();
            assert_eq!(parse_inr(&format_inr(value)), Some(round_money(value)));
        }
    }

    #[test]
    fn test_to_decimal_handles_bad_floats() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
        assert_eq!(to_decimal(1234.56), Decimal::from_str("1234.56").unwrap());
    }

    #[test]
    fn test_to_f64_rounds_to_paise() {
        assert_eq!(to_f64(Decimal::from_str("117.9882").unwrap()), 117.99);
    }
}
