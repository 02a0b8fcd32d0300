//! Amounts in words on the Indian scale: thousand, lakh, crore.
//!
//! `1234.50` becomes `One Thousand Two Hundred and Thirty Four Rupees and
//! Fifty Paise`. Zero is spelt out as `Zero Rupees` rather than returned
//! empty.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::WordsError;
use crate::money;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// Spell an amount in words with `Rupees` and `Paise` suffixes.
///
/// The amount is rounded to paise first, so `1234.505` is spelt as
/// `1234.51`. Negative amounts are an error; callers spell the absolute
/// value and add their own sign wording if they need it.
pub fn amount_in_words(amount: Decimal) -> Result<String, WordsError> {
    if amount < Decimal::ZERO {
        return Err(WordsError::NegativeAmount(amount));
    }

    let rounded = money::round_money(amount);
    let rupees = rounded
        .trunc()
        .to_u64()
        .ok_or(WordsError::AmountTooLarge(amount))?;
    let paise = (rounded.fract() * Decimal::ONE_HUNDRED)
        .to_u64()
        .unwrap_or(0);

    let mut out = if rupees == 0 {
        "Zero Rupees".to_string()
    } else {
        format!("{} Rupees", spell(rupees))
    };

    if paise > 0 {
        out.push_str(" and ");
        out.push_str(&spell(paise));
        out.push_str(" Paise");
    }

    Ok(out)
}

/// Spell a positive integer. `and` joins a hundreds digit to its
/// remainder and appears nowhere else.
fn spell(n: u64) -> String {
    match n {
        0 => String::new(),
        1..=19 => ONES[n as usize].to_string(),
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                ones => format!("{} {}", tens, ONES[ones as usize]),
            }
        }
        100..=999 => {
            let head = format!("{} Hundred", ONES[(n / 100) as usize]);
            match n % 100 {
                0 => head,
                rem => format!("{} and {}", head, spell(rem)),
            }
        }
        1_000..=99_999 => scale(n, 1_000, "Thousand"),
        LAKH..=9_999_999 => scale(n, LAKH, "Lakh"),
        // Counts of crore reuse the full scale, so 10^12 reads
        // "One Lakh Crore".
        _ => scale(n, CRORE, "Crore"),
    }
}

fn scale(n: u64, unit: u64, name: &str) -> String {
    let head = spell(n / unit);
    match n % unit {
        0 => format!("{} {}", head, name),
        rem => format!("{} {} {}", head, name, spell(rem)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn words(raw: &str) -> String {
        amount_in_words(Decimal::from_str(raw).unwrap()).unwrap()
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(words("1"), "One Rupees");
        assert_eq!(words("14"), "Fourteen Rupees");
        assert_eq!(words("40"), "Forty Rupees");
        assert_eq!(words("99"), "Ninety Nine Rupees");
    }

    #[test]
    fn test_hundreds_use_and() {
        assert_eq!(words("100"), "One Hundred Rupees");
        assert_eq!(words("101"), "One Hundred and One Rupees");
        assert_eq!(words("999"), "Nine Hundred and Ninety Nine Rupees");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(words("1000"), "One Thousand Rupees");
        assert_eq!(words("1034"), "One Thousand Thirty Four Rupees");
        assert_eq!(
            words("1234"),
            "One Thousand Two Hundred and Thirty Four Rupees"
        );
        assert_eq!(words("99999"), "Ninety Nine Thousand Nine Hundred and Ninety Nine Rupees");
    }

    #[test]
    fn test_lakh_and_crore() {
        assert_eq!(words("100000"), "One Lakh Rupees");
        assert_eq!(words("150000"), "One Lakh Fifty Thousand Rupees");
        assert_eq!(words("10000000"), "One Crore Rupees");
        assert_eq!(
            words("25000000"),
            "Two Crore Fifty Lakh Rupees"
        );
        assert_eq!(words("1000000000"), "One Hundred Crore Rupees");
    }

    #[test]
    fn test_beyond_crore_reuses_the_scale() {
        assert_eq!(words("1000000000000"), "One Lakh Crore Rupees");
    }

    #[test]
    fn test_paise_suffix() {
        assert_eq!(
            words("1234.50"),
            "One Thousand Two Hundred and Thirty Four Rupees and Fifty Paise"
        );
        assert_eq!(words("0.05"), "Zero Rupees and Five Paise");
        assert_eq!(words("1.01"), "One Rupees and One Paise");
    }

    #[test]
    fn test_zero_is_spelt_out() {
        assert_eq!(words("0"), "Zero Rupees");
        assert_eq!(words("0.00"), "Zero Rupees");
    }

    #[test]
    fn test_rounds_to_paise_before_spelling() {
        assert_eq!(words("0.004"), "Zero Rupees");
        assert_eq!(words("0.005"), "Zero Rupees and One Paise");
        assert_eq!(
            words("99.999"),
            "One Hundred Rupees"
        );
    }

    #[test]
    fn test_negative_is_an_error() {
        let err = amount_in_words(Decimal::from(-5)).unwrap_err();
        assert!(matches!(err, WordsError::NegativeAmount(_)));
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let err = amount_in_words(Decimal::MAX).unwrap_err();
        assert!(matches!(err, WordsError::AmountTooLarge(_)));
    }
}
