//! Field rules of the estimate form.
//!
//! Each field check reports one of three states. Only [`FieldCheck::Invalid`]
//! blocks submission; a flagged price is shown but accepted.

use super::vehicle::parse_decimal;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::num::IntErrorKind;

/// Prices above this are flagged as implausible
pub const PRICE_WARNING_THRESHOLD: Decimal = dec!(1000000);
/// Highest CO2 value accepted on submission
pub const MAX_CO2: u32 = 500;

pub const PRICE_INVALID: &str = "Please enter a valid price greater than £0";
pub const PRICE_HIGH: &str = "Price seems unusually high. Please verify.";
pub const CO2_INVALID: &str = "Please enter valid CO2 emissions";
pub const CO2_HIGH: &str = "CO2 emissions seem unusually high. Please verify.";

/// Messages listed when the form gate fails
pub const FORM_ERRORS: [&str; 2] = [
    "Ensure UK price is greater than £0",
    "Ensure CO2 emissions are between 1 and 500 g/km",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum FieldCheck {
    Valid,
    /// Accepted, but worth a second look
    Flagged(&'static str),
    Invalid(&'static str),
}

impl FieldCheck {
    pub fn blocks_submission(&self) -> bool {
        matches!(self, FieldCheck::Invalid(_))
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            FieldCheck::Valid => None,
            FieldCheck::Flagged(msg) | FieldCheck::Invalid(msg) => Some(msg),
        }
    }
}

pub fn check_uk_price(text: &str) -> FieldCheck {
    match parse_decimal(text) {
        Some(price) => check_price_value(price),
        None => FieldCheck::Invalid(PRICE_INVALID),
    }
}

/// Price rule for an already parsed amount
pub fn check_price_value(price: Decimal) -> FieldCheck {
    if price <= Decimal::ZERO {
        FieldCheck::Invalid(PRICE_INVALID)
    } else if price > PRICE_WARNING_THRESHOLD {
        FieldCheck::Flagged(PRICE_HIGH)
    } else {
        FieldCheck::Valid
    }
}

pub fn check_co2_emissions(text: &str) -> FieldCheck {
    match parse_co2_value(text) {
        Some(co2) => check_co2_value(co2),
        None => FieldCheck::Invalid(CO2_INVALID),
    }
}

/// CO2 rule for an already parsed whole number
pub fn check_co2_value(co2: i64) -> FieldCheck {
    if co2 <= 0 {
        FieldCheck::Invalid(CO2_INVALID)
    } else if co2 > i64::from(MAX_CO2) {
        FieldCheck::Invalid(CO2_HIGH)
    } else {
        FieldCheck::Valid
    }
}

/// Submission gate: a positive price and whole CO2 in 1..=500.
pub fn validate_form(uk_price: &str, co2_emissions: &str) -> bool {
    let price_ok = parse_decimal(uk_price).is_some_and(|p| p > Decimal::ZERO);
    let co2_ok = parse_co2_value(co2_emissions).is_some_and(|c| c > 0 && c <= i64::from(MAX_CO2));
    price_ok && co2_ok
}

fn parse_co2_value(text: &str) -> Option<i64> {
    match text.trim().parse::<i64>() {
        Ok(co2) => Some(co2),
        // still a whole number, just far too high
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(i64::MAX),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_checks() {
        assert_eq!(check_uk_price("20000"), FieldCheck::Valid);
        assert_eq!(check_uk_price("1000000"), FieldCheck::Valid);
        assert_eq!(check_uk_price("1000000.01"), FieldCheck::Flagged(PRICE_HIGH));
        assert_eq!(check_uk_price("0"), FieldCheck::Invalid(PRICE_INVALID));
        assert_eq!(check_uk_price("-5"), FieldCheck::Invalid(PRICE_INVALID));
        assert_eq!(check_uk_price("twenty"), FieldCheck::Invalid(PRICE_INVALID));
        assert_eq!(check_uk_price(""), FieldCheck::Invalid(PRICE_INVALID));
    }

    #[test]
    fn co2_checks() {
        assert_eq!(check_co2_emissions("1"), FieldCheck::Valid);
        assert_eq!(check_co2_emissions("500"), FieldCheck::Valid);
        assert_eq!(check_co2_emissions("501"), FieldCheck::Invalid(CO2_HIGH));
        assert_eq!(check_co2_emissions("0"), FieldCheck::Invalid(CO2_INVALID));
        assert_eq!(check_co2_emissions("-10"), FieldCheck::Invalid(CO2_INVALID));
        assert_eq!(check_co2_emissions("12.5"), FieldCheck::Invalid(CO2_INVALID));
    }

    #[test]
    fn overflowing_co2_is_too_high() {
        assert_eq!(
            check_co2_emissions("99999999999999999999"),
            FieldCheck::Invalid(CO2_HIGH)
        );
        assert_eq!(
            check_co2_emissions("-99999999999999999999"),
            FieldCheck::Invalid(CO2_INVALID)
        );
        assert!(!validate_form("20000", "99999999999999999999"));
    }

    #[test]
    fn parsed_values_follow_text_rules() {
        assert_eq!(check_price_value(dec!(20000)), check_uk_price("20000"));
        assert_eq!(check_price_value(dec!(2000000)), FieldCheck::Flagged(PRICE_HIGH));
        assert_eq!(check_price_value(Decimal::ZERO), FieldCheck::Invalid(PRICE_INVALID));
        assert_eq!(check_co2_value(0), FieldCheck::Invalid(CO2_INVALID));
        assert_eq!(check_co2_value(500), FieldCheck::Valid);
        assert_eq!(check_co2_value(501), FieldCheck::Invalid(CO2_HIGH));
    }

    #[test]
    fn high_price_does_not_block() {
        assert!(!check_uk_price("2000000").blocks_submission());
        assert!(validate_form("2000000", "120"));
    }

    #[test]
    fn form_gate() {
        assert!(validate_form("20000", "120"));
        assert!(validate_form("0.01", "1"));
        assert!(validate_form("20000", "500"));
        assert!(!validate_form("20000", "501"));
        assert!(!validate_form("20000", "0"));
        assert!(!validate_form("0", "120"));
        assert!(!validate_form("", "120"));
        assert!(!validate_form("20000", ""));
        assert!(!validate_form("NaN", "120"));
    }

    #[test]
    fn gate_agrees_with_field_checks() {
        for price in ["", "0", "1", "999", "5000000", "x"] {
            for co2 in ["", "0", "1", "250", "500", "501", "y"] {
                let fields_ok = !check_uk_price(price).blocks_submission()
                    && !check_co2_emissions(co2).blocks_submission();
                assert_eq!(validate_form(price, co2), fields_ok, "{} / {}", price, co2);
            }
        }
    }
}
