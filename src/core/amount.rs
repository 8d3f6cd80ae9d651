//! Value amounts
//!
//! All values are held as `u128` base units (wei). Human input may use the
//! `ether` or `gwei` denominations.

use thiserror::Error;

/// Base units per gwei
pub const ONE_GWEI: u128 = 1_000_000_000;

/// Base units per ether
pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

/// Errors that can occur while parsing an amount
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmountError {
    #[error("Empty amount")]
    Empty,
    #[error("Invalid amount: {0}")]
    Invalid(String),
    #[error("Unknown denomination: {0}")]
    UnknownUnit(String),
    #[error("Too many decimal places for {unit}: at most {max}")]
    TooPrecise { unit: String, max: u32 },
    #[error("Amount overflows 128 bits")]
    Overflow,
}

/// Parse a human amount such as `42`, `42wei`, `20 gwei` or `1.5ether`
pub fn parse_amount(input: &str) -> Result<u128, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }

    let split = input
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);
    let number = number.trim();
    let unit = unit.trim().to_ascii_lowercase();

    let decimals = match unit.as_str() {
        "" | "wei" => 0,
        "gwei" => 9,
        "ether" | "eth" => 18,
        other => return Err(AmountError::UnknownUnit(other.to_string())),
    };

    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Invalid(input.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AmountError::Invalid(input.to_string()));
    }
    if fraction.len() as u32 > decimals {
        return Err(AmountError::TooPrecise {
            unit: if unit.is_empty() { "wei".to_string() } else { unit },
            max: decimals,
        });
    }

    let scale = 10u128.pow(decimals);
    let whole_value = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| AmountError::Overflow)?
    };

    let fraction_value = if fraction.is_empty() {
        0
    } else {
        let padding = 10u128.pow(decimals - fraction.len() as u32);
        fraction.parse::<u128>().map_err(|_| AmountError::Overflow)? * padding
    };

    whole_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or(AmountError::Overflow)
}

/// Render base units as ether, trimming trailing zeros
pub fn format_ether(amount: u128) -> String {
    let whole = amount / ONE_ETHER;
    let fraction = amount % ONE_ETHER;

    if fraction == 0 {
        return format!("{} ETH", whole);
    }

    let digits = format!("{:018}", fraction);
    format!("{}.{} ETH", whole, digits.trim_end_matches('0'))
}
