//! Decimal-to-base-unit amount conversion.
//!
//! Conversion is exact: a decimal with more significant fraction digits than
//! the unit scale is rejected rather than truncated.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is required")]
    Empty,
    #[error("amount '{input}' is not a decimal number")]
    Invalid { input: String },
    #[error("amount '{input}' has more than {scale} fractional digits")]
    PrecisionLoss { input: String, scale: u8 },
    #[error("amount '{input}' does not fit in the base-unit range")]
    Overflow { input: String },
}

/// Convert a decimal string into an integer count of smallest currency
/// units at the given scale. `"10"` at scale 6 is `10_000_000`; `"0.001"`
/// is `1_000`. Trailing fraction zeros beyond the scale are lossless and
/// accepted.
pub fn to_base_units(amount: &str, scale: u8) -> Result<u128, AmountError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let invalid = || AmountError::Invalid {
        input: amount.to_owned(),
    };

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let significant_frac = frac_part.trim_end_matches('0');
    if significant_frac.len() > scale as usize {
        return Err(AmountError::PrecisionLoss {
            input: amount.to_owned(),
            scale,
        });
    }

    let overflow = || AmountError::Overflow {
        input: amount.to_owned(),
    };

    let factor = 10u128
        .checked_pow(u32::from(scale))
        .ok_or_else(overflow)?;

    let int_units: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| overflow())?
    };

    let mut frac_units: u128 = 0;
    if !significant_frac.is_empty() {
        let parsed: u128 = significant_frac.parse().map_err(|_| overflow())?;
        let shift = 10u128
            .checked_pow(u32::from(scale) - significant_frac.len() as u32)
            .ok_or_else(overflow)?;
        frac_units = parsed.checked_mul(shift).ok_or_else(overflow)?;
    }

    int_units
        .checked_mul(factor)
        .and_then(|units| units.checked_add(frac_units))
        .ok_or_else(overflow)
}
