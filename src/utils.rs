use std::str::FromStr;

use chrono::{LocalResult, TimeZone, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

const SETTLEMENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed-point fields carried by a raw pool record, with the scale each one
/// is encoded at. Supplies use the token's 18 decimals; rates and ratios are
/// percentages scaled by 1e6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolField {
    MaxSupply,
    LendSupply,
    BorrowSupply,
    InterestRate,
    MartgageRate,
    AutoLiquidateThreshold,
}

impl PoolField {
    pub const fn decimals(self) -> u32 {
        match self {
            PoolField::MaxSupply | PoolField::LendSupply | PoolField::BorrowSupply => 18,
            PoolField::InterestRate | PoolField::MartgageRate | PoolField::AutoLiquidateThreshold => 6,
        }
    }
}

/// Scale of the settlement amounts served by `/poolDataInfo`.
pub const SETTLE_AMOUNT_DECIMALS: u32 = 18;

/// Scales a raw fixed-point integer string down by `decimals` places.
/// The division happens in exact decimal arithmetic; the value only becomes
/// an `f64` after the scale-down, so 18-decimals amounts keep their integer
/// part intact. Anything unparseable scales to `0`.
pub fn from_decimals(raw: &str, decimals: u32) -> f64 {
    if decimals > 28 {
        // Decimal supports scales up to 28.
        return 0.0;
    }
    let value = match Decimal::from_str(raw.trim()) {
        Ok(value) => value,
        Err(_) => return 0.0,
    };
    match value.checked_mul(Decimal::new(1, decimals)) {
        Some(scaled) => scaled.to_f64().unwrap_or(0.0),
        None => 0.0,
    }
}

pub fn scale_field(raw: &str, field: PoolField) -> f64 {
    from_decimals(raw, field.decimals())
}

/// `Number(raw) || fallback`: unparseable, non-finite *and zero* input all
/// take the fallback. The zero case is intentional; the lend-price fallback
/// of `1` relies on it to keep downstream ratios divisible.
pub fn coerce_or(raw: &str, fallback: f64) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value != 0.0 && value.is_finite() => value,
        _ => fallback,
    }
}

/// `Number(raw) || 0` for integer fields (timestamps, state codes).
pub fn coerce_i64(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return value;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value as i64,
        _ => 0,
    }
}

/// Whole days between settlement and pool end, clamped to zero when the
/// window is inverted.
pub fn term_days(settle_time: i64, end_time: i64) -> i64 {
    end_time.saturating_sub(settle_time).div_euclid(86_400).max(0)
}

/// Formats a Unix-seconds timestamp as a UTC calendar date. Zero and
/// negative timestamps format normally; only values chrono cannot represent
/// degrade to the empty string.
pub fn format_timestamp(secs: i64) -> String {
    match Utc.timestamp_opt(secs, 0) {
        LocalResult::Single(datetime) => datetime.format(SETTLEMENT_DATE_FORMAT).to_string(),
        _ => String::new(),
    }
}

/// Rounds to 6 decimal places, groups the integer part by thousands, and
/// drops an all-zero fraction instead of padding it.
pub fn to_thousands(value: f64) -> String {
    let rounded = Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.to_string();
    let (number, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };
    let (sign, digits) = match number.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", number),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

/// Share of the pool already lent out, in percent, clamped to `[0, 100]`.
/// An empty or closed pool reports `0`.
pub fn utilization_percent(lend_supply: f64, max_supply: f64) -> f64 {
    if max_supply <= 0.0 {
        return 0.0;
    }
    let percent = lend_supply / max_supply * 100.0;
    if !percent.is_finite() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// Borrow-side capacity consumed, in percent, clamped to `[0, 100]`.
/// A zero collateralization ratio reports `0` instead of dividing.
pub fn borrow_capacity_percent(
    borrow_supply: f64,
    borrow_price: f64,
    lend_price: f64,
    collateralization_ratio: f64,
    max_supply: f64,
) -> f64 {
    if max_supply <= 0.0 || collateralization_ratio == 0.0 {
        return 0.0;
    }
    let capacity =
        (borrow_supply * borrow_price / lend_price / collateralization_ratio * 10_000.0).floor()
            / max_supply;
    if !capacity.is_finite() {
        return 0.0;
    }
    capacity.clamp(0.0, 100.0)
}
