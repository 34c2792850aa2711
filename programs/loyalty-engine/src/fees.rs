//! Withdrawal fee estimation
//!
//! Mirrors the fee the server charges at withdrawal time so the form can show
//! fee and net payout on every keystroke. Amounts are paise; rounding is
//! half away from zero on exact decimals.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoyaltyError, Result};

/// Paise per rupee
pub const MINOR_UNITS_PER_MAJOR: u64 = 100;

/// Fee and payout for one requested amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalEstimate {
    pub amount_minor: u64,
    pub fee_minor: u64,
    pub net_minor: u64,
    /// Percentage actually applied, after clamping
    pub fee_percent: Decimal,
}

impl WithdrawalEstimate {
    pub fn zero() -> Self {
        Self {
            amount_minor: 0,
            fee_minor: 0,
            net_minor: 0,
            fee_percent: Decimal::ZERO,
        }
    }

    /// Display-only limit check; estimation itself never fails
    pub fn check_limits(&self, limits: &WithdrawalLimits) -> Result<()> {
        if self.amount_minor < limits.min_minor {
            return Err(LoyaltyError::BelowMinimum {
                amount: self.amount_minor,
                minimum: limits.min_minor,
            });
        }
        if self.amount_minor > limits.max_minor {
            return Err(LoyaltyError::AboveMaximum {
                amount: self.amount_minor,
                maximum: limits.max_minor,
            });
        }
        Ok(())
    }
}

/// Bounds a withdrawal request must fall within, in paise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalLimits {
    pub min_minor: u64,
    pub max_minor: u64,
}

impl WithdrawalLimits {
    pub fn contains(&self, amount_minor: u64) -> bool {
        (self.min_minor..=self.max_minor).contains(&amount_minor)
    }
}

impl Default for WithdrawalLimits {
    fn default() -> Self {
        Self {
            min_minor: 100 * MINOR_UNITS_PER_MAJOR,
            max_minor: 100_000 * MINOR_UNITS_PER_MAJOR,
        }
    }
}

/// Convert a rupee amount typed into a form field to paise.
///
/// Unparsable, negative and non-finite input is 0; amounts beyond `u64::MAX`
/// paise saturate.
pub fn parse_major_units(input: &str) -> u64 {
    let Some(major) = parse_decimal(input) else {
        if !input.trim().is_empty() {
            debug!(input, "Unparsable withdrawal amount, treating as zero");
        }
        return 0;
    };

    if major <= Decimal::ZERO {
        if major < Decimal::ZERO {
            debug!(input, "Negative withdrawal amount, treating as zero");
        }
        return 0;
    }

    match major.checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR)) {
        Some(minor) => minor
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .unwrap_or(u64::MAX),
        None => u64::MAX,
    }
}

fn parse_decimal(input: &str) -> Option<Decimal> {
    let mut text = input.trim();
    if let Some(rest) = text.strip_prefix('+') {
        text = rest;
    }
    // "12." while the user is still typing
    if let Some(rest) = text.strip_suffix('.') {
        text = rest;
    }
    if text.is_empty() || text == "-" {
        return None;
    }

    let normalized;
    if text.starts_with('.') {
        normalized = format!("0{}", text);
        text = normalized.as_str();
    } else if let Some(rest) = text.strip_prefix("-.") {
        normalized = format!("-0.{}", rest);
        text = normalized.as_str();
    }

    let parsed = if text.contains(|c: char| c == 'e' || c == 'E') {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    };
    parsed.or_else(|| beyond_decimal_range(text))
}

/// Well-formed numbers `Decimal` cannot hold: huge magnitudes pin to the
/// range ends, vanishing ones are zero
fn beyond_decimal_range(text: &str) -> Option<Decimal> {
    let value = text.parse::<f64>().ok().filter(|value| value.is_finite())?;
    if value.abs() < 1.0 {
        Some(Decimal::ZERO)
    } else if value > 0.0 {
        Some(Decimal::MAX)
    } else {
        Some(Decimal::MIN)
    }
}

/// NaN becomes 0; everything else is clamped into [0, 100]
pub fn clamp_fee_percent(fee_percent: f64) -> Decimal {
    if fee_percent.is_nan() {
        debug!("Fee percent is NaN, using 0");
        return Decimal::ZERO;
    }
    if !(0.0..=100.0).contains(&fee_percent) {
        debug!(fee_percent, "Fee percent out of range, clamping");
    }

    let clamped = fee_percent.clamp(0.0, 100.0);
    Decimal::from_f64(clamped).unwrap_or(Decimal::ZERO)
}

/// Estimate fee and net payout for an amount typed in rupees
pub fn estimate_fee(amount_major: &str, fee_percent: f64) -> WithdrawalEstimate {
    estimate_fee_minor(parse_major_units(amount_major), fee_percent)
}

/// Estimate fee and net payout for an amount already in paise.
///
/// `fee_minor + net_minor == amount_minor` always holds: the net is the
/// exact remainder, never rounded on its own.
pub fn estimate_fee_minor(amount_minor: u64, fee_percent: f64) -> WithdrawalEstimate {
    let percent = clamp_fee_percent(fee_percent);
    if amount_minor == 0 {
        return WithdrawalEstimate {
            fee_percent: percent,
            ..WithdrawalEstimate::zero()
        };
    }

    let fee_minor = Decimal::from(amount_minor)
        .checked_mul(percent)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .map(|fee| fee.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|fee| fee.to_u64())
        .unwrap_or(amount_minor)
        .min(amount_minor);

    WithdrawalEstimate {
        amount_minor,
        fee_minor,
        net_minor: amount_minor - fee_minor,
        fee_percent: percent,
    }
}
