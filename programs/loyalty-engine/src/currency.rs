//! Rupee display helpers

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub const RUPEE_SYMBOL: &str = "₹";

/// Paise are never shown beyond two places
const MAX_DECIMALS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// `1234567`
    None,
    /// `12,34,567` (lakh/crore)
    Indian,
    /// `1,234,567`
    International,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub grouping: Grouping,
    pub decimals: u32,
}

impl Default for CurrencyFormat {
    /// The compact `₹1234` format used across wallet and profile views
    fn default() -> Self {
        Self {
            symbol: RUPEE_SYMBOL.to_string(),
            grouping: Grouping::None,
            decimals: 0,
        }
    }
}

impl CurrencyFormat {
    pub fn format(&self, minor_units: i64) -> String {
        let decimals = self.decimals.min(MAX_DECIMALS);
        let major = minor_to_major(minor_units)
            .abs()
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);

        let text = format!("{:.*}", decimals as usize, major);
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (text.as_str(), None),
        };

        let whole = match self.grouping {
            Grouping::None => whole.to_string(),
            Grouping::Indian => group_indian(whole),
            Grouping::International => group_thousands(whole),
        };

        let mut out = String::with_capacity(whole.len() + self.symbol.len() + 4);
        if minor_units < 0 && !major.is_zero() {
            out.push('-');
        }
        out.push_str(&self.symbol);
        out.push_str(&whole);
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }
}

/// Paise to rupees, exact
pub fn minor_to_major(minor_units: i64) -> Decimal {
    Decimal::new(minor_units, 2)
}

/// `123450` paise renders as `₹1235`
pub fn format_minor_units_as_currency(minor_units: i64) -> String {
    CurrencyFormat::default().format(minor_units)
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups = Vec::with_capacity(head.len() / 2 + 1);
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

fn group_thousands(digits: &str) -> String {
    let mut groups = Vec::with_capacity(digits.len() / 3 + 1);
    let mut end = digits.len();
    while end > 0 {
        let start = end.saturating_sub(3);
        groups.push(&digits[start..end]);
        end = start;
    }
    groups.reverse();
    groups.join(",")
}
