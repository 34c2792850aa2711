//! Battle Nest loyalty engine
//!
//! Resolves a player's loyalty tier from their completed matches and estimates
//! withdrawal fees and net payouts for display. All figures are advisory; the
//! server computes the amounts that are actually settled.

pub mod currency;
pub mod engine;
pub mod environment_config;
pub mod error;
pub mod fees;
pub mod state;
pub mod tiers;
pub mod tracing_logger;

pub use currency::{format_minor_units_as_currency, CurrencyFormat, Grouping};
pub use engine::LoyaltyEngine;
pub use environment_config::{Environment, LoyaltyConfig};
pub use error::{ConfigError, LoyaltyError, Result};
pub use fees::{estimate_fee, estimate_fee_minor, WithdrawalEstimate, WithdrawalLimits};
pub use state::{BenefitSchedule, LoyaltyProfile, LoyaltyTier, TierBenefits, TierRoadmap, TierStep};
pub use tiers::{
    matches_to_next_tier, resolve_next_tier, resolve_progress_percent, resolve_tier, TierSource,
    TierStatus,
};
