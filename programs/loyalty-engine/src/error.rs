use thiserror::Error;

use crate::state::LoyaltyTier;

#[derive(Error, Debug)]
pub enum LoyaltyError {
    #[error("Invalid tier roadmap: {0}")]
    InvalidRoadmap(String),

    #[error("Tier {0} appears more than once in the roadmap")]
    DuplicateTier(LoyaltyTier),

    #[error("Invalid benefits for tier {tier}: {reason}")]
    InvalidBenefits { tier: LoyaltyTier, reason: String },

    #[error("Failed to parse loyalty profile: {0}")]
    ProfileParse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Withdrawal of {amount} paise is below the minimum of {minimum} paise")]
    BelowMinimum { amount: u64, minimum: u64 },

    #[error("Withdrawal of {amount} paise exceeds the maximum of {maximum} paise")]
    AboveMaximum { amount: u64, maximum: u64 },
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

pub type Result<T> = std::result::Result<T, LoyaltyError>;
