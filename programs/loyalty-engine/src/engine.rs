use std::path::Path;

use tracing::debug;

use crate::{
    currency::CurrencyFormat,
    environment_config::LoyaltyConfig,
    error::Result,
    fees::{estimate_fee, WithdrawalEstimate},
    state::{LoyaltyProfile, TierRoadmap},
    tiers::{resolve_tier, TierStatus},
};

/// Shared loyalty and fee logic for the wallet and profile views.
///
/// Holds a validated configuration; every method is pure.
#[derive(Debug, Clone)]
pub struct LoyaltyEngine {
    config: LoyaltyConfig,
}

impl LoyaltyEngine {
    pub fn new(config: LoyaltyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn from_config_dir(config_dir: &Path) -> Result<Self> {
        Ok(Self {
            config: LoyaltyConfig::load(config_dir)?,
        })
    }

    pub fn config(&self) -> &LoyaltyConfig {
        &self.config
    }

    pub fn roadmap(&self) -> &TierRoadmap {
        &self.config.roadmap
    }

    pub fn currency(&self) -> &CurrencyFormat {
        &self.config.currency
    }

    /// Parse a server profile, filling gaps from the configured schedule
    pub fn parse_profile(&self, json: &str) -> Result<LoyaltyProfile> {
        LoyaltyProfile::from_json_with(json, &self.config.benefits)
    }

    /// The server profile when there is one, otherwise the fallback derived
    /// from `matches_played`
    pub fn effective_profile(
        &self,
        profile: Option<&LoyaltyProfile>,
        matches_played: u64,
    ) -> LoyaltyProfile {
        match profile {
            Some(profile) => profile.clone(),
            None => {
                debug!(matches_played, "No server profile yet, deriving tier locally");
                LoyaltyProfile::derive(
                    matches_played,
                    0,
                    0,
                    &self.config.roadmap,
                    &self.config.benefits,
                )
            }
        }
    }

    pub fn tier_status(&self, profile: Option<&LoyaltyProfile>, matches_played: u64) -> TierStatus {
        TierStatus::resolve(profile, matches_played, &self.config.roadmap)
    }

    pub fn fee_percent(&self, profile: Option<&LoyaltyProfile>, matches_played: u64) -> f64 {
        match profile {
            Some(profile) => profile.benefits.platform_fee_percent,
            None => {
                let tier = resolve_tier(matches_played, &self.config.roadmap);
                self.config.benefits.get(tier).platform_fee_percent
            }
        }
    }

    /// Fee and net payout for the amount currently in the withdrawal field
    pub fn estimate_withdrawal(
        &self,
        amount_text: &str,
        profile: Option<&LoyaltyProfile>,
        matches_played: u64,
    ) -> WithdrawalEstimate {
        estimate_fee(amount_text, self.fee_percent(profile, matches_played))
    }

    /// Whether the estimate falls within the configured withdrawal bounds
    pub fn check_withdrawal(&self, estimate: &WithdrawalEstimate) -> Result<()> {
        estimate.check_limits(&self.config.withdrawal)
    }

    pub fn format(&self, minor_units: i64) -> String {
        self.config.currency.format(minor_units)
    }

    /// Unsigned amounts beyond `i64::MAX` paise are shown as `i64::MAX`
    pub fn format_unsigned(&self, minor_units: u64) -> String {
        self.format(i64::try_from(minor_units).unwrap_or(i64::MAX))
    }
}

impl Default for LoyaltyEngine {
    fn default() -> Self {
        Self {
            config: LoyaltyConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, LoyaltyError};
    use crate::state::LoyaltyTier;
    use crate::tiers::TierSource;

    #[test]
    fn test_fallback_fee_follows_match_count() {
        let engine = LoyaltyEngine::default();
        assert_eq!(engine.fee_percent(None, 0), 10.0);
        assert_eq!(engine.fee_percent(None, 20), 8.0);
        assert_eq!(engine.fee_percent(None, 75), 6.0);
        assert_eq!(engine.fee_percent(None, 100), 4.0);
    }

    #[test]
    fn test_server_profile_takes_precedence_for_fee() {
        let engine = LoyaltyEngine::default();
        let profile = engine
            .parse_profile(r#"{"tier":"silver","matchesPlayed":30,"benefits":{"platformFeePercent":5}}"#)
            .unwrap();

        let estimate = engine.estimate_withdrawal("100", Some(&profile), 30);
        assert_eq!(estimate.fee_minor, 500);
        assert_eq!(estimate.net_minor, 9_500);

        let estimate = engine.estimate_withdrawal("100", None, 30);
        assert_eq!(estimate.fee_minor, 800);
    }

    #[test]
    fn test_effective_profile() {
        let engine = LoyaltyEngine::default();
        let derived = engine.effective_profile(None, 60);
        assert_eq!(derived.tier, LoyaltyTier::Gold);
        assert_eq!(derived.benefits.platform_fee_percent, 6.0);

        let server = engine.parse_profile(r#"{"tier":"vip","tierLabel":"Platinum"}"#).unwrap();
        assert_eq!(engine.effective_profile(Some(&server), 60), server);
    }

    #[test]
    fn test_tier_status_uses_configured_roadmap() {
        let engine = LoyaltyEngine::default();
        let status = engine.tier_status(None, 45);
        assert_eq!(status.source, TierSource::Derived);
        assert_eq!(status.next_tier.unwrap().key, LoyaltyTier::Gold);
        assert_eq!(status.matches_to_next, 5);
    }

    #[test]
    fn test_check_withdrawal_limits() {
        let engine = LoyaltyEngine::default();
        let estimate = engine.estimate_withdrawal("99.99", None, 0);
        assert!(matches!(
            engine.check_withdrawal(&estimate),
            Err(LoyaltyError::BelowMinimum { amount: 9_999, .. })
        ));
        let estimate = engine.estimate_withdrawal("100", None, 0);
        assert!(engine.check_withdrawal(&estimate).is_ok());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = LoyaltyConfig::default();
        config.withdrawal.min_minor = config.withdrawal.max_minor + 1;
        assert!(matches!(
            LoyaltyEngine::new(config),
            Err(LoyaltyError::Config(ConfigError::InvalidValue(_)))
        ));
    }

    #[test]
    fn test_format() {
        let engine = LoyaltyEngine::default();
        assert_eq!(engine.format(123_400), "₹1234");
        assert_eq!(engine.format_unsigned(9_500), "₹95");
        assert_eq!(engine.format_unsigned(u64::MAX), engine.format(i64::MAX));
    }
}
