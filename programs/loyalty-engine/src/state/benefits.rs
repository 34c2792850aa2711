use serde::{Deserialize, Serialize};

use crate::error::{LoyaltyError, Result};
use crate::state::LoyaltyTier;

/// Perks attached to a loyalty tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBenefits {
    /// Share of a withdrawal retained as platform fee, 0-100
    pub platform_fee_percent: f64,
    #[serde(default)]
    pub priority_support: bool,
    #[serde(default)]
    pub exclusive_tournaments: bool,
}

impl TierBenefits {
    pub const fn new(
        platform_fee_percent: f64,
        priority_support: bool,
        exclusive_tournaments: bool,
    ) -> Self {
        Self {
            platform_fee_percent,
            priority_support,
            exclusive_tournaments,
        }
    }
}

/// Benefits for every tier, used when the server has not sent a profile yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitSchedule {
    pub bronze: TierBenefits,
    pub silver: TierBenefits,
    pub gold: TierBenefits,
    pub vip: TierBenefits,
}

impl BenefitSchedule {
    pub fn reference() -> Self {
        Self {
            bronze: TierBenefits::new(10.0, false, false),
            silver: TierBenefits::new(8.0, false, false),
            gold: TierBenefits::new(6.0, true, false),
            vip: TierBenefits::new(4.0, true, true),
        }
    }

    pub fn get(&self, tier: LoyaltyTier) -> &TierBenefits {
        match tier {
            LoyaltyTier::Bronze => &self.bronze,
            LoyaltyTier::Silver => &self.silver,
            LoyaltyTier::Gold => &self.gold,
            LoyaltyTier::Vip => &self.vip,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for tier in LoyaltyTier::ALL {
            let fee = self.get(tier).platform_fee_percent;
            if !fee.is_finite() || !(0.0..=100.0).contains(&fee) {
                return Err(LoyaltyError::InvalidBenefits {
                    tier,
                    reason: format!("platform fee {} is outside 0-100", fee),
                });
            }
        }
        Ok(())
    }
}

impl Default for BenefitSchedule {
    fn default() -> Self {
        Self::reference()
    }
}
