use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::state::{BenefitSchedule, LoyaltyTier, TierBenefits, TierRoadmap};
use crate::tiers::resolve_tier;

/// A player's loyalty record, as returned by the profile endpoint.
///
/// Monetary totals are in paise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyProfile {
    pub tier: LoyaltyTier,
    pub tier_label: String,
    pub matches_played: u64,
    pub total_deposits: u64,
    pub total_earnings: u64,
    pub benefits: TierBenefits,
}

/// Wire shape before optional fields are filled in
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfilePayload {
    tier: LoyaltyTier,
    #[serde(default)]
    tier_label: Option<String>,
    #[serde(default)]
    matches_played: u64,
    #[serde(default)]
    total_deposits: u64,
    #[serde(default)]
    total_earnings: u64,
    #[serde(default)]
    benefits: Option<TierBenefits>,
}

impl LoyaltyProfile {
    /// Parse a server profile, filling a missing label or benefits block
    /// from the reference schedule.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with(json, &BenefitSchedule::reference())
    }

    pub fn from_json_with(json: &str, schedule: &BenefitSchedule) -> Result<Self> {
        let payload: ProfilePayload = serde_json::from_str(json)?;

        let benefits = match payload.benefits {
            Some(benefits) => benefits,
            None => {
                debug!(tier = %payload.tier, "Profile has no benefits block, using schedule");
                *schedule.get(payload.tier)
            }
        };

        Ok(Self {
            tier: payload.tier,
            tier_label: payload
                .tier_label
                .unwrap_or_else(|| payload.tier.default_label().to_string()),
            matches_played: payload.matches_played,
            total_deposits: payload.total_deposits,
            total_earnings: payload.total_earnings,
            benefits,
        })
    }

    /// Client-side fallback used until the server profile arrives
    pub fn derive(
        matches_played: u64,
        total_deposits: u64,
        total_earnings: u64,
        roadmap: &TierRoadmap,
        schedule: &BenefitSchedule,
    ) -> Self {
        let tier = resolve_tier(matches_played, roadmap);
        Self {
            tier,
            tier_label: tier.default_label().to_string(),
            matches_played,
            total_deposits,
            total_earnings,
            benefits: *schedule.get(tier),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
