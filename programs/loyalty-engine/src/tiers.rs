//! Tier resolution over a roadmap
//!
//! The badge may come from the server while the roadmap progress is always
//! computed from the match count; `TierStatus` carries both from one frame.

use serde::Serialize;
use tracing::debug;

use crate::state::{LoyaltyProfile, LoyaltyTier, TierRoadmap, TierStep};

/// Tier whose threshold is the greatest one not above `matches_played`
pub fn resolve_tier(matches_played: u64, roadmap: &TierRoadmap) -> LoyaltyTier {
    let mut resolved = roadmap.first().key;
    for step in roadmap.steps() {
        if step.matches <= matches_played {
            resolved = step.key;
        }
    }
    resolved
}

/// The step after `current`, or `None` on the terminal tier.
///
/// A tier missing from the roadmap has no next step.
pub fn resolve_next_tier(current: LoyaltyTier, roadmap: &TierRoadmap) -> Option<&TierStep> {
    let index = roadmap.position(current)?;
    roadmap.steps().get(index + 1)
}

pub fn matches_to_next_tier(matches_played: u64, next: &TierStep) -> u64 {
    next.matches.saturating_sub(matches_played)
}

/// Progress along the whole roadmap, saturating at 100
pub fn resolve_progress_percent(matches_played: u64, roadmap: &TierRoadmap) -> f64 {
    let terminal = roadmap.last().matches;
    if terminal == 0 {
        return 100.0;
    }
    let percent = matches_played as f64 * 100.0 / terminal as f64;
    percent.clamp(0.0, 100.0)
}

/// Where the displayed tier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierSource {
    Authoritative,
    Derived,
}

/// Everything the tier card renders for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStatus {
    pub display_tier: LoyaltyTier,
    pub display_label: String,
    pub source: TierSource,
    pub progress_tier: LoyaltyTier,
    pub matches_played: u64,
    pub next_tier: Option<TierStep>,
    pub matches_to_next: u64,
    pub progress_percent: f64,
}

impl TierStatus {
    /// Badge from `profile` when present, progress from `matches_played`
    pub fn resolve(
        profile: Option<&LoyaltyProfile>,
        matches_played: u64,
        roadmap: &TierRoadmap,
    ) -> Self {
        let progress_tier = resolve_tier(matches_played, roadmap);
        let next_tier = resolve_next_tier(progress_tier, roadmap).cloned();
        let matches_to_next = next_tier
            .as_ref()
            .map(|next| matches_to_next_tier(matches_played, next))
            .unwrap_or(0);

        let (display_tier, display_label, source) = match profile {
            Some(profile) => (
                profile.tier,
                profile.tier_label.clone(),
                TierSource::Authoritative,
            ),
            None => (
                progress_tier,
                progress_tier.default_label().to_string(),
                TierSource::Derived,
            ),
        };

        if display_tier != progress_tier {
            debug!(
                display_tier = %display_tier,
                progress_tier = %progress_tier,
                matches_played,
                "Server tier differs from match-count tier"
            );
        }

        Self {
            display_tier,
            display_label,
            source,
            progress_tier,
            matches_played,
            next_tier,
            matches_to_next,
            progress_percent: resolve_progress_percent(matches_played, roadmap),
        }
    }

    pub fn is_lagging(&self) -> bool {
        self.display_tier != self.progress_tier
    }

    pub fn is_terminal(&self) -> bool {
        self.next_tier.is_none()
    }
}
