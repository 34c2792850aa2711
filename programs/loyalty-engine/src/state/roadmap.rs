use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LoyaltyError, Result};

/// Loyalty level granted from a player's lifetime completed matches
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyTier {
    #[default]
    #[serde(alias = "Bronze")]
    Bronze,
    #[serde(alias = "Silver")]
    Silver,
    #[serde(alias = "Gold")]
    Gold,
    #[serde(alias = "VIP", alias = "platinum", alias = "Platinum")]
    Vip,
}

impl LoyaltyTier {
    pub const ALL: [LoyaltyTier; 4] = [
        LoyaltyTier::Bronze,
        LoyaltyTier::Silver,
        LoyaltyTier::Gold,
        LoyaltyTier::Vip,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            LoyaltyTier::Bronze => "bronze",
            LoyaltyTier::Silver => "silver",
            LoyaltyTier::Gold => "gold",
            LoyaltyTier::Vip => "vip",
        }
    }

    /// Badge text shown when the profile carries no label of its own
    pub fn default_label(&self) -> &'static str {
        match self {
            LoyaltyTier::Bronze => "Bronze Member",
            LoyaltyTier::Silver => "Silver Member",
            LoyaltyTier::Gold => "Gold Member",
            LoyaltyTier::Vip => "VIP Member",
        }
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One rung of the roadmap: the tier unlocked once `matches` is reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierStep {
    pub key: LoyaltyTier,
    pub label: String,
    pub matches: u64,
}

impl TierStep {
    pub fn new(key: LoyaltyTier, label: impl Into<String>, matches: u64) -> Self {
        Self {
            key,
            label: label.into(),
            matches,
        }
    }
}

/// Ordered tier thresholds.
///
/// Construction enforces a non-empty list with strictly increasing thresholds
/// and no repeated tier, so resolution over it is always total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TierStep>", into = "Vec<TierStep>")]
pub struct TierRoadmap {
    steps: Vec<TierStep>,
}

impl TierRoadmap {
    pub fn new(steps: Vec<TierStep>) -> Result<Self> {
        if steps.is_empty() {
            return Err(LoyaltyError::InvalidRoadmap(
                "roadmap must contain at least one tier".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(steps.len());
        for step in &steps {
            if !seen.insert(step.key) {
                return Err(LoyaltyError::DuplicateTier(step.key));
            }
        }

        for pair in steps.windows(2) {
            if pair[1].matches <= pair[0].matches {
                return Err(LoyaltyError::InvalidRoadmap(format!(
                    "threshold for {} ({}) must be greater than {} ({})",
                    pair[1].key, pair[1].matches, pair[0].key, pair[0].matches
                )));
            }
        }

        Ok(Self { steps })
    }

    /// Bronze(0), Silver(20), Gold(50), Platinum(100)
    pub fn reference() -> Self {
        Self {
            steps: vec![
                TierStep::new(LoyaltyTier::Bronze, "Bronze", 0),
                TierStep::new(LoyaltyTier::Silver, "Silver", 20),
                TierStep::new(LoyaltyTier::Gold, "Gold", 50),
                TierStep::new(LoyaltyTier::Vip, "Platinum", 100),
            ],
        }
    }

    pub fn steps(&self) -> &[TierStep] {
        &self.steps
    }

    pub fn first(&self) -> &TierStep {
        &self.steps[0]
    }

    pub fn last(&self) -> &TierStep {
        &self.steps[self.steps.len() - 1]
    }

    pub fn position(&self, key: LoyaltyTier) -> Option<usize> {
        self.steps.iter().position(|step| step.key == key)
    }

    pub fn step(&self, key: LoyaltyTier) -> Option<&TierStep> {
        self.steps.iter().find(|step| step.key == key)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for TierRoadmap {
    fn default() -> Self {
        Self::reference()
    }
}

impl TryFrom<Vec<TierStep>> for TierRoadmap {
    type Error = LoyaltyError;

    fn try_from(steps: Vec<TierStep>) -> Result<Self> {
        Self::new(steps)
    }
}

impl From<TierRoadmap> for Vec<TierStep> {
    fn from(roadmap: TierRoadmap) -> Self {
        roadmap.steps
    }
}
