//! Loyalty configuration
//!
//! Layered in order: built-in defaults (or `loyalty.default.toml`), then
//! `loyalty.<environment>.toml`, then environment variables. The merged
//! result is validated before use.

use std::{
    env, fs,
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    currency::CurrencyFormat,
    error::ConfigError,
    fees::WithdrawalLimits,
    state::{BenefitSchedule, TierRoadmap},
};

type Result<T> = std::result::Result<T, ConfigError>;

pub const DEFAULT_CONFIG_FILE: &str = "loyalty.default.toml";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            "test" | "testing" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

/// Everything the engine needs to resolve tiers and price withdrawals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyConfig {
    #[serde(default)]
    pub environment: Environment,
    pub roadmap: TierRoadmap,
    pub benefits: BenefitSchedule,
    pub currency: CurrencyFormat,
    pub withdrawal: WithdrawalLimits,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            roadmap: TierRoadmap::reference(),
            benefits: BenefitSchedule::reference(),
            currency: CurrencyFormat::default(),
            withdrawal: WithdrawalLimits::default(),
        }
    }
}

impl LoyaltyConfig {
    /// Load for the environment named by `ENVIRONMENT`, `ENV` or `RUST_ENV`
    pub fn load(config_dir: &Path) -> Result<Self> {
        Self::load_for(config_dir, Self::detect_environment())
    }

    pub fn load_for(config_dir: &Path, environment: Environment) -> Result<Self> {
        let default_path = config_dir.join(DEFAULT_CONFIG_FILE);
        let mut config = if default_path.exists() {
            let content = read_file(&default_path)?;
            Self::merge_configs(Self::default(), parse_toml(&content, &default_path)?)?
        } else {
            debug!(path = %default_path.display(), "No default config file, using built-in defaults");
            Self::default()
        };

        let env_path = config_dir.join(format!("loyalty.{}.toml", environment.as_str()));
        if env_path.exists() {
            let content = read_file(&env_path)?;
            config = Self::merge_configs(config, parse_toml(&content, &env_path)?)?;
        }

        config = Self::apply_env_overrides(config)?;

        // The detected environment wins over whatever the files say
        config.environment = environment;

        config.validate()?;

        info!(
            environment = environment.as_str(),
            tiers = config.roadmap.len(),
            "Loyalty configuration loaded"
        );
        Ok(config)
    }

    /// Parse a TOML document layered over the built-in defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let overlay: toml::Value = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let config = Self::merge_configs(Self::default(), overlay)?;
        config.validate()?;
        Ok(config)
    }

    pub fn detect_environment() -> Environment {
        env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .or_else(|_| env::var("RUST_ENV"))
            .map(|e| Environment::from_str(&e))
            .unwrap_or(Environment::Development)
    }

    fn merge_configs(base: LoyaltyConfig, overlay: toml::Value) -> Result<LoyaltyConfig> {
        let mut base_value = toml::Value::try_from(base)
            .map_err(|e| ConfigError::ParseError(format!("Failed to convert config to value: {}", e)))?;

        if let (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) =
            (&mut base_value, overlay)
        {
            Self::merge_tables(base_table, overlay_table);
        }

        base_value
            .try_into()
            .map_err(|e| ConfigError::ParseError(format!("Failed to convert merged config: {}", e)))
    }

    /// Tables merge key by key; arrays such as the roadmap are replaced whole
    fn merge_tables(
        base: &mut toml::map::Map<String, toml::Value>,
        overlay: toml::map::Map<String, toml::Value>,
    ) {
        for (key, value) in overlay {
            match (base.get_mut(&key), value) {
                (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                    Self::merge_tables(base_table, overlay_table);
                }
                (_, value) => {
                    base.insert(key, value);
                }
            }
        }
    }

    fn apply_env_overrides(mut config: LoyaltyConfig) -> Result<LoyaltyConfig> {
        if let Ok(symbol) = env::var("LOYALTY_CURRENCY_SYMBOL") {
            config.currency.symbol = symbol;
        }

        if let Some(min) = env_u64("LOYALTY_MIN_WITHDRAWAL_MINOR")? {
            config.withdrawal.min_minor = min;
        }

        if let Some(max) = env_u64("LOYALTY_MAX_WITHDRAWAL_MINOR")? {
            config.withdrawal.max_minor = max;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.benefits
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        if self.withdrawal.min_minor > self.withdrawal.max_minor {
            return Err(ConfigError::InvalidValue(format!(
                "withdrawal.min_minor ({}) must be <= withdrawal.max_minor ({})",
                self.withdrawal.min_minor, self.withdrawal.max_minor
            )));
        }

        if self.currency.decimals > 2 {
            return Err(ConfigError::InvalidValue(format!(
                "currency.decimals must be 0-2, got {}",
                self.currency.decimals
            )));
        }

        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e)))
}

fn parse_toml(content: &str, path: &Path) -> Result<toml::Value> {
    toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("Failed to parse {}: {}", path.display(), e)))
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::EnvError(format!("{}={:?}: {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Grouping;
    use crate::state::LoyaltyTier;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: [&str; 6] = [
        "ENVIRONMENT",
        "ENV",
        "RUST_ENV",
        "LOYALTY_CURRENCY_SYMBOL",
        "LOYALTY_MIN_WITHDRAWAL_MINOR",
        "LOYALTY_MAX_WITHDRAWAL_MINOR",
    ];

    struct EnvRestore {
        backups: Vec<(&'static str, Option<String>)>,
    }

    impl EnvRestore {
        /// Clears every loyalty variable, then applies `vars`
        fn set(vars: &[(&'static str, &'static str)]) -> Self {
            let backups = ENV_KEYS
                .iter()
                .map(|key| (*key, env::var(key).ok()))
                .collect::<Vec<_>>();

            for key in ENV_KEYS {
                env::remove_var(key);
            }
            for (key, value) in vars {
                env::set_var(key, value);
            }

            Self { backups }
        }
    }

    impl Drop for EnvRestore {
        fn drop(&mut self) {
            for (key, value) in self.backups.drain(..) {
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_environment_detection() {
        let _lock = ENV_LOCK.lock().unwrap();
        {
            let _restore = EnvRestore::set(&[("ENVIRONMENT", "production")]);
            assert_eq!(LoyaltyConfig::detect_environment(), Environment::Production);
        }
        {
            let _restore = EnvRestore::set(&[("ENV", "staging")]);
            assert_eq!(LoyaltyConfig::detect_environment(), Environment::Staging);
        }
        let _restore = EnvRestore::set(&[]);
        assert_eq!(LoyaltyConfig::detect_environment(), Environment::Development);
    }

    #[test]
    fn test_empty_dir_uses_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _restore = EnvRestore::set(&[]);
        let temp_dir = TempDir::new().unwrap();

        let config = LoyaltyConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, LoyaltyConfig::default());
    }

    #[test]
    fn test_environment_file_overrides_default_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _restore = EnvRestore::set(&[]);
        let temp_dir = TempDir::new().unwrap();

        fs::write(
            temp_dir.path().join(DEFAULT_CONFIG_FILE),
            "[benefits.gold]\nplatformFeePercent = 5.5\nprioritySupport = true\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("loyalty.staging.toml"),
            "[currency]\ngrouping = \"indian\"\n\n[withdrawal]\nmin_minor = 5000\n",
        )
        .unwrap();

        let config = LoyaltyConfig::load_for(temp_dir.path(), Environment::Staging).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.benefits.get(LoyaltyTier::Gold).platform_fee_percent, 5.5);
        assert_eq!(config.benefits.silver, BenefitSchedule::reference().silver);
        assert_eq!(config.currency.grouping, Grouping::Indian);
        assert_eq!(config.currency.symbol, "₹");
        assert_eq!(config.withdrawal.min_minor, 5_000);
        assert_eq!(config.withdrawal.max_minor, WithdrawalLimits::default().max_minor);
    }

    #[test]
    fn test_roadmap_array_is_replaced() {
        let config = LoyaltyConfig::from_toml_str(
            r#"
            [[roadmap]]
            key = "bronze"
            label = "Rookie"
            matches = 0

            [[roadmap]]
            key = "gold"
            label = "Veteran"
            matches = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.roadmap.len(), 2);
        assert_eq!(config.roadmap.last().label, "Veteran");
    }

    #[test]
    fn test_invalid_roadmap_is_rejected() {
        let err = LoyaltyConfig::from_toml_str(
            r#"
            [[roadmap]]
            key = "silver"
            label = "Silver"
            matches = 20

            [[roadmap]]
            key = "gold"
            label = "Gold"
            matches = 10
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_failures() {
        let err = LoyaltyConfig::from_toml_str("[benefits.vip]\nplatformFeePercent = 101.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        let err = LoyaltyConfig::from_toml_str("[withdrawal]\nmin_minor = 900\nmax_minor = 100\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        let err = LoyaltyConfig::from_toml_str("[currency]\ndecimals = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_env_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();

        {
            let _restore = EnvRestore::set(&[
                ("LOYALTY_CURRENCY_SYMBOL", "INR "),
                ("LOYALTY_MAX_WITHDRAWAL_MINOR", "2500000"),
            ]);
            let config = LoyaltyConfig::load(temp_dir.path()).unwrap();
            assert_eq!(config.currency.symbol, "INR ");
            assert_eq!(config.withdrawal.max_minor, 2_500_000);
        }

        let _restore = EnvRestore::set(&[("LOYALTY_MIN_WITHDRAWAL_MINOR", "lots")]);
        let err = LoyaltyConfig::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
    }

    #[test]
    fn test_shipped_default_file_matches_built_in() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _restore = EnvRestore::set(&[]);
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");

        let config = LoyaltyConfig::load_for(&dir, Environment::Development).unwrap();
        assert_eq!(config, LoyaltyConfig::default());

        let config = LoyaltyConfig::load_for(&dir, Environment::Production).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.currency.grouping, Grouping::Indian);
        assert_eq!(config.roadmap, TierRoadmap::reference());
    }
}
