//! Configuration management for the pricing engine
//!
//! Fee schedules, the subsidy policy and the liquidity bootstrap rule are the
//! only knobs that differ between pools. They are plain data handed to
//! [`PricingEngine`](crate::PricingEngine); nothing here is global state.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{PricingError, Result};
use crate::types::{FeeSchedule, SubsidyPolicy, DEFAULT_SUBSIDY};

/// Environment variable prefix for overrides, e.g. `CPMM__SUBSIDY__ENABLED=true`
pub const ENV_PREFIX: &str = "CPMM";

/// Pricing engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Trading fee and burn applied on every swap
    pub fees: FeeConfig,

    /// Credit added to the base reserve before any calculation
    pub subsidy: SubsidyPolicy,

    /// Liquidity provisioning settings
    pub liquidity: LiquidityConfig,
}

/// Fee multipliers of a pool
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeeConfig {
    /// Multiplier kept by liquidity providers (999/1000 = 0.1% fee)
    pub trading: FeeSchedule,

    /// Multiplier left after the base-side burn (999/1000 = 0.1% burn)
    pub burn: FeeSchedule,
}

/// Liquidity provisioning configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LiquidityConfig {
    /// How liquidity is minted into a pool with zero outstanding supply
    pub bootstrap: BootstrapRule,
}

/// Minting rule for the first deposit into an empty pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapRule {
    /// `base_in * supply / base_reserve`, which is zero for a zero supply.
    /// This is what deployed frontends compute.
    ScaleBySupply,

    /// Mint one liquidity token per unit of base deposited
    OneToOne,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            trading: FeeSchedule::new(999, 1000),
            burn: FeeSchedule::new(999, 1000),
        }
    }
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            bootstrap: BootstrapRule::ScaleBySupply,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fees: FeeConfig::default(),
            subsidy: SubsidyPolicy::default(),
            liquidity: LiquidityConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Pool topped up by the protocol every block (subsidy on)
    pub fn liquidity_baking() -> Self {
        Self {
            subsidy: SubsidyPolicy::enabled(DEFAULT_SUBSIDY),
            ..Self::default()
        }
    }

    /// Layered load: built-in defaults, then the file at `path` (which must
    /// exist when given), then `CPMM__*` environment variables
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            tracing::info!("Loading pricing config from: {}", path);
            builder = builder.add_source(File::with_name(path).required(true));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file (for generating examples)
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.fees.trading.validate()?;
        self.fees.burn.validate()?;
        if self.fees.trading.combine(&self.fees.burn).is_none() {
            return Err(PricingError::InvalidFeeSchedule(format!(
                "{} combined with {} overflows",
                self.fees.trading, self.fees.burn
            )));
        }
        if self.subsidy.amount.is_negative() {
            return Err(PricingError::Config(config::ConfigError::Message(format!(
                "subsidy amount must not be negative, got {}",
                self.subsidy.amount
            ))));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("cpmm_pricing_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.fees.trading, FeeSchedule::new(999, 1000));
        assert_eq!(config.fees.burn, FeeSchedule::new(999, 1000));
        assert!(!config.subsidy.enabled);
        assert_eq!(config.subsidy.amount, Decimal::from(2_500_000u64));
        assert_eq!(config.liquidity.bootstrap, BootstrapRule::ScaleBySupply);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_liquidity_baking_preset() {
        let config = EngineConfig::liquidity_baking();
        assert!(config.subsidy.enabled);
        assert_eq!(config.fees, FeeConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_fees_and_subsidy() {
        let mut config = EngineConfig::default();
        config.fees.burn = FeeSchedule::new(5, 0);
        assert!(matches!(config.validate(), Err(PricingError::InvalidFeeSchedule(_))));

        let mut config = EngineConfig::default();
        config.subsidy.amount = Decimal::from(-1i32);
        assert!(matches!(config.validate(), Err(PricingError::Config(_))));
    }

    #[test]
    fn test_save_and_load_yaml() {
        let config = EngineConfig::liquidity_baking();
        let path = temp_path("roundtrip.yaml");

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_layered_load_reads_file_over_defaults() {
        let path = temp_path("layered.yaml");
        std::fs::write(
            &path,
            "subsidy:\n  enabled: true\n  amount: 1000\nliquidity:\n  bootstrap: one_to_one\n",
        )
        .unwrap();

        let loaded = EngineConfig::load(path.to_str()).unwrap();
        assert!(loaded.subsidy.enabled);
        assert_eq!(loaded.subsidy.amount, Decimal::from(1000u32));
        assert_eq!(loaded.liquidity.bootstrap, BootstrapRule::OneToOne);
        assert_eq!(loaded.fees, FeeConfig::default());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_layered_load_fails_on_missing_named_file() {
        let path = temp_path("missing_pool.yaml");
        let result = EngineConfig::load(path.to_str());
        assert!(matches!(result, Err(PricingError::Config(_))));

        assert!(EngineConfig::load(None).is_ok());
    }

    #[test]
    fn test_missing_yaml_file_is_an_io_error() {
        let result = EngineConfig::from_file(temp_path("does_not_exist.yaml"));
        assert!(matches!(result, Err(PricingError::Io(_))));
    }
}
