use core_config::{ConfigError, FromEnv, env_parse};
use std::time::Duration;

pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_PRICE_SCALE: u32 = 2;

/// Upper bound for presentation rounding; `Decimal` holds at most 28 fractional digits.
const MAX_PRICE_SCALE: u32 = 28;

/// Runtime settings for quote resolution and pricing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotingConfig {
    /// Deadline applied to a resolution fan-out when the caller sets none
    pub lookup_timeout_ms: u64,
    /// Decimal places used when rounding a breakdown for display
    pub price_scale: u32,
}

impl QuotingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookup_timeout_ms(mut self, millis: u64) -> Self {
        self.lookup_timeout_ms = millis;
        self
    }

    pub fn with_price_scale(mut self, scale: u32) -> Self {
        self.price_scale = scale;
        self
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

impl FromEnv for QuotingConfig {
    /// Reads:
    /// - QUOTING_LOOKUP_TIMEOUT_MS: defaults to 5000, must be positive
    /// - QUOTING_PRICE_SCALE: defaults to 2, at most 28
    fn from_env() -> Result<Self, ConfigError> {
        let lookup_timeout_ms = env_parse("QUOTING_LOOKUP_TIMEOUT_MS", DEFAULT_LOOKUP_TIMEOUT_MS)?;
        if lookup_timeout_ms == 0 {
            return Err(ConfigError::ParseError {
                key: "QUOTING_LOOKUP_TIMEOUT_MS".to_string(),
                details: "must be greater than 0".to_string(),
            });
        }

        let price_scale = env_parse("QUOTING_PRICE_SCALE", DEFAULT_PRICE_SCALE)?;
        if price_scale > MAX_PRICE_SCALE {
            return Err(ConfigError::ParseError {
                key: "QUOTING_PRICE_SCALE".to_string(),
                details: format!("must be at most {}", MAX_PRICE_SCALE),
            });
        }

        Ok(Self {
            lookup_timeout_ms,
            price_scale,
        })
    }
}

impl Default for QuotingConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            price_scale: DEFAULT_PRICE_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting_config_defaults() {
        temp_env::with_vars(
            [
                ("QUOTING_LOOKUP_TIMEOUT_MS", None::<&str>),
                ("QUOTING_PRICE_SCALE", None::<&str>),
            ],
            || {
                let config = QuotingConfig::from_env().unwrap();
                assert_eq!(config, QuotingConfig::default());
                assert_eq!(config.lookup_timeout(), Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn test_quoting_config_from_env() {
        temp_env::with_vars(
            [
                ("QUOTING_LOOKUP_TIMEOUT_MS", Some("750")),
                ("QUOTING_PRICE_SCALE", Some("4")),
            ],
            || {
                let config = QuotingConfig::from_env().unwrap();
                assert_eq!(config.lookup_timeout_ms, 750);
                assert_eq!(config.price_scale, 4);
            },
        );
    }

    #[test]
    fn test_quoting_config_rejects_bad_values() {
        temp_env::with_var("QUOTING_LOOKUP_TIMEOUT_MS", Some("soon"), || {
            let err = QuotingConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("QUOTING_LOOKUP_TIMEOUT_MS"));
        });

        temp_env::with_var("QUOTING_LOOKUP_TIMEOUT_MS", Some("0"), || {
            assert!(QuotingConfig::from_env().is_err());
        });

        temp_env::with_vars(
            [
                ("QUOTING_LOOKUP_TIMEOUT_MS", None::<&str>),
                ("QUOTING_PRICE_SCALE", Some("40")),
            ],
            || {
                let err = QuotingConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("QUOTING_PRICE_SCALE"));
            },
        );
    }

    #[test]
    fn test_builder_overrides() {
        let config = QuotingConfig::new()
            .with_lookup_timeout_ms(25)
            .with_price_scale(3);
        assert_eq!(config.lookup_timeout(), Duration::from_millis(25));
        assert_eq!(config.price_scale, 3);
    }
}
