use crate::error::{BingoError, Result};
use crate::types::WORDS_PER_CARD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Smallest word pool a game may start with.
    pub min_words: usize,
    pub default_frequency_minutes: f64,
    pub min_frequency_minutes: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_words: 24,
            default_frequency_minutes: 0.33,
            min_frequency_minutes: 0.1,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_words < WORDS_PER_CARD {
            return Err(BingoError::config(format!(
                "min_words must be at least {} to fill a card",
                WORDS_PER_CARD
            )));
        }

        if self.min_frequency_minutes.is_nan() || self.min_frequency_minutes <= 0.0 {
            return Err(BingoError::config(
                "min_frequency_minutes must be greater than 0",
            ));
        }

        if self.call_interval(self.default_frequency_minutes).is_err() {
            return Err(BingoError::config(format!(
                "default_frequency_minutes must be a usable frequency of at least {}",
                self.min_frequency_minutes
            )));
        }

        Ok(())
    }

    /// Convert a frequency typed in minutes into the interval between calls.
    /// The interval must fit the millisecond column it is stored in.
    pub fn call_interval(&self, minutes: f64) -> Result<Duration> {
        if !minutes.is_finite() || minutes < self.min_frequency_minutes {
            return Err(BingoError::invalid_frequency(format!(
                "{} minutes (minimum is {})",
                minutes, self.min_frequency_minutes
            )));
        }

        Duration::try_from_secs_f64(minutes * 60.0)
            .ok()
            .filter(|interval| i64::try_from(interval.as_millis()).is_ok())
            .ok_or_else(|| {
                BingoError::invalid_frequency(format!("{} minutes is too long", minutes))
            })
    }

    pub fn default_interval(&self) -> Result<Duration> {
        self.call_interval(self.default_frequency_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_min_words_below_card_size() {
        let config = GameConfig {
            min_words: 20,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(BingoError::Config(_))));
    }

    #[test]
    fn test_rejects_unusable_default_frequency() {
        for default_frequency_minutes in [0.05, f64::NAN, f64::INFINITY, 1e18] {
            let config = GameConfig {
                default_frequency_minutes,
                ..GameConfig::default()
            };
            assert!(matches!(config.validate(), Err(BingoError::Config(_))));
        }
    }

    #[test]
    fn test_call_interval() {
        let config = GameConfig::default();
        assert_eq!(config.call_interval(0.5).unwrap(), Duration::from_secs(30));
        assert!(config.call_interval(0.05).unwrap_err().is_user_input());
        assert!(config.call_interval(f64::NAN).is_err());
    }

    #[test]
    fn test_huge_call_interval_is_user_error() {
        let config = GameConfig::default();
        for minutes in [1e15, 1e18, f64::MAX] {
            let err = config.call_interval(minutes).unwrap_err();
            assert!(matches!(err, BingoError::InvalidFrequency(_)));
            assert!(err.is_user_input());
        }
        assert!(config.call_interval(7.0 * 24.0 * 60.0).is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"min_words": 30}"#).unwrap();
        assert_eq!(config.min_words, 30);
        assert_eq!(config.min_frequency_minutes, 0.1);
    }
}
