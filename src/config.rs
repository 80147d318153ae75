//! Game and backend configuration

use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

/// Default TMDB v3 API root
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Fewest connections any puzzle may ask for; one would leave no slot to fill
pub const MIN_HANDSHAKES: usize = 2;

/// Errors from configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid handshake bounds: min {min}, max {max}")]
    InvalidHandshakes { min: usize, max: usize },

    #[error("Pool size must be at least 2, got {0}")]
    PoolTooSmall(usize),

    #[error("Page ceiling must be at least 1")]
    NoPages,

    #[error("Minimum query length must be at least 1")]
    EmptyQueryThreshold,

    #[error("Missing API token")]
    MissingToken,
}

/// Puzzle shape and oracle limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Fewest connections a puzzle may ask for
    pub min_handshakes: usize,
    /// Most connections a puzzle may ask for
    pub max_handshakes: usize,
    /// Number of popular people kept in the ranked pool
    pub pool_size: usize,
    /// Hard ceiling on popular-listing pages fetched while building the pool
    pub max_pool_pages: u32,
    /// Queries shorter than this (in characters) never reach the backend
    pub min_query_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_handshakes: 2,
            max_handshakes: 6,
            pool_size: 100,
            max_pool_pages: 25,
            min_query_len: 3,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_handshakes < MIN_HANDSHAKES || self.min_handshakes > self.max_handshakes {
            return Err(ConfigError::InvalidHandshakes {
                min: self.min_handshakes,
                max: self.max_handshakes,
            });
        }
        if self.pool_size < 2 {
            return Err(ConfigError::PoolTooSmall(self.pool_size));
        }
        if self.max_pool_pages == 0 {
            return Err(ConfigError::NoPages);
        }
        if self.min_query_len == 0 {
            return Err(ConfigError::EmptyQueryThreshold);
        }
        Ok(())
    }

    pub fn handshake_range(&self) -> RangeInclusive<usize> {
        self.min_handshakes..=self.max_handshakes
    }

    pub fn with_handshakes(mut self, min: usize, max: usize) -> Self {
        self.min_handshakes = min;
        self.max_handshakes = max;
        self
    }

    pub fn with_pool(mut self, size: usize, max_pages: u32) -> Self {
        self.pool_size = size;
        self.max_pool_pages = max_pages;
        self
    }
}

/// Connection settings for the HTTP metadata backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Bearer credential (TMDB "API Read Access Token")
    pub api_token: String,
    pub request_timeout: Duration,
}

impl BackendConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: api_token.into(),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.handshake_range(), 2..=6);
    }

    #[test]
    fn inverted_bounds_rejected() {
        let config = GameConfig::default().with_handshakes(5, 3);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidHandshakes { min: 5, max: 3 })
        );
    }

    #[test]
    fn zero_handshakes_rejected() {
        let config = GameConfig::default().with_handshakes(0, 3);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHandshakes { .. })
        ));
    }

    #[test]
    fn single_handshake_rejected() {
        let config = GameConfig::default().with_handshakes(1, 4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidHandshakes { min: 1, max: 4 })
        );
        assert!(GameConfig::default().with_handshakes(2, 2).validate().is_ok());
    }

    #[test]
    fn tiny_pool_rejected() {
        let config = GameConfig::default().with_pool(1, 25);
        assert_eq!(config.validate(), Err(ConfigError::PoolTooSmall(1)));
    }

    #[test]
    fn blank_token_rejected() {
        assert_eq!(
            BackendConfig::new("  ").validate(),
            Err(ConfigError::MissingToken)
        );
        assert!(BackendConfig::new("abc").validate().is_ok());
    }
}
