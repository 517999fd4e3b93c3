//! Assistant configuration

use crate::error::{Result, StockError};
use crate::tools::ChartOptions;
use bullbear_utils::{env_or, env_parse};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Settings for one chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Model name sent with every completion request
    pub model: String,

    /// Token limit for each model reply
    pub max_tokens: usize,

    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,

    /// Optional system prompt prepended to every request
    pub system_prompt: Option<String>,

    /// Bound on each market data fetch
    pub market_timeout: Duration,

    /// Rendered chart size
    pub chart: ChartOptions,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: None,
            system_prompt: None,
            market_timeout: Duration::from_secs(30),
            chart: ChartOptions::default(),
        }
    }
}

impl AssistantConfig {
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }

    /// Defaults overridden by `OPENAI_MODEL`, `OPENAI_MAX_TOKENS`,
    /// `OPENAI_TEMPERATURE` and `MARKET_DATA_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder().model(env_or("OPENAI_MODEL", DEFAULT_MODEL));

        if let Some(max_tokens) = env_parse::<usize>("OPENAI_MAX_TOKENS")? {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = env_parse::<f32>("OPENAI_TEMPERATURE")? {
            builder = builder.temperature(temperature);
        }
        if let Some(secs) = env_parse::<u64>("MARKET_DATA_TIMEOUT_SECS")? {
            builder = builder.market_timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(StockError::ConfigError("model must not be empty".to_string()));
        }

        if self.max_tokens == 0 {
            return Err(StockError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(t) = self.temperature.filter(|t| !(0.0..=2.0).contains(t)) {
            return Err(StockError::ConfigError(format!(
                "temperature must be between 0 and 2, got {t}"
            )));
        }

        if self.market_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "market data timeout must be greater than 0".to_string(),
            ));
        }

        if self.chart.width < 100 || self.chart.height < 100 {
            return Err(StockError::ConfigError(format!(
                "chart size {}x{} is too small",
                self.chart.width, self.chart.height
            )));
        }

        Ok(())
    }
}

/// Builder for [`AssistantConfig`]
#[derive(Debug, Default)]
pub struct AssistantConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    system_prompt: Option<String>,
    market_timeout: Option<Duration>,
    chart: Option<ChartOptions>,
}

impl AssistantConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn market_timeout(mut self, timeout: Duration) -> Self {
        self.market_timeout = Some(timeout);
        self
    }

    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart = Some(ChartOptions { width, height });
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AssistantConfig> {
        let defaults = AssistantConfig::default();

        let config = AssistantConfig {
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            system_prompt: self.system_prompt.or(defaults.system_prompt),
            market_timeout: self.market_timeout.unwrap_or(defaults.market_timeout),
            chart: self.chart.unwrap_or(defaults.chart),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssistantConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!(config.system_prompt.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = AssistantConfig::builder()
            .model("gpt-4o-mini")
            .max_tokens(256)
            .temperature(0.2)
            .system_prompt("You are a stock analysis assistant.")
            .market_timeout(Duration::from_secs(5))
            .chart_size(800, 400)
            .build()
            .unwrap();

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.market_timeout, Duration::from_secs(5));
        assert_eq!(config.chart.width, 800);
    }

    #[test]
    fn test_validation() {
        assert!(AssistantConfig::builder().model(" ").build().is_err());
        assert!(AssistantConfig::builder().max_tokens(0).build().is_err());
        assert!(AssistantConfig::builder().temperature(3.5).build().is_err());
        assert!(
            AssistantConfig::builder()
                .market_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
        assert!(AssistantConfig::builder().chart_size(10, 10).build().is_err());
    }
}
