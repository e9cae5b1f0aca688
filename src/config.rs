//! Configuration for the gateway and the prompt client

use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::warn;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3000";

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig
{   /// Address the HTTP listener binds to
    pub bind_address: String
  , /// Provider API base URL
    pub api_base: String
  , /// Model used for every completion
    pub model: String
  , /// Provider request timeout in seconds
    pub timeout_secs: u64
  , /// Provider API key, never serialized
    #[serde(skip)]
    pub api_key: Option<String>
}

impl Default for GatewayConfig
{   fn default() -> Self
    {   GatewayConfig
        {   bind_address: DEFAULT_BIND_ADDRESS.to_string()
          , api_base: DEFAULT_API_BASE.to_string()
          , model: DEFAULT_MODEL.to_string()
          , timeout_secs: 30
          , api_key: None
        }
    }
}

impl GatewayConfig
{   /// Load from the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   let mut config = GatewayConfig::default();
        if let Some(bind) = lookup("PROMPTCAST_BIND")
        {   config.bind_address = bind;
        }
        if let Some(base) = lookup("OPENAI_API_BASE")
        {   config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("PROMPTCAST_MODEL")
        {   config.model = model;
        }
        if let Some(raw) = lookup("PROMPTCAST_PROVIDER_TIMEOUT_SECS")
        {   config.timeout_secs = parse_positive(
              "PROMPTCAST_PROVIDER_TIMEOUT_SECS", &raw
            )?;
        }
        config.api_key = lookup("OPENAI_API_KEY")
          .filter(|key| !key.trim().is_empty());
        if config.api_key.is_none()
        {   // Left to fail per request, not at startup.
            warn!("OPENAI_API_KEY is not set");
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }
}

/// Prompt client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig
{   /// Base URL of the gateway
    pub gateway_url: String
  , /// Delay between two revealed characters
    pub reveal_interval_ms: u64
  , /// Gateway request timeout in seconds
    pub timeout_secs: u64
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   gateway_url: DEFAULT_GATEWAY_URL.to_string()
          , reveal_interval_ms: 10
          , timeout_secs: 60
        }
    }
}

impl ClientConfig
{   pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   let mut config = ClientConfig::default();
        if let Some(url) = lookup("PROMPTCAST_GATEWAY_URL")
        {   config.gateway_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("PROMPTCAST_REVEAL_INTERVAL_MS")
        {   config.reveal_interval_ms = parse_positive(
              "PROMPTCAST_REVEAL_INTERVAL_MS", &raw
            )?;
        }
        if let Some(raw) = lookup("PROMPTCAST_CLIENT_TIMEOUT_SECS")
        {   config.timeout_secs = parse_positive(
              "PROMPTCAST_CLIENT_TIMEOUT_SECS", &raw
            )?;
        }
        Ok(config)
    }

    pub fn reveal_interval(&self) -> Duration
    {   Duration::from_millis(self.reveal_interval_ms)
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }
}

fn parse_positive(name: &str, raw: &str)
  -> Result<u64, crate::error::Error>
{   match raw.trim().parse::<u64>()
    {   Ok(0) => Err(crate::error::Error::InvalidConfiguration(
          format!("{} must be greater than zero", name)
        ))
      , Ok(value) => Ok(value)
      , Err(e) => Err(crate::error::Error::InvalidConfiguration(
          format!("{}: {}", name, e)
        ))
    }
}
