//! HTTP client for the completion gateway

use async_trait::async_trait;
use log::{debug, trace, error};
use crate::error::Error;
use crate::request::{CompletionResult, PromptRequest};

/// Anything that can turn a prompt into generated text on the user's
/// behalf. The session loop only talks to this seam.
#[async_trait]
pub trait PromptGateway: Send + Sync
{   async fn generate(&self, prompt: &str) -> Result<String, Error>;
}

/// Talks to `POST /api/generate` on a running gateway
#[derive(Debug, Clone)]
pub struct GatewayClient
{   endpoint: String
  , http_client: reqwest::Client
}

impl GatewayClient
{   pub fn new(config: &crate::config::ClientConfig)
      -> Result<Self, Error>
    {   let http_client = reqwest::Client::builder()
          .timeout(config.timeout())
          .build()
          .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;

        let endpoint = format!(
          "{}{}",
          config.gateway_url.trim_end_matches('/'),
          crate::gateway::GENERATE_PATH
        );
        debug!("GatewayClient targeting {}", endpoint);

        Ok(GatewayClient
        {   endpoint
          , http_client
        })
    }

    pub fn endpoint(&self) -> &str
    {   &self.endpoint
    }
}

#[async_trait]
impl PromptGateway for GatewayClient
{   async fn generate(&self, prompt: &str) -> Result<String, Error>
    {   let response = self.http_client
          .post(&self.endpoint)
          .json(&PromptRequest::new(prompt))
          .send()
          .await
          .map_err(map_transport_error)?;

        let status = response.status();
        trace!("Gateway response status: {}", status);

        let bytes = response.bytes().await
          .map_err(map_transport_error)?;
        let envelope = serde_json::from_slice::<CompletionResult>(&bytes);

        if status != reqwest::StatusCode::OK
        {   let message = match envelope
            {   Ok(CompletionResult::Message { message }) => Some(message)
              , _ => None
            };
            debug!("Gateway rejected prompt ({}): {:?}", status, message);
            return Err(Error::Rejected
            {   status: status.as_u16()
              , message
            });
        }

        match envelope
        {   Ok(CompletionResult::Text { text }) => Ok(text)
          , Ok(CompletionResult::Message { message }) => {
              error!("Gateway sent a message with 200: {}", message);
              Err(Error::NetworkFailure(
                "unexpected message envelope".to_string()
              ))
            }
          , Err(e) => {
              error!("Malformed gateway response: {}", e);
              Err(Error::NetworkFailure(e.to_string()))
            }
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> Error
{   if e.is_timeout()
    {   error!("Gateway request timed out: {}", e);
        return Error::Timeout;
    }
    error!("Error fetching response: {}", e);
    Error::NetworkFailure(e.to_string())
}
