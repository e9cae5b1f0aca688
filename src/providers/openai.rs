use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: Option<String>
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

// ===== OpenAI Client =====

/// Chat-completions client for OpenAI-compatible endpoints.
///
/// Holds no per-request state, so one instance can serve concurrent
/// prompts.
#[derive(Debug, Clone)]
pub struct OpenAiClient
{   api_key: Option<String>
  , api_base: String
  , model: String
  , http_client: reqwest::Client
}

impl OpenAiClient
{   pub fn new(config: &crate::config::GatewayConfig)
      -> Result<Self, crate::error::Error>
    {   debug!("Creating OpenAiClient for model: {}", config.model);
        let http_client = reqwest::Client::builder()
          .timeout(config.timeout())
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(OpenAiClient
        {   api_key: config.api_key.clone()
          , api_base: config.api_base.clone()
          , model: config.model.clone()
          , http_client
        })
    }

    pub fn model(&self) -> &str
    {   &self.model
    }

    fn api_key(&self) -> Result<&str, crate::error::Error>
    {   self.api_key.as_deref().ok_or_else(|| {
          error!("No API key configured");
          crate::error::Error::MissingApiKey("OpenAI".to_string())
        })
    }

    async fn send_chat(&self, prompt: &str)
      -> Result<String, crate::error::Error>
    {   let api_key = self.api_key()?;

        let request = ChatCompletionRequest
        {   model: self.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: Some(prompt.to_string())
              }
            ]
        };

        trace!("OpenAI request: {:?}", request);

        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .bearer_auth(api_key)
          .json(&request)
          .send()
          .await
          .map_err(map_transport_error)?;

        let status = response.status();
        trace!("OpenAI response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(crate::error::Error::ApiError(
              format!("OpenAI error {}: {}", status, error_text)
            ));
        }

        let chat_response: ChatCompletionResponse
          = response.json().await.map_err(|e| {
            if e.is_timeout()
            {   return crate::error::Error::Timeout;
            }
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        let choice = chat_response.choices.into_iter()
          .next()
          .ok_or_else(|| {
            error!("No choices in response");
            crate::error::Error::NoChoicesInResponse
          })?;

        trace!("Finish reason: {:?}", choice.finish_reason);

        let text = choice.message.content
          .map(|content| content.trim().to_string())
          .unwrap_or_default();
        if text.is_empty()
        {   error!("Empty completion in response");
            return Err(crate::error::Error::EmptyCompletion);
        }
        Ok(text)
    }
}

#[async_trait]
impl super::CompletionProvider for OpenAiClient
{   async fn complete(&self, prompt: &str)
      -> Result<String, crate::error::Error>
    {   debug!("Sending prompt to model: {}", self.model);
        self.send_chat(prompt).await
    }
}

fn map_transport_error(e: reqwest::Error) -> crate::error::Error
{   if e.is_timeout()
    {   error!("OpenAI request timed out: {}", e);
        return crate::error::Error::Timeout;
    }
    error!("HTTP error: {}", e);
    crate::error::Error::HttpError(e.to_string())
}
