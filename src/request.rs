//! Wire types shared by the gateway and the prompt client

use serde::{Deserialize, Serialize};

pub const PROMPT_REQUIRED: &str = "Prompt is required";

/// Body of `POST /api/generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest
{   /// The prompt text, sent as typed
    pub prompt: String
}

impl PromptRequest
{   pub fn new(prompt: impl Into<String>) -> Self
    {   PromptRequest { prompt: prompt.into() }
    }

    /// Parse a raw request body; anything without a string `prompt`
    /// is reported as a missing prompt.
    pub fn from_body(body: &[u8])
      -> Result<Self, crate::error::Error>
    {   serde_json::from_slice::<PromptRequest>(body)
          .map_err(|_| crate::error::Error::InvalidArgument(
            PROMPT_REQUIRED.to_string()
          ))
    }

    pub fn validate(&self) -> Result<&str, crate::error::Error>
    {   validate_prompt(&self.prompt)
    }
}

/// Reject prompts that are empty once whitespace is trimmed
pub fn validate_prompt(prompt: &str)
  -> Result<&str, crate::error::Error>
{   if prompt.trim().is_empty()
    {   return Err(crate::error::Error::InvalidArgument(
          PROMPT_REQUIRED.to_string()
        ));
    }
    Ok(prompt)
}

/// Response envelope: exactly one of the two shapes per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionResult
{   /// Generated text, sent with 200
    Text { text: String }
  , /// Failure description, sent with 4xx/5xx
    Message { message: String }
}

impl CompletionResult
{   pub fn text(text: impl Into<String>) -> Self
    {   CompletionResult::Text { text: text.into() }
    }

    pub fn message(message: impl Into<String>) -> Self
    {   CompletionResult::Message { message: message.into() }
    }
}
