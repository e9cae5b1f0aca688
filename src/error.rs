use std::fmt;

/// Custom error type for promptcast operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Prompt missing or blank
    InvalidArgument(String)
  , /// API key is missing for the provider
    MissingApiKey(String)
  , /// HTTP request to the provider failed
    HttpError(String)
  , /// Provider returned an error response
    ApiError(String)
  , /// Failed to parse provider response
    ParseError(String)
  , /// No choices in provider response
    NoChoicesInResponse
  , /// Provider answered with blank content
    EmptyCompletion
  , /// Timeout error
    Timeout
  , /// Gateway answered with a non-200 status
    Rejected
    {   status: u16
      , message: Option<String>
    }
  , /// The call to the gateway itself failed
    NetworkFailure(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

/// Coarse classification used to pick a status code or a display message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind
{   InvalidArgument
  , ProviderFailure
  , Timeout
  , NetworkFailure
  , Other
}

impl Error
{   pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::InvalidArgument(_) => ErrorKind::InvalidArgument
          , Error::MissingApiKey(_)
          | Error::HttpError(_)
          | Error::ApiError(_)
          | Error::ParseError(_)
          | Error::NoChoicesInResponse
          | Error::EmptyCompletion => ErrorKind::ProviderFailure
          , Error::Timeout => ErrorKind::Timeout
          , Error::Rejected { .. }
          | Error::NetworkFailure(_) => ErrorKind::NetworkFailure
          , Error::InvalidConfiguration(_)
          | Error::Other(_) => ErrorKind::Other
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidArgument(msg) => {
              write!(f, "Invalid argument: {}", msg)
            }
          , Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::EmptyCompletion => {
              write!(f, "API response contained an empty completion")
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Rejected { status, message } => {
              write!(f,
                "Gateway rejected request ({}): {}",
                status,
                message.as_deref().unwrap_or("no message")
              )
            }
          , Error::NetworkFailure(msg) => {
              write!(f, "Network failure: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
