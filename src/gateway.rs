//! Completion gateway: `POST /api/generate`

use std::future::Future;
use std::sync::Arc;
use axum::{
  body::Bytes,
  extract::{rejection::BytesRejection, State},
  http::StatusCode,
  routing::post,
  Json, Router,
};
use log::{debug, error, info};
use crate::error::{Error, ErrorKind};
use crate::providers::CompletionProvider;
use crate::request::{validate_prompt, CompletionResult, PromptRequest};

pub const GENERATE_PATH: &str = "/api/generate";

const PROVIDER_FAILURE_MESSAGE: &str
  = "Error generating response from the completion provider";
const PROVIDER_TIMEOUT_MESSAGE: &str
  = "Timed out waiting for the completion provider";
const METHOD_NOT_ALLOWED_MESSAGE: &str
  = "Only POST requests are allowed";
const BODY_TOO_LARGE_MESSAGE: &str
  = "Request body is too large";

#[derive(Clone)]
pub struct GatewayState
{   provider: Arc<dyn CompletionProvider>
}

/// Validate `prompt` and ask the provider for a completion.
///
/// Blank prompts fail with `InvalidArgument` before the provider is
/// touched. Provider errors are logged here and returned unchanged; turning
/// them into a caller-safe message is the job of [`envelope`].
pub async fn generate(
  provider: &dyn CompletionProvider
, prompt: &str
) -> Result<String, Error>
{   let prompt = validate_prompt(prompt)?;

    match provider.complete(prompt).await
    {   Ok(text) if text.trim().is_empty() => {
          error!("Completion provider returned an empty response");
          Err(Error::EmptyCompletion)
        }
      , Ok(text) => {
          info!("AI response: {}", text);
          Ok(text)
        }
      , Err(e) => {
          error!("Error calling completion provider: {:?}", e);
          Err(e)
        }
    }
}

/// Map the outcome of [`generate`] to a status and response envelope
pub fn envelope(result: Result<String, Error>)
  -> (StatusCode, CompletionResult)
{   match result
    {   Ok(text) => (StatusCode::OK, CompletionResult::text(text))
      , Err(e) => match e.kind()
        {   ErrorKind::InvalidArgument => {
              let message = match e
              {   Error::InvalidArgument(message) => message
                , other => other.to_string()
              };
              (StatusCode::BAD_REQUEST, CompletionResult::message(message))
            }
          , ErrorKind::Timeout => (
              StatusCode::GATEWAY_TIMEOUT,
              CompletionResult::message(PROVIDER_TIMEOUT_MESSAGE)
            )
          , ErrorKind::ProviderFailure
          | ErrorKind::NetworkFailure
          | ErrorKind::Other => (
              StatusCode::INTERNAL_SERVER_ERROR,
              CompletionResult::message(PROVIDER_FAILURE_MESSAGE)
            )
        }
    }
}

pub fn router(provider: Arc<dyn CompletionProvider>) -> Router
{   Router::new()
      .route(
        GENERATE_PATH,
        post(generate_handler).fallback(method_not_allowed)
      )
      .fallback(not_found)
      .with_state(GatewayState { provider })
}

async fn generate_handler(
  State(state): State<GatewayState>
, body: Result<Bytes, BytesRejection>
) -> (StatusCode, Json<CompletionResult>)
{   let body = match body
    {   Ok(body) => body
      , Err(rejection) => return rejected_body(rejection)
    };
    let result = match PromptRequest::from_body(&body)
    {   Ok(request) => {
          debug!("Received prompt of {} bytes", request.prompt.len());
          generate(state.provider.as_ref(), &request.prompt).await
        }
      , Err(e) => Err(e)
    };
    let (status, payload) = envelope(result);
    (status, Json(payload))
}

/// Unreadable bodies still get an envelope, never axum's plain text
fn rejected_body(rejection: BytesRejection)
  -> (StatusCode, Json<CompletionResult>)
{   debug!("Rejected request body: {}", rejection.body_text());
    let status = rejection.status();
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE
    {   BODY_TOO_LARGE_MESSAGE
    } else
    {   crate::request::PROMPT_REQUIRED
    };
    (status, Json(CompletionResult::message(message)))
}

async fn method_not_allowed() -> (StatusCode, Json<CompletionResult>)
{   (
      StatusCode::METHOD_NOT_ALLOWED,
      Json(CompletionResult::message(METHOD_NOT_ALLOWED_MESSAGE))
    )
}

async fn not_found() -> (StatusCode, Json<CompletionResult>)
{   (StatusCode::NOT_FOUND, Json(CompletionResult::message("Not found")))
}

/// Serve the gateway on `listener` until `shutdown` resolves
pub async fn run<F>(
  listener: tokio::net::TcpListener
, provider: Arc<dyn CompletionProvider>
, shutdown: F
) -> Result<(), Error>
where F: Future<Output = ()> + Send + 'static
{   let address = listener.local_addr()
      .map_err(|e| Error::Other(e.to_string()))?;
    info!("Gateway listening on {}", address);

    axum::serve(listener, router(provider))
      .with_graceful_shutdown(shutdown)
      .await
      .map_err(|e| {
        error!("Gateway server terminated unexpectedly: {}", e);
        Error::Other(e.to_string())
      })?;

    info!("Gateway stopped");
    Ok(())
}

/// Bind the configured address and serve the OpenAI-backed gateway
/// until Ctrl-C.
pub async fn serve(config: crate::config::GatewayConfig)
  -> Result<(), Error>
{   let provider = crate::providers::OpenAiClient::new(&config)?;
    info!("Using model: {}", provider.model());

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
      .await
      .map_err(|e| Error::InvalidConfiguration(
        format!("cannot bind {}: {}", config.bind_address, e)
      ))?;

    run(listener, Arc::new(provider), shutdown_signal()).await
}

async fn shutdown_signal()
{   if let Err(e) = tokio::signal::ctrl_c().await
    {   error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
