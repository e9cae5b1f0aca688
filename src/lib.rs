pub mod error;
pub mod config;
pub mod request;
pub mod providers;
pub mod gateway;
pub mod client;
pub mod form;
pub mod reveal;
pub mod session;

/*

promptcast: one prompt in, one completion out, revealed a character at
a time. The gateway half wraps a hosted chat-completion API behind
`POST /api/generate`; the client half is a session loop that owns the
form state and the reveal timer.

promptcast/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Session hand/foot types, re-exports
│   ├── error.rs        # Error enum and ErrorKind
│   ├── config.rs       # Gateway and client configuration
│   ├── request.rs      # Wire types and prompt validation
│   ├── providers/      # Completion providers
│   │   ├── mod.rs      # CompletionProvider trait
│   │   └── openai.rs   # OpenAI chat completions
│   ├── gateway.rs      # generate(), axum router, serve()
│   ├── client.rs       # PromptGateway trait, HTTP GatewayClient
│   ├── form.rs         # Pure state machine: (state, event) -> (state, effects)
│   ├── reveal.rs       # Cancellable repeating tick task
│   ├── session.rs      # Event loop running the form against a gateway
│   └── bin/
│       ├── promptcast-gateway.rs
│       └── promptcast.rs
└── tests/              # End-to-end tests over a local gateway

*/

pub use client::{GatewayClient, PromptGateway};
pub use error::{Error, ErrorKind};
pub use form::{Phase, ViewState};
pub use session::PromptSession;

/// PROMPTCAST SESSION INTERFACE:

// ===== Submit =====

pub struct SubmitArgs
{   pub prompt: String
}

// ===== Shutdown =====

pub type ShutdownReply = Result<(), crate::error::Error>;
pub type ShutdownReplySender
  = tokio::sync::mpsc::UnboundedSender<ShutdownReply>;

pub struct ShutdownArgs
{   pub reply: ShutdownReplySender
}

// ===== SessionHand (sender side) =====

pub struct SessionHand
{   pub submit_tx
      : tokio::sync::mpsc::UnboundedSender<SubmitArgs>
  , pub shutdown_tx
      : tokio::sync::mpsc::UnboundedSender<ShutdownArgs>
}

// ===== SessionFoot (receiver side) =====

pub struct SessionFoot
{   pub submit_rx
      : tokio::sync::mpsc::UnboundedReceiver<SubmitArgs>
  , pub shutdown_rx
      : tokio::sync::mpsc::UnboundedReceiver<ShutdownArgs>
}
