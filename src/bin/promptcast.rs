//! Terminal front end: one prompt per line, answers typed out as they
//! are revealed.

use std::io::Write;
use std::sync::Arc;
use log::{debug, error};
use tokio::io::{AsyncBufReadExt, BufReader};
use promptcast::config::ClientConfig;
use promptcast::request::validate_prompt;
use promptcast::{GatewayClient, Phase, PromptSession, ViewState};

#[tokio::main]
async fn main()
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("warn")
    ).init();

    if let Err(e) = run().await
    {   error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), promptcast::Error>
{   let config = ClientConfig::from_env()?;
    let client = GatewayClient::new(&config)?;
    debug!("Using gateway {}", client.endpoint());

    let (session, mut frames)
      = PromptSession::new(Arc::new(client), config.reveal_interval());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut previous = ViewState::default();
    let mut submitted = 0u64;

    prompt_marker();
    loop
    { tokio::select!
      { line = lines.next_line() => {
          match line
          {   Ok(Some(line)) => {
                if validate_prompt(&line).is_ok()
                {   submitted += 1;
                }
                session.submit(line)?
              }
            , Ok(None) => break
            , Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
              }
          }
        }
      , Some(frame) = frames.recv() => {
          render(&previous, &frame);
          previous = frame;
        }
      }
    }

    // Input ended; let the newest submission play out first.
    while !finished(&previous, submitted)
    {   match frames.recv().await
        {   Some(frame) => {
              render(&previous, &frame);
              previous = frame;
            }
          , None => break
        }
    }

    println!();
    session.shutdown().await
}

/// True once the view has caught up with the `submitted`-th accepted
/// prompt and nothing is in flight
fn finished(view: &ViewState, submitted: u64) -> bool
{   view.seq >= submitted && view.is_settled()
}

fn render(previous: &ViewState, frame: &ViewState)
{   let mut out = std::io::stdout().lock();

    if frame.validation.is_some() && frame.validation != previous.validation
    {   let _ = writeln!(out, "{}", frame.validation.as_deref().unwrap_or_default());
        drop(out);
        prompt_marker();
        return;
    }

    if frame.seq != previous.seq
    {   if previous.phase == Phase::Revealing
        {   let _ = writeln!(out);
        }
        if let Some(notification) = &frame.notification
        {   let _ = writeln!(
              out, "{} {}", notification.title, notification.description
            );
        }
        return;
    }

    if frame.revealed_text.len() > previous.revealed_text.len()
    {   let _ = write!(out, "{}", &frame.revealed_text[previous.revealed_text.len()..]);
        let _ = out.flush();
    }

    if frame.phase != previous.phase
    {   match frame.phase
        {   Phase::Complete => {
              let _ = writeln!(out);
              drop(out);
              prompt_marker();
            }
          , Phase::Errored => {
              let _ = writeln!(
                out, "Error: {}", frame.error.as_deref().unwrap_or_default()
              );
              drop(out);
              prompt_marker();
            }
          , _ => {}
        }
    }
}

fn prompt_marker()
{   let mut out = std::io::stdout().lock();
    let _ = write!(out, "> ");
    let _ = out.flush();
}
