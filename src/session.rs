use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use log::{debug, trace, error, info, warn};
use crate::client::PromptGateway;
use crate::form::{self, Effect, Event, ViewState};
use crate::reveal::RevealTimer;
use crate::SessionFoot;

/// State owned by the session loop
struct SessionState
{   view: ViewState
  , timer: Option<RevealTimer>
  , gateway: Arc<dyn PromptGateway>
  , reveal_interval: Duration
  , events_tx: mpsc::UnboundedSender<Event>
  , frames_tx: mpsc::UnboundedSender<ViewState>
}

impl SessionState
{   /// Run one event through the form and carry out its effects
    fn dispatch(&mut self, event: Event)
    {   trace!("Dispatching {:?}", event);
        let before = self.view.clone();
        let (next, effects) = form::transition(
          std::mem::take(&mut self.view),
          event
        );
        self.view = next;

        for effect in effects
        {   self.execute(effect);
        }

        if self.view != before
        {   self.publish();
        }
    }

    fn execute(&mut self, effect: Effect)
    {   match effect
        {   Effect::CancelReveal => {
              match self.timer.take()
              {   Some(timer) => timer.cancel()
                , None => warn!("CancelReveal with no running timer")
              }
            }
          , Effect::Notify(notification) => {
              debug!(
                "{} {}",
                notification.title,
                notification.description
              );
            }
          , Effect::DismissNotification => {
              debug!("Notification dismissed");
            }
          , Effect::SendRequest { seq, prompt } => {
              debug!("Sending submission {}", seq);
              let gateway = self.gateway.clone();
              let events_tx = self.events_tx.clone();
              tokio::spawn(async move {
                let result = gateway.generate(&prompt).await;
                if let Err(e) = &result
                {   debug!("Submission {} failed: {}", seq, e);
                }
                let _ = events_tx.send(Event::Response { seq, result });
              });
            }
          , Effect::StartReveal { seq } => {
              let timer = RevealTimer::start(
                seq,
                self.reveal_interval,
                self.events_tx.clone()
              );
              if let Some(stale) = self.timer.replace(timer)
              {   warn!("Replacing reveal timer {}", stale.seq());
                  stale.cancel();
              }
            }
        }
    }

    fn publish(&self)
    {   let _ = self.frames_tx.send(self.view.clone());
    }

    fn stop_timer(&mut self)
    {   if let Some(timer) = self.timer.take()
        {   timer.cancel();
        }
    }
}

/// Public API for a prompt session - owns the task.
///
/// Each [`ViewState`] change is pushed to the frame receiver returned by
/// [`PromptSession::new`], starting with the initial idle view.
pub struct PromptSession
{   hand: crate::SessionHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl PromptSession
{   /// Create and spawn a new session loop
    /// Returns immediately - spawns background task
    pub fn new(
      gateway: Arc<dyn PromptGateway>
    , reveal_interval: Duration
    ) -> (Self, mpsc::UnboundedReceiver<ViewState>)
    {   debug!("Creating PromptSession");

        let (submit_tx, submit_rx)
          = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx)
          = mpsc::unbounded_channel();
        let (events_tx, events_rx)
          = mpsc::unbounded_channel();
        let (frames_tx, frames_rx)
          = mpsc::unbounded_channel();

        let hand = crate::SessionHand
        {   submit_tx
          , shutdown_tx
        };

        let foot = crate::SessionFoot
        {   submit_rx
          , shutdown_rx
        };

        let state = SessionState
        {   view: ViewState::default()
          , timer: None
          , gateway
          , reveal_interval
          , events_tx
          , frames_tx
        };

        let _task_handle = tokio::spawn(async move {
          run_session_loop(foot, events_rx, state).await
        });

        (PromptSession { hand, _task_handle }, frames_rx)
    }

    /// Submit the prompt field - returns immediately
    pub fn submit(&self, prompt: impl Into<String>)
      -> Result<(), crate::error::Error>
    {   self.hand.submit_tx
          .send(crate::SubmitArgs { prompt: prompt.into() })
          .map_err(|_| {
            error!("Session channel closed");
            crate::error::Error::Other(
              "Session disconnected".to_string()
            )
          })
    }

    /// Stop the reveal timer and the loop
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down PromptSession");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.hand.shutdown_tx
          .send(crate::ShutdownArgs { reply: reply_tx })
          .map_err(|_| {
            error!("Session channel already closed");
            crate::error::Error::Other(
              "Session already shutdown".to_string()
            )
          })?;

        match reply_rx.recv().await
        {   Some(result) => result
          , None => {
              error!("Session exited without confirming shutdown");
              Err(crate::error::Error::Other(
                "Session already shutdown".to_string()
              ))
            }
        }
    }
}

/// Main session event loop
///
/// Submissions, gateway responses and timer ticks are handled one at a
/// time, so the view has a single writer.
async fn run_session_loop(
  foot: SessionFoot
, mut events_rx: mpsc::UnboundedReceiver<Event>
, mut state: SessionState
)
{   debug!("Starting session loop");
    let SessionFoot
    {   mut submit_rx
      , mut shutdown_rx
    } = foot;

    state.publish();

    loop
    { tokio::select!
      { cmd = submit_rx.recv() => {
          match cmd
          {   Some(cmd) => state.dispatch(Event::Submit(cmd.prompt))
            , None => {
                debug!("Submit channel closed");
                break;
              }
          }
        }
      , Some(event) = events_rx.recv() => {
          state.dispatch(event);
        }
      , Some(cmd) = shutdown_rx.recv() => {
          state.stop_timer();
          let _ = cmd.reply.send(Ok(()));
          info!("Session shutting down");
          break;
        }
      }
    }
    state.stop_timer();
}
