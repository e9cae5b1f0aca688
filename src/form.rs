//! Prompt form state machine
//!
//! All lifecycle rules live in [`transition`], a pure function from the
//! current [`ViewState`] and an [`Event`] to the next state plus the
//! [`Effect`]s the owner must carry out, in order. The reveal timer exists
//! exactly while the phase is [`Phase::Revealing`]: every `StartReveal`
//! enters that phase and every way out of it emits one `CancelReveal`.

use crate::error::Error;
use crate::request::{validate_prompt, PROMPT_REQUIRED};

pub const SUBMITTING_TITLE: &str = "Submitting...";
pub const SUBMITTING_DESCRIPTION: &str = "Generating a Response.";
pub const FALLBACK_ERROR: &str = "Something went wrong";
pub const NETWORK_ERROR: &str = "Error fetching response";
pub const TIMEOUT_ERROR: &str = "Timed out waiting for a response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase
{   /// Form only
    #[default]
    Idle
  , /// Waiting on the gateway
    Submitting
  , /// Appending one character per tick
    Revealing
  , /// Terminal substate of revealing: everything shown, timer gone
    Complete
  , /// Alert shown until the next submission
    Errored
}

/// Transient toast shown while a prompt is in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification
{   pub title: String
  , pub description: String
}

impl Notification
{   pub fn submitting() -> Self
    {   Notification
        {   title: SUBMITTING_TITLE.to_string()
          , description: SUBMITTING_DESCRIPTION.to_string()
        }
    }
}

/// Everything the page renders
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState
{   pub phase: Phase
  , /// Sequence number of the newest accepted submission
    pub seq: u64
  , pub full_text: String
  , /// Always a prefix of `full_text`
    pub revealed_text: String
  , pub error: Option<String>
  , /// Field-level message under the prompt input
    pub validation: Option<String>
  , pub notification: Option<Notification>
}

impl ViewState
{   pub fn is_loading(&self) -> bool
    {   self.phase == Phase::Submitting
    }

    pub fn timer_active(&self) -> bool
    {   self.phase == Phase::Revealing
    }

    /// Nothing in flight and nothing left to reveal
    pub fn is_settled(&self) -> bool
    {   matches!(self.phase, Phase::Idle | Phase::Complete | Phase::Errored)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event
{   /// User pressed submit with the field's current contents
    Submit(String)
  , /// Gateway call for submission `seq` finished
    Response
    {   seq: u64
      , result: Result<String, Error>
    }
  , /// Reveal timer for submission `seq` fired
    Tick { seq: u64 }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect
{   /// Stop and drop the running reveal timer
    CancelReveal
  , Notify(Notification)
  , DismissNotification
  , SendRequest
    {   seq: u64
      , prompt: String
    }
  , /// Start a repeating timer that feeds `Event::Tick { seq }`
    StartReveal { seq: u64 }
}

pub fn transition(state: ViewState, event: Event)
  -> (ViewState, Vec<Effect>)
{   match event
    {   Event::Submit(prompt) => on_submit(state, prompt)
      , Event::Response { seq, result } => on_response(state, seq, result)
      , Event::Tick { seq } => on_tick(state, seq)
    }
}

fn on_submit(mut state: ViewState, prompt: String)
  -> (ViewState, Vec<Effect>)
{   if validate_prompt(&prompt).is_err()
    {   state.validation = Some(PROMPT_REQUIRED.to_string());
        return (state, Vec::new());
    }

    let mut effects = Vec::with_capacity(3);
    if state.timer_active()
    {   effects.push(Effect::CancelReveal);
    }

    let notification = Notification::submitting();
    state.seq += 1;
    state.phase = Phase::Submitting;
    state.full_text.clear();
    state.revealed_text.clear();
    state.error = None;
    state.validation = None;
    state.notification = Some(notification.clone());

    effects.push(Effect::Notify(notification));
    effects.push(Effect::SendRequest { seq: state.seq, prompt });
    (state, effects)
}

fn on_response(
  mut state: ViewState
, seq: u64
, result: Result<String, Error>
) -> (ViewState, Vec<Effect>)
{   // Superseded by a newer submission.
    if seq != state.seq || state.phase != Phase::Submitting
    {   return (state, Vec::new());
    }

    let mut effects = vec![Effect::DismissNotification];
    state.notification = None;

    match result
    {   Ok(text) => {
          state.full_text = text;
          state.revealed_text.clear();
          if state.full_text.is_empty()
          {   state.phase = Phase::Complete;
          } else
          {   state.phase = Phase::Revealing;
              effects.push(Effect::StartReveal { seq });
          }
        }
      , Err(e) => {
          state.phase = Phase::Errored;
          state.error = Some(error_message(&e));
        }
    }
    (state, effects)
}

fn on_tick(mut state: ViewState, seq: u64)
  -> (ViewState, Vec<Effect>)
{   if seq != state.seq || !state.timer_active()
    {   return (state, Vec::new());
    }

    let offset = state.revealed_text.len();
    if let Some(next) = state.full_text[offset..].chars().next()
    {   state.revealed_text.push(next);
    }

    if state.revealed_text.len() == state.full_text.len()
    {   state.phase = Phase::Complete;
        return (state, vec![Effect::CancelReveal]);
    }
    (state, Vec::new())
}

/// Text for the alert region
pub fn error_message(error: &Error) -> String
{   match error
    {   Error::Rejected { message: Some(message), .. }
          if !message.is_empty() => message.clone()
      , Error::Rejected { .. } => FALLBACK_ERROR.to_string()
      , Error::Timeout => TIMEOUT_ERROR.to_string()
      , _ => NETWORK_ERROR.to_string()
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    /// Replays events and checks the timer bookkeeping on every step
    struct Harness
    {   state: ViewState
      , timer_active: bool
      , starts: usize
      , cancels: usize
      , sent: Vec<(u64, String)>
    }

    impl Harness
    {   fn new() -> Self
        {   Harness
            {   state: ViewState::default()
              , timer_active: false
              , starts: 0
              , cancels: 0
              , sent: Vec::new()
            }
        }

        fn apply(&mut self, event: Event) -> Vec<Effect>
        {   let state = std::mem::take(&mut self.state);
            let (next, effects) = transition(state, event);
            for effect in &effects
            {   match effect
                {   Effect::StartReveal { .. } => {
                      assert!(!self.timer_active, "timer started twice");
                      self.timer_active = true;
                      self.starts += 1;
                    }
                  , Effect::CancelReveal => {
                      assert!(self.timer_active, "cancelled without a timer");
                      self.timer_active = false;
                      self.cancels += 1;
                    }
                  , Effect::SendRequest { seq, prompt } => {
                      self.sent.push((*seq, prompt.clone()));
                    }
                  , _ => {}
                }
            }
            assert_eq!(self.timer_active, next.timer_active());
            assert!(next.full_text.starts_with(&next.revealed_text));
            self.state = next;
            effects
        }

        fn tick(&mut self) -> Vec<Effect>
        {   let seq = self.state.seq;
            self.apply(Event::Tick { seq })
        }

        fn respond(&mut self, result: Result<String, Error>)
        {   let seq = self.state.seq;
            self.apply(Event::Response { seq, result });
        }
    }

    #[test]
    fn hello_reveals_one_character_per_tick()
    {   let mut h = Harness::new();
        h.apply(Event::Submit("greet me".to_string()));
        h.respond(Ok("Hello".to_string()));
        assert_eq!(h.state.phase, Phase::Revealing);
        assert_eq!(h.state.revealed_text, "");

        let mut frames = Vec::new();
        for _ in 0..5
        {   h.tick();
            frames.push(h.state.revealed_text.clone());
        }
        assert_eq!(frames, vec!["H", "He", "Hel", "Hell", "Hello"]);
        assert_eq!(h.state.phase, Phase::Complete);
        assert_eq!((h.starts, h.cancels), (1, 1));

        // Late ticks already in flight change nothing.
        assert!(h.tick().is_empty());
        assert!(h.tick().is_empty());
        assert_eq!(h.state.revealed_text, "Hello");
        assert_eq!(h.cancels, 1);
    }

    #[test]
    fn blank_prompt_sets_validation_and_sends_nothing()
    {   let mut h = Harness::new();
        for blank in ["", "   ", "\t\n"]
        {   let effects = h.apply(Event::Submit(blank.to_string()));
            assert!(effects.is_empty());
        }
        assert!(h.sent.is_empty());
        assert_eq!(h.state.phase, Phase::Idle);
        assert_eq!(h.state.validation.as_deref(), Some(PROMPT_REQUIRED));

        h.apply(Event::Submit("ok".to_string()));
        assert_eq!(h.state.validation, None);
    }

    #[test]
    fn valid_submit_sends_prompt_as_typed()
    {   let mut h = Harness::new();
        let effects = h.apply(Event::Submit("  spaced  ".to_string()));
        assert_eq!(
          effects,
          vec![
            Effect::Notify(Notification::submitting()),
            Effect::SendRequest { seq: 1, prompt: "  spaced  ".to_string() },
          ]
        );
        assert!(h.state.is_loading());
    }

    #[test]
    fn rejection_shows_gateway_message_without_timer()
    {   let mut h = Harness::new();
        h.apply(Event::Submit("x".to_string()));
        h.respond(Err(Error::Rejected
        {   status: 400
          , message: Some("Prompt is required".to_string())
        }));
        assert_eq!(h.state.phase, Phase::Errored);
        assert_eq!(h.state.error.as_deref(), Some("Prompt is required"));
        assert_eq!(h.state.notification, None);
        assert_eq!(h.starts, 0);
        assert!(h.tick().is_empty());
    }

    #[test]
    fn error_messages_fall_back_by_kind()
    {   assert_eq!(
          error_message(&Error::Rejected { status: 500, message: None }),
          FALLBACK_ERROR
        );
        assert_eq!(
          error_message(&Error::Rejected { status: 500, message: Some(String::new()) }),
          FALLBACK_ERROR
        );
        assert_eq!(
          error_message(&Error::NetworkFailure("offline".to_string())),
          NETWORK_ERROR
        );
        assert_eq!(error_message(&Error::Timeout), TIMEOUT_ERROR);
    }

    #[test]
    fn error_persists_until_next_submission()
    {   let mut h = Harness::new();
        h.apply(Event::Submit("x".to_string()));
        h.respond(Err(Error::NetworkFailure("offline".to_string())));
        assert_eq!(h.state.error.as_deref(), Some(NETWORK_ERROR));

        h.apply(Event::Submit("y".to_string()));
        assert_eq!(h.state.error, None);
        assert_eq!(h.state.phase, Phase::Submitting);
    }

    #[test]
    fn resubmitting_mid_reveal_cancels_first_and_shows_only_newest()
    {   let mut h = Harness::new();
        h.apply(Event::Submit("first".to_string()));
        h.respond(Ok("AAAA".to_string()));
        h.tick();
        h.tick();
        assert_eq!(h.state.revealed_text, "AA");

        let effects = h.apply(Event::Submit("second".to_string()));
        assert_eq!(effects.first(), Some(&Effect::CancelReveal));
        assert_eq!(h.state.revealed_text, "");

        // Ticks from the old timer are stale.
        assert!(h.apply(Event::Tick { seq: 1 }).is_empty());
        h.respond(Ok("BB".to_string()));
        assert!(h.apply(Event::Tick { seq: 1 }).is_empty());
        h.tick();
        h.tick();
        assert_eq!(h.state.revealed_text, "BB");
        assert_eq!(h.state.phase, Phase::Complete);
        assert_eq!((h.starts, h.cancels), (2, 2));
    }

    #[test]
    fn last_response_wins_when_resubmitting_while_submitting()
    {   let mut h = Harness::new();
        h.apply(Event::Submit("first".to_string()));
        h.apply(Event::Submit("second".to_string()));
        assert_eq!(h.sent, vec![(1, "first".to_string()), (2, "second".to_string())]);

        // Late answer to the first prompt is dropped.
        let effects = h.apply(Event::Response { seq: 1, result: Ok("old".to_string()) });
        assert!(effects.is_empty());
        assert_eq!(h.state.phase, Phase::Submitting);

        h.respond(Ok("new".to_string()));
        while h.state.phase == Phase::Revealing
        {   h.tick();
        }
        assert_eq!(h.state.revealed_text, "new");
    }

    #[test]
    fn duplicate_response_is_ignored()
    {   let mut h = Harness::new();
        h.apply(Event::Submit("x".to_string()));
        h.respond(Ok("ab".to_string()));
        let effects = h.apply(Event::Response { seq: 1, result: Ok("zz".to_string()) });
        assert!(effects.is_empty());
        assert_eq!(h.state.full_text, "ab");
    }

    #[test]
    fn multibyte_text_reveals_whole_characters()
    {   let text = "héllo 🌍!";
        let mut h = Harness::new();
        h.apply(Event::Submit("x".to_string()));
        h.respond(Ok(text.to_string()));

        let mut ticks = 0;
        while h.state.phase == Phase::Revealing
        {   let before = h.state.revealed_text.chars().count();
            h.tick();
            assert_eq!(h.state.revealed_text.chars().count(), before + 1);
            ticks += 1;
        }
        assert_eq!(ticks, text.chars().count());
        assert_eq!(h.state.revealed_text, text);
    }

    #[test]
    fn settles_only_after_answer_or_error()
    {   let mut h = Harness::new();
        assert!(h.state.is_settled());
        h.apply(Event::Submit("x".to_string()));
        assert!(!h.state.is_settled());
        h.respond(Ok("ab".to_string()));
        assert!(!h.state.is_settled());
        h.tick();
        h.tick();
        assert!(h.state.is_settled());

        h.apply(Event::Submit("y".to_string()));
        h.respond(Err(Error::Timeout));
        assert!(h.state.is_settled());
    }

    #[test]
    fn empty_text_completes_without_timer()
    {   let mut h = Harness::new();
        h.apply(Event::Submit("x".to_string()));
        h.respond(Ok(String::new()));
        assert_eq!(h.state.phase, Phase::Complete);
        assert_eq!(h.starts, 0);
    }

    #[test]
    fn blank_submit_during_reveal_leaves_timer_running()
    {   let mut h = Harness::new();
        h.apply(Event::Submit("x".to_string()));
        h.respond(Ok("abc".to_string()));
        h.tick();

        assert!(h.apply(Event::Submit(" ".to_string())).is_empty());
        assert_eq!(h.state.phase, Phase::Revealing);
        h.tick();
        h.tick();
        assert_eq!(h.state.revealed_text, "abc");
    }
}
