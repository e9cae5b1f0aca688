//! Repeating tick source for the typewriter reveal

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use log::{debug, trace};
use crate::form::Event;

/// Handle to a running reveal timer.
///
/// The timer task sends `Event::Tick { seq }` every `period`, first one
/// a full period after start. It stops when the handle is cancelled or
/// dropped, or when the receiving side goes away. `cancel` takes the handle
/// by value, so a timer cannot be stopped twice.
#[derive(Debug)]
pub struct RevealTimer
{   seq: u64
  , task: tokio::task::JoinHandle<()>
}

impl RevealTimer
{   pub fn start(
      seq: u64
    , period: Duration
    , ticks: mpsc::UnboundedSender<Event>
    ) -> Self
    {   debug!("Starting reveal timer for submission {}", seq);
        let task = tokio::spawn(async move {
          let mut interval = interval_at(Instant::now() + period, period);
          interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
          loop
          {   interval.tick().await;
              trace!("Reveal tick for submission {}", seq);
              if ticks.send(Event::Tick { seq }).is_err()
              {   debug!("Tick receiver gone, stopping timer {}", seq);
                  break;
              }
          }
        });
        RevealTimer { seq, task }
    }

    pub fn seq(&self) -> u64
    {   self.seq
    }

    pub fn cancel(self)
    {   debug!("Cancelling reveal timer for submission {}", self.seq);
    }
}

impl Drop for RevealTimer
{   fn drop(&mut self)
    {   self.task.abort();
    }
}
