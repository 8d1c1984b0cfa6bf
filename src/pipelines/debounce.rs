//! # Debounce controller
//!
//! Coalesces rapid input-change notifications into a single trigger fired once the input has
//! been quiet for a configured interval. Each call to `notify` cancels the pending trigger and
//! restarts the interval: only the trailing call of a burst survives.
//!
//! A single timer thread owns the pending trigger and runs it when the interval elapses. A
//! trigger is expected to hand its work off (for example by submitting a job to the
//! `TranslationWorker`) rather than performing it on the timer thread.
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

type Trigger = Box<dyn FnOnce() + Send>;

enum DebounceMessage {
    Schedule(Trigger),
    Cancel,
}

/// # Debounce controller
/// Dropping the controller drops the pending trigger without running it.
pub struct Debouncer {
    sender: mpsc::Sender<DebounceMessage>,
    interval: Duration,
    min_chars: usize,
}

impl Debouncer {
    /// Creates a controller and its timer thread.
    ///
    /// # Arguments
    ///
    /// * `interval` - quiet period after the last notification before the trigger fires
    /// * `min_chars` - inputs with fewer characters (once trimmed) are ignored
    pub fn new(interval: Duration, min_chars: usize) -> Debouncer {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || Self::timer(receiver, interval));
        Debouncer {
            sender,
            interval,
            min_chars,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Schedules `trigger` after the quiet interval, replacing any pending trigger.
    ///
    /// Returns `false` without touching the pending trigger if `input` is shorter than
    /// `min_chars`.
    pub fn notify<F>(&self, input: &str, trigger: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if input.trim().chars().count() < self.min_chars {
            trace!("input too short, not scheduling");
            return false;
        }
        self.sender
            .send(DebounceMessage::Schedule(Box::new(trigger)))
            .is_ok()
    }

    /// Drops the pending trigger, if any.
    pub fn cancel(&self) {
        let _ = self.sender.send(DebounceMessage::Cancel);
    }

    fn timer(receiver: mpsc::Receiver<DebounceMessage>, interval: Duration) {
        let mut pending: Option<Trigger> = None;
        loop {
            let message = if pending.is_some() {
                receiver.recv_timeout(interval)
            } else {
                receiver.recv().map_err(|_| RecvTimeoutError::Disconnected)
            };
            match message {
                Ok(DebounceMessage::Schedule(trigger)) => {
                    if pending.replace(trigger).is_some() {
                        trace!("rescheduled pending trigger");
                    }
                }
                Ok(DebounceMessage::Cancel) => {
                    pending = None;
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(trigger) = pending.take() {
                        debug!("input quiet for {:?}, firing", interval);
                        trigger();
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}
