//! # Hand-off of callbacks to the interactive context
//!
//! Background threads never touch the state owned by the interactive context directly. Instead,
//! they post callbacks through an `InteractiveHandle`; the interactive context runs them, in
//! posting order, when it drains its `Dispatcher`.
//!
//! ```
//! use rust_bitranslator::pipelines::dispatch::dispatcher;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::sync::mpsc;
//! use std::thread;
//!
//! let (handle, dispatcher) = dispatcher();
//! let (sender, receiver) = mpsc::channel();
//! thread::spawn(move || {
//!     handle.post(move || sender.send("done").unwrap_or(()));
//! })
//! .join()
//! .unwrap();
//! assert_eq!(dispatcher.run_pending(), 1);
//! assert_eq!(receiver.recv().unwrap(), "done");
//! ```
use std::sync::mpsc;
use std::time::Duration;

type Callback = Box<dyn FnOnce() + Send>;

/// Creates a connected (`InteractiveHandle`, `Dispatcher`) pair.
pub fn dispatcher() -> (InteractiveHandle, Dispatcher) {
    let (sender, receiver) = mpsc::channel();
    (InteractiveHandle { sender }, Dispatcher { receiver })
}

/// # Sending side, cloned into background threads
#[derive(Clone)]
pub struct InteractiveHandle {
    sender: mpsc::Sender<Callback>,
}

impl InteractiveHandle {
    /// Schedules a callback on the interactive context. Returns `false` if the `Dispatcher`
    /// was dropped, in which case the callback is discarded.
    pub fn post<F>(&self, callback: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender.send(Box::new(callback)).is_ok()
    }
}

/// # Receiving side, owned by the interactive context
pub struct Dispatcher {
    receiver: mpsc::Receiver<Callback>,
}

impl Dispatcher {
    /// Runs every callback posted so far without blocking and returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut executed = 0;
        while let Ok(callback) = self.receiver.try_recv() {
            callback();
            executed += 1;
        }
        executed
    }

    /// Waits up to `timeout` for a callback, then runs it along with every other pending
    /// callback. Returns how many callbacks ran.
    pub fn wait_and_run(&self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(callback) => {
                callback();
                1 + self.run_pending()
            }
            Err(_) => 0,
        }
    }
}
