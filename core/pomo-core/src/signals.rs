//! SIGINT/SIGTERM as a timer cancellation source.

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crate::error::{PomoError, Result};

/// Forwards the first SIGINT or SIGTERM into a channel.
///
/// While this value is alive the default "terminate the process" action for
/// both signals is replaced, so the timer can unwind and report instead of
/// dying mid-wait. Dropping it closes the listener thread.
pub struct CancelSignal {
    receiver: Receiver<i32>,
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl CancelSignal {
    pub fn install() -> Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(PomoError::SignalSetup)?;
        let handle = signals.handle();
        let (sender, receiver) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("cancel-signal".to_string())
            .spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    tracing::debug!(signal = sig, "Cancellation signal received");
                    let _ = sender.send(sig);
                }
            })
            .map_err(PomoError::SignalSetup)?;

        Ok(Self {
            receiver,
            handle,
            thread: Some(thread),
        })
    }

    pub fn receiver(&self) -> &Receiver<i32> {
        &self.receiver
    }
}

impl Drop for CancelSignal {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
