use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAYMENT_PAGE: &str = "https://pages.razorpay.com/pl_RPPYCrBxUxmkro/view";
pub const DEFAULT_PAYMENT_BUTTON: &str = "pl_RPPYCrBxUxmkro";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1_000;

/// Externally owned payment resource the user is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDestination {
    pub page_url: String,
    pub button_id: String,
}

impl Default for PaymentDestination {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAYMENT_PAGE.to_string(),
            button_id: DEFAULT_PAYMENT_BUTTON.to_string(),
        }
    }
}

/// Transfers control to the payment flow. Called from the timer thread.
pub trait PaymentHandoff: Send + Sync {
    fn hand_off(&self, destination: &PaymentDestination);
}

/// Prints the payment page for the user to open.
pub struct ConsoleHandoff;

impl PaymentHandoff for ConsoleHandoff {
    fn hand_off(&self, destination: &PaymentDestination) {
        tracing::info!(url = %destination.page_url, "handing off to payment");
        println!("Continue to payment: {}", destination.page_url);
    }
}

/// Counts hand-offs (for testing).
#[derive(Clone, Default)]
pub struct RecordingHandoff {
    calls: Arc<Mutex<Vec<PaymentDestination>>>,
}

impl RecordingHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PaymentDestination> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl PaymentHandoff for RecordingHandoff {
    fn hand_off(&self, destination: &PaymentDestination) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(destination.clone());
        }
    }
}

// ============================================================================
// One-shot delayed task
// ============================================================================

/// Runs a closure once after a delay unless cancelled first.
///
/// Dropping the handle does not cancel; the task still fires. When no timer
/// thread can be started the task runs inline on the caller after the delay.
pub struct DelayedTask {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<bool>>,
    fired_inline: bool,
}

type TimerBody = Box<dyn FnOnce() -> bool + Send + 'static>;

impl DelayedTask {
    pub fn schedule<F>(delay: Duration, task: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::schedule_with(delay, task, |body| {
            thread::Builder::new().name("delayed-task".into()).spawn(body)
        })
    }

    fn schedule_with<F, S>(delay: Duration, task: F, spawn: S) -> Self
    where
        F: FnOnce() + Send + 'static,
        S: FnOnce(TimerBody) -> io::Result<JoinHandle<bool>>,
    {
        let (tx, rx) = mpsc::channel::<()>();
        let deadline = Instant::now() + delay;

        // Shared so the task survives a failed spawn
        let slot = Arc::new(Mutex::new(Some(task)));
        let timer_slot = Arc::clone(&slot);

        let body: TimerBody = Box::new(move || {
            match rx.recv_timeout(delay) {
                Ok(()) => return false,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                }
            }
            run_once(&timer_slot)
        });

        match spawn(body) {
            Ok(handle) => Self {
                cancel: Some(tx),
                handle: Some(handle),
                fired_inline: false,
            },
            Err(e) => {
                tracing::warn!("could not start delayed task, running inline: {}", e);
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
                Self {
                    cancel: None,
                    handle: None,
                    fired_inline: run_once(&slot),
                }
            }
        }
    }

    /// Ask the task not to run. Has no effect once it has fired.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Block until the task has fired or been cancelled. Returns whether it fired.
    pub fn wait(mut self) -> bool {
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or(false),
            None => self.fired_inline,
        }
    }
}

fn run_once<F: FnOnce()>(slot: &Mutex<Option<F>>) -> bool {
    let task = slot.lock().ok().and_then(|mut task| task.take());
    match task {
        Some(task) => {
            task();
            true
        }
        None => false,
    }
}
