use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::FormError,
    form::store::{FormStore, FormView, Snapshot},
    pipeline::handoff::{
        ConsoleHandoff, DEFAULT_REDIRECT_DELAY_MS, DelayedTask, PaymentDestination, PaymentHandoff,
    },
};

/// Applies the state transitions that follow a dispatch.
pub struct PostSubmissionController {
    destination: PaymentDestination,
    redirect_delay: Duration,
    handoff: Arc<dyn PaymentHandoff>,
    pending: Option<DelayedTask>,
}

impl Default for PostSubmissionController {
    fn default() -> Self {
        Self::new(
            PaymentDestination::default(),
            Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            Arc::new(ConsoleHandoff),
        )
    }
}

impl PostSubmissionController {
    pub fn new(
        destination: PaymentDestination,
        redirect_delay: Duration,
        handoff: Arc<dyn PaymentHandoff>,
    ) -> Self {
        Self {
            destination,
            redirect_delay,
            handoff,
            pending: None,
        }
    }

    pub fn destination(&self) -> &PaymentDestination {
        &self.destination
    }

    /// Acknowledged delivery: wipe user input, issue a new identifier,
    /// restore fixed tags, raise the success flag.
    pub fn on_acknowledged(&self, store: &mut FormStore) {
        store.clear_visible();
        store.reseed_hidden();
        store.mark_succeeded();
    }

    /// Failed delivery: keep user input, surface the error, allow retry.
    pub fn on_failed(&self, store: &mut FormStore, error: &FormError) {
        store.mark_failed(error.to_string());
    }

    /// Record posted: show the read-only summary and schedule the payment
    /// hand-off after the redirect delay.
    pub fn on_posted(&mut self, store: &mut FormStore, snapshot: Snapshot) {
        store.show_summary(snapshot);
        store.mark_succeeded();

        if let Some(mut previous) = self.pending.take() {
            previous.cancel();
        }

        let handoff = Arc::clone(&self.handoff);
        let destination = self.destination.clone();
        self.pending = Some(DelayedTask::schedule(self.redirect_delay, move || {
            handoff.hand_off(&destination);
        }));
    }

    /// Leave the summary: cancel a pending hand-off, drop the submitted
    /// snapshot and reset every field. No-op unless the summary is shown.
    pub fn edit(&mut self, store: &mut FormStore) -> bool {
        if store.view() != FormView::Summary {
            return false;
        }
        if let Some(mut task) = self.pending.take() {
            task.cancel();
        }
        store.show_editor();
        store.clear_visible();
        store.reseed_hidden();
        true
    }

    pub fn handoff_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Block until the scheduled hand-off has run. Returns whether it fired.
    pub fn wait_for_handoff(&mut self) -> bool {
        self.pending.take().is_some_and(DelayedTask::wait)
    }
}
