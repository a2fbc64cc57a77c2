use crate::{
    error::FormError,
    form::{
        record::FormRecord,
        schema::{ChannelKind, FormSchema},
        store::{FormStore, Snapshot},
        validator::Validator,
    },
    pipeline::{
        assembler::{Clock, SystemClock, assemble, assemble_partitioned},
        controller::PostSubmissionController,
        dispatcher::{Delivery, Dispatcher},
    },
    trace::{logger::TraceLogger, trace::TraceEvent},
};

/// Result of a submit action that was not rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Endpoint acknowledged the record; the form has been reset
    Acknowledged { identifier: Option<String>, status: u16 },

    /// Record handed to the form post; summary shown, payment hand-off scheduled
    Posted { record: FormRecord },

    /// A submission is already in flight or the summary is shown
    Ignored,
}

/// Record assembled and `Submitting` entered, not yet dispatched.
#[derive(Debug)]
pub struct PendingSubmission {
    record: FormRecord,
    snapshot: Snapshot,
}

impl PendingSubmission {
    pub fn record(&self) -> &FormRecord {
        &self.record
    }
}

/// One form's store, rules, channel and post-submission handling.
pub struct FormPipeline {
    store: FormStore,
    validator: Validator,
    dispatcher: Dispatcher,
    controller: PostSubmissionController,
    clock: Box<dyn Clock>,
    tracer: TraceLogger,
    step: u64,
}

impl FormPipeline {
    pub fn new(
        schema: FormSchema,
        dispatcher: Dispatcher,
        controller: PostSubmissionController,
    ) -> Result<Self, FormError> {
        let validator = Validator::new(&schema)?;
        if dispatcher.channel() != schema.channel {
            tracing::warn!(
                form = %schema.name,
                "dispatcher channel {:?} differs from schema channel {:?}",
                dispatcher.channel(),
                schema.channel
            );
        }

        Ok(Self {
            store: FormStore::mount(schema),
            validator,
            dispatcher,
            controller,
            clock: Box::new(SystemClock),
            tracer: TraceLogger::disabled(),
            step: 0,
        })
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn store(&self) -> &FormStore {
        &self.store
    }

    pub fn controller(&self) -> &PostSubmissionController {
        &self.controller
    }

    /// Configuration error when the form's channel has no endpoint.
    pub fn ensure_configured(&self) -> Result<(), FormError> {
        self.dispatcher.ensure_configured()
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        self.store.set_field(name, value)
    }

    pub fn set_fields<'a, I>(&mut self, values: I) -> Result<(), FormError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.store.set_fields(values)
    }

    /// Validate, assemble, dispatch and settle in one call.
    pub fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        match self.begin()? {
            Some(pending) => self.complete(pending),
            None => Ok(SubmitOutcome::Ignored),
        }
    }

    /// First half of a submit: reject invalid or unconfigured attempts,
    /// then enter `Submitting` and assemble the payload.
    ///
    /// `Ok(None)` while another submission is in flight.
    pub fn begin(&mut self) -> Result<Option<PendingSubmission>, FormError> {
        if self.store.is_submitting() {
            self.trace("ignored_in_flight");
            return Ok(None);
        }

        if let Err(e) = self.dispatcher.ensure_configured() {
            self.trace_event(self.event("rejected_configuration").with_error(&e));
            return Err(e);
        }

        let candidate = assemble(self.store.visible(), self.store.hidden());
        let report = self.validator.validate(&candidate);
        if !report.is_valid() {
            let failed = report.failed_fields();
            self.trace_event(
                self.event("rejected_validation")
                    .with_failed_fields(&failed),
            );
            return Err(FormError::Validation(report));
        }

        let Some(snapshot) = self.store.begin_submission() else {
            self.trace("ignored_read_only");
            return Ok(None);
        };

        let record = match (self.store.schema().channel, &self.store.schema().partition) {
            (ChannelKind::FireAndForget, Some(partition)) => assemble_partitioned(
                &snapshot.visible,
                &snapshot.hidden,
                partition,
                self.clock.as_ref(),
            ),
            _ => assemble(&snapshot.visible, &snapshot.hidden),
        };

        self.trace_event(self.event("submitting").with_payload(&record));
        Ok(Some(PendingSubmission { record, snapshot }))
    }

    /// Second half of a submit: dispatch the pending record and settle.
    pub fn complete(&mut self, pending: PendingSubmission) -> Result<SubmitOutcome, FormError> {
        let PendingSubmission { record, snapshot } = pending;
        let identifier = self.store.identifier().map(str::to_string);

        match self.dispatcher.dispatch(record.clone()) {
            Ok(Delivery::Acknowledged(ack)) => {
                self.controller.on_acknowledged(&mut self.store);
                self.trace_event(
                    self.event("acknowledged")
                        .with_identifier(identifier.as_deref())
                        .with_payload(&record),
                );
                tracing::info!(form = %self.store.schema().name, status = ack.status, "record acknowledged");
                Ok(SubmitOutcome::Acknowledged {
                    identifier,
                    status: ack.status,
                })
            }
            Ok(Delivery::Posted) => {
                self.controller.on_posted(&mut self.store, snapshot);
                self.trace_event(self.event("posted").with_payload(&record));
                tracing::info!(form = %self.store.schema().name, "record posted, payment hand-off scheduled");
                Ok(SubmitOutcome::Posted { record })
            }
            Err(e) => {
                self.controller.on_failed(&mut self.store, &e);
                if e.is_local() {
                    self.store.mark_idle();
                }
                self.trace_event(
                    self.event("failed")
                        .with_identifier(identifier.as_deref())
                        .with_error(&e),
                );
                tracing::warn!(form = %self.store.schema().name, "submission failed: {}", e);
                Err(e)
            }
        }
    }

    /// Return from the summary to an empty, editable form. Returns `false`
    /// and leaves the form untouched when no summary is shown.
    pub fn edit(&mut self) -> bool {
        if !self.controller.edit(&mut self.store) {
            return false;
        }
        self.trace("edit");
        true
    }

    /// Block until a scheduled payment hand-off has run.
    pub fn wait_for_handoff(&mut self) -> bool {
        self.controller.wait_for_handoff()
    }

    fn event(&self, name: &str) -> TraceEvent {
        TraceEvent::now(self.step, &self.store.schema().name, self.store.state(), name)
            .with_channel(self.dispatcher.channel())
            .with_identifier(self.store.identifier())
    }

    fn trace(&mut self, name: &str) {
        let event = self.event(name);
        self.trace_event(event);
    }

    fn trace_event(&mut self, event: TraceEvent) {
        self.step += 1;
        self.tracer.log(&event);
    }
}
