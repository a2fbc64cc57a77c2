use serde::Serialize;

use crate::{
    error::FormError,
    form::{
        identifier,
        record::FormRecord,
        schema::{FormSchema, HiddenSeed},
    },
};

/// Lifecycle of the current submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Which view the form presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormView {
    Editing,
    /// Read-only summary shown after the record was posted
    Summary,
}

/// Owned copy of the store taken when a submission starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub visible: FormRecord,
    pub hidden: FormRecord,
}

/// Owns field values and submission flags for one mounted form.
#[derive(Debug)]
pub struct FormStore {
    schema: FormSchema,
    visible: FormRecord,
    hidden: FormRecord,
    state: SubmissionState,
    view: FormView,
    last_error: Option<String>,
    submitted: Option<Snapshot>,
}

impl FormStore {
    /// Empty visible fields plus freshly seeded hidden metadata.
    pub fn mount(schema: FormSchema) -> Self {
        let mut store = Self {
            visible: empty_visible(&schema),
            hidden: FormRecord::new(),
            schema,
            state: SubmissionState::Idle,
            view: FormView::Editing,
            last_error: None,
            submitted: None,
        };
        store.reseed_hidden();
        store
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn visible(&self) -> &FormRecord {
        &self.visible
    }

    pub fn hidden(&self) -> &FormRecord {
        &self.hidden
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn view(&self) -> FormView {
        self.view
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn succeeded(&self) -> bool {
        self.state == SubmissionState::Succeeded
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Record shown in the summary view, if any.
    pub fn submitted(&self) -> Option<&Snapshot> {
        self.submitted.as_ref()
    }

    /// Current value of the first hidden identifier field.
    pub fn identifier(&self) -> Option<&str> {
        self.schema
            .hidden
            .iter()
            .find(|h| h.seed == HiddenSeed::Identifier)
            .and_then(|h| self.hidden.get(&h.name))
    }

    /// Apply a user edit. Surrounding whitespace is dropped so the stored
    /// value is the one validated and sent. Clears a displayed
    /// succeeded/failed flag.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        if self.schema.is_hidden(name) {
            return Err(FormError::HiddenField(name.to_string()));
        }
        if self.schema.field(name).is_none() {
            return Err(FormError::UnknownField {
                form: self.schema.name.clone(),
                field: name.to_string(),
            });
        }
        if self.view == FormView::Summary {
            return Err(FormError::ReadOnly(self.schema.name.clone()));
        }

        self.visible.insert(name, value.trim());
        if matches!(self.state, SubmissionState::Succeeded | SubmissionState::Failed) {
            self.state = SubmissionState::Idle;
            self.last_error = None;
        }
        Ok(())
    }

    /// Apply several edits, stopping at the first rejected one.
    pub fn set_fields<'a, I>(&mut self, values: I) -> Result<(), FormError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in values {
            self.set_field(name, value)?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            visible: self.visible.clone(),
            hidden: self.hidden.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle transitions, driven by the pipeline and controller only
    // ------------------------------------------------------------------------

    /// Enter `Submitting` and hand out the payload snapshot. `None` while a
    /// submission is already in flight or the summary is shown.
    pub(crate) fn begin_submission(&mut self) -> Option<Snapshot> {
        if self.is_submitting() || self.view == FormView::Summary {
            return None;
        }
        self.state = SubmissionState::Submitting;
        self.last_error = None;
        Some(self.snapshot())
    }

    pub(crate) fn mark_succeeded(&mut self) {
        self.state = SubmissionState::Succeeded;
    }

    pub(crate) fn mark_failed(&mut self, message: String) {
        self.state = SubmissionState::Failed;
        self.last_error = Some(message);
    }

    /// Return to `Idle` without touching values (validation/config rejects).
    pub(crate) fn mark_idle(&mut self) {
        self.state = SubmissionState::Idle;
    }

    pub(crate) fn show_summary(&mut self, snapshot: Snapshot) {
        self.view = FormView::Summary;
        self.submitted = Some(snapshot);
    }

    pub(crate) fn show_editor(&mut self) {
        self.view = FormView::Editing;
        self.submitted = None;
        self.state = SubmissionState::Idle;
        self.last_error = None;
    }

    pub(crate) fn clear_visible(&mut self) {
        self.visible = empty_visible(&self.schema);
    }

    /// New identifier and fixed tags back to their defaults.
    pub(crate) fn reseed_hidden(&mut self) {
        let mut hidden = FormRecord::new();
        for field in &self.schema.hidden {
            let value = match &field.seed {
                HiddenSeed::Identifier => identifier::generate().into_string(),
                HiddenSeed::Fixed(v) => v.clone(),
            };
            hidden.insert(field.name.clone(), value);
        }
        self.hidden = hidden;
    }

    #[cfg(test)]
    pub(crate) fn force_hidden(&mut self, name: &str, id: &identifier::Identifier) {
        self.hidden.insert(name, id.as_str());
    }
}

fn empty_visible(schema: &FormSchema) -> FormRecord {
    schema
        .fields
        .iter()
        .map(|f| (f.name.clone(), String::new()))
        .collect()
}
