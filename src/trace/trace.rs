use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::form::{record::FormRecord, schema::ChannelKind, store::SubmissionState};

/// One line of the submission trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub step: u64,

    pub form: String,
    pub state: SubmissionState,
    pub event: String,

    pub channel: Option<ChannelKind>,
    pub identifier: Option<String>,

    /// SHA-1 of the serialized payload, so records can be matched without storing them
    pub fingerprint: Option<String>,
    pub failed_fields: Vec<String>,
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(step: u64, form: &str, state: SubmissionState, event: impl ToString) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            step,
            form: form.to_string(),
            state,
            event: event.to_string(),
            channel: None,
            identifier: None,
            fingerprint: None,
            failed_fields: vec![],
            error: None,
        }
    }

    pub fn with_channel(mut self, channel: ChannelKind) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_identifier(mut self, identifier: Option<&str>) -> Self {
        self.identifier = identifier.map(str::to_string);
        self
    }

    pub fn with_payload(mut self, record: &FormRecord) -> Self {
        self.fingerprint = serde_json::to_string(record)
            .ok()
            .map(|json| record_fingerprint(&json));
        self
    }

    pub fn with_failed_fields(mut self, fields: &[&str]) -> Self {
        self.failed_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

pub fn record_fingerprint(text: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
