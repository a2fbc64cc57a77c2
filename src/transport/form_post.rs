use std::sync::{Arc, Mutex};
use std::thread;

use crate::{error::TransportError, form::record::FormRecord};

/// Cross-origin form post. Returns as soon as the post is handed off;
/// the remote outcome is never observed.
///
/// A delivery lost on the remote side goes unreported. That is the accepted
/// cost of this transport, not a failure of the caller.
pub trait PostTransport {
    fn post(&self, record: FormRecord);
}

// ============================================================================
// HTTP form post (application/x-www-form-urlencoded)
// ============================================================================

pub struct FormPostTransport {
    pub endpoint: String,
    client: reqwest::blocking::Client,
}

impl FormPostTransport {
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }
}

impl PostTransport for FormPostTransport {
    fn post(&self, record: FormRecord) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let pairs = record.to_pairs();

        let spawned = thread::Builder::new()
            .name("form-post".into())
            .spawn(move || match client.post(&endpoint).form(&pairs).send() {
                // Logged for diagnostics only; nothing upstream waits on it
                Ok(resp) => tracing::debug!(status = %resp.status(), "form post settled"),
                Err(e) => tracing::debug!(error = %e, "form post settled with error"),
            });

        if let Err(e) = spawned {
            tracing::warn!("could not start form post: {}", e);
        }
    }
}

// ============================================================================
// Recording transport (for testing)
// ============================================================================

#[derive(Clone, Default)]
pub struct RecordingPostTransport {
    posted: Arc<Mutex<Vec<FormRecord>>>,
}

impl RecordingPostTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(&self) -> Vec<FormRecord> {
        self.posted.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn post_count(&self) -> usize {
        self.posted.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl PostTransport for RecordingPostTransport {
    fn post(&self, record: FormRecord) {
        if let Ok(mut posted) = self.posted.lock() {
            posted.push(record);
        }
    }
}
