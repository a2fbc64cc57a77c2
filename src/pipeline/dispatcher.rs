use serde::{Deserialize, Serialize};

use crate::{
    error::FormError,
    form::{record::FormRecord, schema::ChannelKind},
    transport::{
        form_post::{FormPostTransport, PostTransport},
        webhook::{AckTransport, Acknowledgement, DEFAULT_TIMEOUT_MS, WebhookTransport},
    },
};

/// Destination URLs injected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Endpoint of the acknowledged (JSON) channel
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Endpoint of the fire-and-forget form post channel
    #[serde(default)]
    pub form_post_url: Option<String>,

    /// Bounded wait for an acknowledgement
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            form_post_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// What the dispatcher could observe about a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Acknowledged(Acknowledgement),
    /// Handed to the form post; outcome unknown by construction
    Posted,
}

/// Sends an assembled record over the channel the schema selects.
pub enum Dispatcher {
    Acknowledged(Box<dyn AckTransport>),
    FireAndForget(Box<dyn PostTransport>),
    /// Endpoint missing from configuration; every dispatch is refused
    Unconfigured(ChannelKind),
}

impl Dispatcher {
    /// Build the live transport for `channel`, or `Unconfigured` when its
    /// endpoint is absent.
    pub fn from_config(channel: ChannelKind, endpoints: &EndpointConfig) -> Result<Self, FormError> {
        let dispatcher = match channel {
            ChannelKind::Acknowledged => match non_empty(&endpoints.webhook_url) {
                Some(url) => Dispatcher::Acknowledged(Box::new(WebhookTransport::new(
                    url,
                    endpoints.timeout_ms,
                )?)),
                None => Dispatcher::Unconfigured(channel),
            },
            ChannelKind::FireAndForget => match non_empty(&endpoints.form_post_url) {
                Some(url) => Dispatcher::FireAndForget(Box::new(FormPostTransport::new(url)?)),
                None => Dispatcher::Unconfigured(channel),
            },
        };
        Ok(dispatcher)
    }

    pub fn channel(&self) -> ChannelKind {
        match self {
            Dispatcher::Acknowledged(_) => ChannelKind::Acknowledged,
            Dispatcher::FireAndForget(_) => ChannelKind::FireAndForget,
            Dispatcher::Unconfigured(kind) => *kind,
        }
    }

    /// Configuration error for a dispatcher without an endpoint.
    pub fn ensure_configured(&self) -> Result<(), FormError> {
        match self {
            Dispatcher::Unconfigured(kind) => Err(missing_endpoint(*kind)),
            _ => Ok(()),
        }
    }

    /// Send one record. No deduplication: two calls send two records.
    pub fn dispatch(&self, record: FormRecord) -> Result<Delivery, FormError> {
        match self {
            Dispatcher::Acknowledged(transport) => {
                Ok(Delivery::Acknowledged(transport.deliver(&record)?))
            }
            Dispatcher::FireAndForget(transport) => {
                transport.post(record);
                Ok(Delivery::Posted)
            }
            Dispatcher::Unconfigured(kind) => Err(missing_endpoint(*kind)),
        }
    }
}

fn missing_endpoint(kind: ChannelKind) -> FormError {
    match kind {
        ChannelKind::Acknowledged => FormError::Configuration {
            channel: "webhook",
            hint: "endpoints.webhook_url or FORM_RELAY_WEBHOOK_URL",
        },
        ChannelKind::FireAndForget => FormError::Configuration {
            channel: "form post",
            hint: "endpoints.form_post_url or FORM_RELAY_FORM_POST_URL",
        },
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
