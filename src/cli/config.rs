use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::pipeline::{
    dispatcher::EndpointConfig,
    handoff::{DEFAULT_REDIRECT_DELAY_MS, PaymentDestination},
};

pub const WEBHOOK_ENV: &str = "FORM_RELAY_WEBHOOK_URL";
pub const FORM_POST_ENV: &str = "FORM_RELAY_FORM_POST_URL";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-relay",
    version,
    about = "Validate form records and relay them to webhook and form-post endpoints"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Webhook endpoint for acknowledged submissions
    #[arg(long, global = true)]
    pub webhook_url: Option<String>,

    /// Endpoint for fire-and-forget form posts
    #[arg(long, global = true)]
    pub form_post_url: Option<String>,

    /// Path to config file (default: form-relay.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a record and submit it through the form's channel
    Submit {
        /// Built-in form (lead, registration) or path to a schema YAML
        #[arg(long, default_value = "lead")]
        form: String,

        /// Field value as NAME=VALUE (repeatable)
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// YAML or JSON file with field values
        #[arg(short, long)]
        input: Option<String>,

        /// Do not wait for the payment hand-off before exiting
        #[arg(long)]
        no_wait: bool,
    },

    /// Validate a record without sending it
    Validate {
        /// Built-in form (lead, registration) or path to a schema YAML
        #[arg(long, default_value = "lead")]
        form: String,

        /// Field value as NAME=VALUE (repeatable)
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// YAML or JSON file with field values
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Print fresh form identifiers
    Id {
        /// How many identifiers to print
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Print a form schema as YAML
    Schema {
        /// Built-in form (lead, registration) or path to a schema YAML
        #[arg(long, default_value = "lead")]
        form: String,
    },
}

/// Parse `NAME=VALUE`; the value may itself contain `=`.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-relay.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    #[serde(default = "default_page_url")]
    pub page_url: String,

    #[serde(default = "default_button_id")]
    pub button_id: String,

    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        let destination = PaymentDestination::default();
        Self {
            page_url: destination.page_url,
            button_id: destination.button_id,
            redirect_delay_ms: DEFAULT_REDIRECT_DELAY_MS,
        }
    }
}

impl PaymentConfig {
    pub fn destination(&self) -> PaymentDestination {
        PaymentDestination {
            page_url: self.page_url.clone(),
            button_id: self.button_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    /// JSONL submission trace; disabled when absent
    pub path: Option<String>,
}

// Serde default helpers
fn default_page_url() -> String { PaymentDestination::default().page_url }
fn default_button_id() -> String { PaymentDestination::default().button_id }
fn default_redirect_delay_ms() -> u64 { DEFAULT_REDIRECT_DELAY_MS }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-relay.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Resolve endpoints: CLI > config file > environment.
pub fn resolve_endpoints(
    cli_webhook: Option<&str>,
    cli_form_post: Option<&str>,
    config: &EndpointConfig,
) -> EndpointConfig {
    resolve_endpoints_with(cli_webhook, cli_form_post, config, |key| std::env::var(key).ok())
}

/// [`resolve_endpoints`] with an injectable environment lookup.
pub fn resolve_endpoints_with<F>(
    cli_webhook: Option<&str>,
    cli_form_post: Option<&str>,
    config: &EndpointConfig,
    env: F,
) -> EndpointConfig
where
    F: Fn(&str) -> Option<String>,
{
    EndpointConfig {
        webhook_url: cli_webhook
            .map(str::to_string)
            .or_else(|| config.webhook_url.clone())
            .or_else(|| env(WEBHOOK_ENV)),
        form_post_url: cli_form_post
            .map(str::to_string)
            .or_else(|| config.form_post_url.clone())
            .or_else(|| env(FORM_POST_ENV)),
        timeout_ms: config.timeout_ms,
    }
}
