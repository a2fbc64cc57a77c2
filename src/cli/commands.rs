use std::sync::Arc;
use std::time::Duration;

use crate::cli::config::{AppConfig, resolve_endpoints};
use crate::error::FormError;
use crate::form::identifier;
use crate::form::record::FormRecord;
use crate::form::schema::FormSchema;
use crate::form::validator::{ValidationReport, Validator};
use crate::pipeline::controller::PostSubmissionController;
use crate::pipeline::dispatcher::{Dispatcher, EndpointConfig};
use crate::pipeline::handoff::{ConsoleHandoff, PaymentHandoff};
use crate::pipeline::pipeline::{FormPipeline, SubmitOutcome};
use crate::trace::logger::TraceLogger;

// ============================================================================
// submit subcommand
// ============================================================================

/// Submit one record. Returns `false` when the submission was rejected or failed.
pub fn cmd_submit(
    form: &str,
    fields: &[(String, String)],
    input: Option<&str>,
    wait: bool,
    endpoints: &EndpointConfig,
    config: &AppConfig,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let schema = FormSchema::load(form)?;
    let record = collect_record(fields, input)?;

    let mut pipeline = build_pipeline(schema, endpoints, config, Arc::new(ConsoleHandoff))?;

    // Fail fast before touching the form when the channel has no endpoint
    if let Err(e) = pipeline.ensure_configured() {
        eprintln!("Error: {}", e);
        return Ok(false);
    }

    for (name, value) in record.iter() {
        if pipeline.store().schema().is_hidden(name) {
            tracing::warn!("ignoring hidden field '{}' from input", name);
            continue;
        }
        pipeline.set_field(name, value)?;
    }

    if verbose > 0 {
        eprintln!(
            "Submitting '{}' ({} fields)...",
            pipeline.store().schema().name,
            record.len()
        );
    }

    match pipeline.submit() {
        Ok(SubmitOutcome::Acknowledged { identifier, status }) => {
            println!(
                "Data submitted successfully (status {}, ID {})",
                status,
                identifier.as_deref().unwrap_or("-")
            );
            Ok(true)
        }
        Ok(SubmitOutcome::Posted { record }) => {
            println!("Registration submitted ({} fields posted)", record.len());
            print!("{}", format_summary(&record));
            println!(
                "Payment button: {}",
                pipeline.controller().destination().button_id
            );
            if wait {
                pipeline.wait_for_handoff();
            }
            Ok(true)
        }
        Ok(SubmitOutcome::Ignored) => {
            eprintln!("Submission already in progress");
            Ok(false)
        }
        Err(FormError::Validation(report)) => {
            print!("{}", format_validation_report(&report));
            Ok(false)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(false)
        }
    }
}

// ============================================================================
// validate subcommand
// ============================================================================

pub fn cmd_validate(
    form: &str,
    fields: &[(String, String)],
    input: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let schema = FormSchema::load(form)?;
    let record = collect_record(fields, input)?;
    let validator = Validator::new(&schema)?;

    // Hidden metadata is system-owned; validate only what a user can supply,
    // trimmed the way the store keeps edits
    let mut candidate = FormRecord::new();
    for field in &schema.fields {
        candidate.insert(field.name.clone(), record.get(&field.name).unwrap_or("").trim());
    }
    let mut report = validator.validate(&candidate);
    report.failures.retain(|f| !schema.is_hidden(&f.field));

    print!("{}", format_validation_report(&report));
    Ok(report.is_valid())
}

// ============================================================================
// id / schema subcommands
// ============================================================================

pub fn cmd_id(count: usize) {
    for _ in 0..count {
        println!("{}", identifier::generate());
    }
}

pub fn cmd_schema(form: &str) -> Result<(), Box<dyn std::error::Error>> {
    let schema = FormSchema::load(form)?;
    print!("{}", serde_yaml::to_string(&schema)?);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Wire a pipeline from resolved configuration.
pub fn build_pipeline(
    schema: FormSchema,
    endpoints: &EndpointConfig,
    config: &AppConfig,
    handoff: Arc<dyn PaymentHandoff>,
) -> Result<FormPipeline, FormError> {
    let dispatcher = Dispatcher::from_config(schema.channel, endpoints)?;
    let controller = PostSubmissionController::new(
        config.payment.destination(),
        Duration::from_millis(config.payment.redirect_delay_ms),
        handoff,
    );

    let tracer = match &config.trace.path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    Ok(FormPipeline::new(schema, dispatcher, controller)?.with_tracer(tracer))
}

/// Resolve endpoints from CLI flags, config and environment.
pub fn endpoints_for(
    webhook_url: Option<&str>,
    form_post_url: Option<&str>,
    config: &AppConfig,
) -> EndpointConfig {
    resolve_endpoints(webhook_url, form_post_url, &config.endpoints)
}

/// Merge values from an input file (YAML or JSON) with `NAME=VALUE` flags.
/// Flags win over file values.
pub fn collect_record(
    fields: &[(String, String)],
    input: Option<&str>,
) -> Result<FormRecord, FormError> {
    let mut record = match input {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| FormError::Io {
                context: format!("reading input {}", path),
                source,
            })?;
            // JSON is valid YAML, so one parser covers both
            serde_yaml::from_str::<FormRecord>(&content).map_err(|source| FormError::Yaml {
                context: format!("parsing input {}", path),
                source,
            })?
        }
        None => FormRecord::new(),
    };

    for (name, value) in fields {
        record.insert(name.clone(), value.clone());
    }
    Ok(record)
}

/// Render a validation report for the terminal.
pub fn format_validation_report(report: &ValidationReport) -> String {
    if report.is_valid() {
        return "\u{2713} Record is valid\n".to_string();
    }

    let mut out = format!(
        "\u{2717} {} field(s) failed validation\n",
        report.failures.len()
    );
    for failure in &report.failures {
        out.push_str(&format!("    [FAIL] {} {}\n", failure.field, failure.reason));
    }
    out
}

/// Read-only summary of a posted record.
pub fn format_summary(record: &FormRecord) -> String {
    let width = record.names().map(str::len).max().unwrap_or(0);
    record
        .iter()
        .map(|(name, value)| format!("  {:width$}  {}\n", name, value, width = width))
        .collect()
}
