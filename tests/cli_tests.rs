use clap::Parser;
use form_relay::cli::commands::{collect_record, format_summary, format_validation_report};
use form_relay::cli::config::{
    AppConfig, Cli, Commands, FORM_POST_ENV, WEBHOOK_ENV, load_config, parse_field,
    resolve_endpoints_with,
};
use form_relay::form::validator::{FailureReason, FieldFailure, ValidationReport};
use form_relay::pipeline::dispatcher::EndpointConfig;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_submit_minimal() {
    let cli = Cli::parse_from(["form-relay", "submit"]);
    match cli.command {
        Commands::Submit {
            form,
            fields,
            input,
            no_wait,
        } => {
            assert_eq!(form, "lead");
            assert!(fields.is_empty());
            assert!(input.is_none());
            assert!(!no_wait);
        }
        _ => panic!("Expected Submit command"),
    }
}

#[test]
fn cli_parse_submit_with_fields() {
    let cli = Cli::parse_from([
        "form-relay",
        "submit",
        "--form",
        "registration",
        "--field",
        "fullName=Asha Verma",
        "-f",
        "pincode=411001",
        "--no-wait",
        "--webhook-url",
        "https://hooks.example.com/lead",
        "-vv",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.webhook_url.as_deref(), Some("https://hooks.example.com/lead"));
    match cli.command {
        Commands::Submit {
            form,
            fields,
            no_wait,
            ..
        } => {
            assert_eq!(form, "registration");
            assert_eq!(
                fields,
                vec![
                    ("fullName".to_string(), "Asha Verma".to_string()),
                    ("pincode".to_string(), "411001".to_string()),
                ]
            );
            assert!(no_wait);
        }
        _ => panic!("Expected Submit command"),
    }
}

#[test]
fn cli_parse_id_count() {
    let cli = Cli::parse_from(["form-relay", "id", "--count", "3"]);
    assert!(matches!(cli.command, Commands::Id { count: 3 }));
}

#[test]
fn cli_rejects_malformed_field() {
    let result = Cli::try_parse_from(["form-relay", "validate", "--field", "novalue"]);
    assert!(result.is_err());
}

#[test]
fn parse_field_keeps_equals_in_value() {
    assert_eq!(
        parse_field("note=a=b").unwrap(),
        ("note".to_string(), "a=b".to_string())
    );
    assert_eq!(
        parse_field("Preferred Date=2025-11-02").unwrap(),
        ("Preferred Date".to_string(), "2025-11-02".to_string())
    );
    assert!(parse_field("=x").is_err());
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn load_config_missing_file_returns_defaults() {
    let config = load_config(Some("/nonexistent/form-relay.yaml"));
    assert!(config.endpoints.webhook_url.is_none());
    assert_eq!(config.endpoints.timeout_ms, 10_000);
    assert_eq!(config.payment.redirect_delay_ms, 1_000);
    assert_eq!(config.payment.button_id, "pl_RPPYCrBxUxmkro");
    assert!(config.trace.path.is_none());
}

#[test]
fn load_config_partial_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("form-relay.yaml");
    std::fs::write(
        &path,
        "endpoints:\n  webhook_url: https://hooks.example.com/lead\n  timeout_ms: 2500\npayment:\n  redirect_delay_ms: 250\n",
    )
    .unwrap();

    let config = load_config(path.to_str());
    assert_eq!(
        config.endpoints.webhook_url.as_deref(),
        Some("https://hooks.example.com/lead")
    );
    assert_eq!(config.endpoints.timeout_ms, 2500);
    assert!(config.endpoints.form_post_url.is_none());
    assert_eq!(config.payment.redirect_delay_ms, 250);
    assert_eq!(
        config.payment.page_url,
        "https://pages.razorpay.com/pl_RPPYCrBxUxmkro/view"
    );
}

#[test]
fn load_config_malformed_yaml_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "endpoints: [unclosed").unwrap();

    let config = load_config(path.to_str());
    assert!(config.endpoints.webhook_url.is_none());
}

#[test]
fn endpoint_resolution_prefers_cli_then_config_then_env() {
    let config = EndpointConfig {
        webhook_url: Some("https://config.example.com".into()),
        form_post_url: None,
        timeout_ms: 5_000,
    };
    let env = |key: &str| match key {
        k if k == WEBHOOK_ENV => Some("https://env.example.com/hook".to_string()),
        k if k == FORM_POST_ENV => Some("https://env.example.com/post".to_string()),
        _ => None,
    };

    let from_cli = resolve_endpoints_with(Some("https://cli.example.com"), None, &config, env);
    assert_eq!(from_cli.webhook_url.as_deref(), Some("https://cli.example.com"));
    assert_eq!(from_cli.form_post_url.as_deref(), Some("https://env.example.com/post"));
    assert_eq!(from_cli.timeout_ms, 5_000);

    let from_config = resolve_endpoints_with(None, None, &config, env);
    assert_eq!(from_config.webhook_url.as_deref(), Some("https://config.example.com"));

    let nothing = resolve_endpoints_with(None, None, &EndpointConfig::default(), |_| None);
    assert!(nothing.webhook_url.is_none());
    assert!(nothing.form_post_url.is_none());
}

#[test]
fn app_config_yaml_roundtrip_keeps_defaults() {
    let yaml = serde_yaml::to_string(&AppConfig::default()).unwrap();
    let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed.payment.redirect_delay_ms, 1_000);
    assert_eq!(parsed.endpoints, EndpointConfig::default());
}

// ============================================================================
// Input and output helpers
// ============================================================================

#[test]
fn collect_record_merges_file_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lead.json");
    std::fs::write(&path, r#"{"Name": "A", "City": "Pune"}"#).unwrap();

    let record = collect_record(
        &[("City".to_string(), "Mumbai".to_string())],
        path.to_str(),
    )
    .unwrap();

    assert_eq!(record.get("Name"), Some("A"));
    assert_eq!(record.get("City"), Some("Mumbai"), "Flags win over file values");
}

#[test]
fn collect_record_reads_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registration.yaml");
    std::fs::write(&path, "fullName: Asha Verma\npincode: \"411001\"\n").unwrap();

    let record = collect_record(&[], path.to_str()).unwrap();
    assert_eq!(record.get("fullName"), Some("Asha Verma"));
    assert_eq!(record.get("pincode"), Some("411001"));
}

#[test]
fn collect_record_missing_file_is_an_error() {
    assert!(collect_record(&[], Some("/nonexistent/record.yaml")).is_err());
}

#[test]
fn validation_report_formatting() {
    assert!(format_validation_report(&ValidationReport::default()).contains("valid"));

    let report = ValidationReport {
        failures: vec![FieldFailure {
            field: "pincode".into(),
            reason: FailureReason::Missing,
        }],
    };
    let text = format_validation_report(&report);
    assert!(text.contains("1 field(s) failed validation"));
    assert!(text.contains("[FAIL] pincode is required"));
}

#[test]
fn summary_aligns_field_names() {
    let record = [("a", "1"), ("long_name", "2")].into_iter().collect();
    let text = format_summary(&record);
    assert_eq!(text, "  a          1\n  long_name  2\n");
}
