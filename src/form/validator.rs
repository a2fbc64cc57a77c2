use std::fmt;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::{
    error::FormError,
    form::{
        record::FormRecord,
        schema::{Constraint, FormSchema, HiddenSeed},
    },
};

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    Missing,
    PatternMismatch { pattern: String },
    NotANumber,
    OutOfRange { min: f64, max: f64 },
    TooPrecise { max_decimals: u32 },
    NotAnOption { options: Vec<String> },
    InvalidDate,
    InvalidEmail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldFailure {
    pub field: String,
    #[serde(flatten)]
    pub reason: FailureReason,
}

/// Outcome of validating one record. Empty `failures` means valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub failures: Vec<FieldFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_fields(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.field.as_str()).collect()
    }

    pub fn has_failure(&self, field: &str) -> bool {
        self.failures.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Missing => write!(f, "is required"),
            FailureReason::PatternMismatch { pattern } => {
                write!(f, "does not match {}", pattern)
            }
            FailureReason::NotANumber => write!(f, "is not a number"),
            FailureReason::OutOfRange { min, max } => {
                write!(f, "must be between {} and {}", min, max)
            }
            FailureReason::TooPrecise { max_decimals } => {
                write!(f, "allows at most {} decimal places", max_decimals)
            }
            FailureReason::NotAnOption { options } => {
                write!(f, "must be one of [{}]", options.join(", "))
            }
            FailureReason::InvalidDate => write!(f, "is not a YYYY-MM-DD date"),
            FailureReason::InvalidEmail => write!(f, "is not an e-mail address"),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|fail| format!("'{}' {}", fail.field, fail.reason))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

// ============================================================================
// Validator
// ============================================================================

enum Rule {
    Pattern { source: String, regex: Regex },
    NumericRange { min: f64, max: f64, max_decimals: u32 },
    OneOf(Vec<String>),
    Date,
    Email,
}

struct FieldRules {
    name: String,
    required: bool,
    rules: Vec<Rule>,
}

/// Compiled constraints for one schema.
pub struct Validator {
    fields: Vec<FieldRules>,
    required_hidden: Vec<String>,
    email: Regex,
}

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

impl Validator {
    pub fn new(schema: &FormSchema) -> Result<Self, FormError> {
        let mut fields = Vec::with_capacity(schema.fields.len());

        for spec in &schema.fields {
            let mut rules = Vec::with_capacity(spec.constraints.len());
            for constraint in &spec.constraints {
                rules.push(compile(&spec.name, constraint)?);
            }
            fields.push(FieldRules {
                name: spec.name.clone(),
                required: spec.required,
                rules,
            });
        }

        let required_hidden = schema
            .hidden
            .iter()
            .filter(|h| match &h.seed {
                HiddenSeed::Identifier => true,
                HiddenSeed::Fixed(v) => !v.is_empty(),
            })
            .map(|h| h.name.clone())
            .collect();

        let email = Regex::new(EMAIL_PATTERN).map_err(|e| FormError::Schema {
            field: "email".into(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            fields,
            required_hidden,
            email,
        })
    }

    /// Check every field of `record`, collecting all failures.
    pub fn validate(&self, record: &FormRecord) -> ValidationReport {
        let mut report = ValidationReport::default();

        for field in &self.fields {
            let value = record.get(&field.name).unwrap_or("");

            if value.trim().is_empty() {
                if field.required {
                    report.failures.push(FieldFailure {
                        field: field.name.clone(),
                        reason: FailureReason::Missing,
                    });
                }
                continue;
            }

            // First failing rule per field is enough to reject it
            if let Some(reason) = field.rules.iter().find_map(|r| self.check(r, value)) {
                report.failures.push(FieldFailure {
                    field: field.name.clone(),
                    reason,
                });
            }
        }

        for name in &self.required_hidden {
            if record.get(name).is_none_or(str::is_empty) {
                report.failures.push(FieldFailure {
                    field: name.clone(),
                    reason: FailureReason::Missing,
                });
            }
        }

        report
    }

    fn check(&self, rule: &Rule, value: &str) -> Option<FailureReason> {
        match rule {
            Rule::Pattern { source, regex } => (!regex.is_match(value)).then(|| {
                FailureReason::PatternMismatch {
                    pattern: source.clone(),
                }
            }),
            Rule::NumericRange {
                min,
                max,
                max_decimals,
            } => check_numeric(value, *min, *max, *max_decimals),
            Rule::OneOf(options) => {
                (!options.iter().any(|o| o == value)).then(|| FailureReason::NotAnOption {
                    options: options.clone(),
                })
            }
            Rule::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .err()
                .map(|_| FailureReason::InvalidDate),
            Rule::Email => (!self.email.is_match(value)).then_some(FailureReason::InvalidEmail),
        }
    }
}

fn compile(field: &str, constraint: &Constraint) -> Result<Rule, FormError> {
    Ok(match constraint {
        Constraint::Pattern { regex } => Rule::Pattern {
            source: regex.clone(),
            regex: Regex::new(regex).map_err(|e| FormError::Schema {
                field: field.to_string(),
                reason: e.to_string(),
            })?,
        },
        Constraint::NumericRange {
            min,
            max,
            max_decimals,
        } => {
            if min > max {
                return Err(FormError::Schema {
                    field: field.to_string(),
                    reason: format!("empty range {}..={}", min, max),
                });
            }
            Rule::NumericRange {
                min: *min,
                max: *max,
                max_decimals: *max_decimals,
            }
        }
        Constraint::OneOf { options } => Rule::OneOf(options.clone()),
        Constraint::Date => Rule::Date,
        Constraint::Email => Rule::Email,
    })
}

/// Plain decimal notation only: optional sign, digits, at most one `.`.
fn is_plain_decimal(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    !(whole.is_empty() && frac.is_empty())
        && whole.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit())
}

fn check_numeric(value: &str, min: f64, max: f64, max_decimals: u32) -> Option<FailureReason> {
    if !is_plain_decimal(value) {
        return Some(FailureReason::NotANumber);
    }
    let number: f64 = match value.parse() {
        Ok(n) if f64::is_finite(n) => n,
        _ => return Some(FailureReason::NotANumber),
    };

    if number < min || number > max {
        return Some(FailureReason::OutOfRange { min, max });
    }

    let decimals = value
        .split_once('.')
        .map(|(_, frac)| frac.len())
        .unwrap_or(0);
    if decimals > max_decimals as usize {
        return Some(FailureReason::TooPrecise { max_decimals });
    }

    None
}
