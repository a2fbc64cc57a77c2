use serde::{Deserialize, Serialize};

use crate::error::FormError;

// ============================================================================
// Field and form description
// ============================================================================

/// Input type of a visible field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Number,
    Date,
    Select,
}

/// A single rule a field value must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Constraint {
    /// Whole value must match the regular expression
    Pattern { regex: String },

    /// Decimal number within `[min, max]` with at most `max_decimals` digits after the point
    NumericRange { min: f64, max: f64, max_decimals: u32 },

    /// Value must be one of the listed options
    OneOf { options: Vec<String> },

    /// Calendar date in `YYYY-MM-DD` form
    Date,

    /// Plausible e-mail address (`local@domain.tld`)
    Email,
}

/// A user-editable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

/// How a hidden field gets its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenSeed {
    /// Fresh [`Identifier`](crate::form::identifier::Identifier) on mount and after each reset
    Identifier,
    /// Constant classification tag
    Fixed(String),
}

/// A system-populated field, never shown for edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenField {
    pub name: String,
    pub seed: HiddenSeed,
}

/// Which transport delivers the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Request/response; caller waits for the acknowledgement
    Acknowledged,
    /// Cross-origin form post; no response is observed
    FireAndForget,
}

/// Complete description of one form: fields, hidden metadata and channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub hidden: Vec<HiddenField>,
    pub channel: ChannelKind,

    /// Destination partition tag added by the fire-and-forget assembler
    #[serde(default)]
    pub partition: Option<String>,
}

fn default_true() -> bool {
    true
}

impl FieldSpec {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            constraints: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn pattern(self, regex: &str) -> Self {
        self.with(Constraint::Pattern {
            regex: regex.to_string(),
        })
    }

    pub fn one_of(self, options: &[&str]) -> Self {
        self.with(Constraint::OneOf {
            options: options.iter().map(|o| o.to_string()).collect(),
        })
    }
}

impl HiddenField {
    pub fn identifier(name: &str) -> Self {
        Self {
            name: name.to_string(),
            seed: HiddenSeed::Identifier,
        }
    }

    pub fn fixed(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            seed: HiddenSeed::Fixed(value.to_string()),
        }
    }
}

// ============================================================================
// Built-in forms
// ============================================================================

pub const LEAD_PHONE_PATTERN: &str = r"^[0-9+()\- ]{7,15}$";
pub const TEN_DIGIT_PATTERN: &str = r"^[0-9]{10}$";
pub const PINCODE_PATTERN: &str = r"^[0-9]{6}$";

pub const LEAD_SOURCE: &str = "website";
pub const LEAD_STATUS: &str = "new";
pub const REGISTRATION_PARTITION: &str = "Sheet3";

impl FormSchema {
    /// Lead capture form, delivered to the webhook and acknowledged.
    pub fn lead() -> Self {
        Self {
            name: "lead".into(),
            fields: vec![
                FieldSpec::new("Name", FieldKind::Text),
                FieldSpec::new("Phone", FieldKind::Tel).pattern(LEAD_PHONE_PATTERN),
                FieldSpec::new("Service", FieldKind::Select).one_of(&[
                    "Consultation",
                    "Installation",
                    "Support",
                    "Other",
                ]),
                FieldSpec::new("City", FieldKind::Text),
                FieldSpec::new("Preferred Date", FieldKind::Date).with(Constraint::Date),
                FieldSpec::new("email", FieldKind::Email).with(Constraint::Email),
            ],
            hidden: vec![
                HiddenField::identifier("ID"),
                HiddenField::fixed("Source", LEAD_SOURCE),
                HiddenField::fixed("Status", LEAD_STATUS),
            ],
            channel: ChannelKind::Acknowledged,
            partition: None,
        }
    }

    /// Exam registration form, posted cross-origin before the payment step.
    pub fn registration() -> Self {
        Self {
            name: "registration".into(),
            fields: vec![
                FieldSpec::new("examMode", FieldKind::Select).one_of(&["Offline", "Interviews"]),
                FieldSpec::new("fullName", FieldKind::Text),
                FieldSpec::new("email", FieldKind::Email).with(Constraint::Email),
                FieldSpec::new("phone", FieldKind::Tel).pattern(TEN_DIGIT_PATTERN),
                FieldSpec::new("whatsapp", FieldKind::Tel).pattern(TEN_DIGIT_PATTERN),
                FieldSpec::new("dateOfBirth", FieldKind::Date).with(Constraint::Date),
                FieldSpec::new("gender", FieldKind::Select).one_of(&["Male", "Female", "Other"]),
                FieldSpec::new("address", FieldKind::Text),
                FieldSpec::new("city", FieldKind::Text),
                FieldSpec::new("state", FieldKind::Text),
                FieldSpec::new("pincode", FieldKind::Text).pattern(PINCODE_PATTERN),
                FieldSpec::new("class", FieldKind::Select)
                    .one_of(&["7", "8", "9", "10", "11", "12"]),
                FieldSpec::new("stream", FieldKind::Select)
                    .optional()
                    .one_of(&["Science (PCM)", "Science (PCB)", "Science (PCMB)", "N/A"]),
                FieldSpec::new("schoolName", FieldKind::Text),
                FieldSpec::new("schoolBoard", FieldKind::Text),
                FieldSpec::new("previousPercentage", FieldKind::Number).with(
                    Constraint::NumericRange {
                        min: 0.0,
                        max: 100.0,
                        max_decimals: 2,
                    },
                ),
                FieldSpec::new("examDate", FieldKind::Select).one_of(&[
                    "2025-11-02",
                    "2025-11-09",
                    "2025-11-15",
                ]),
            ],
            hidden: Vec::new(),
            channel: ChannelKind::FireAndForget,
            partition: Some(REGISTRATION_PARTITION.into()),
        }
    }

    /// Resolve a built-in form by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "lead" => Some(Self::lead()),
            "registration" => Some(Self::registration()),
            _ => None,
        }
    }

    /// Parse a schema from YAML.
    pub fn from_yaml(content: &str) -> Result<Self, FormError> {
        serde_yaml::from_str(content).map_err(|source| FormError::Yaml {
            context: "form schema".into(),
            source,
        })
    }

    /// Built-in name, or a path to a YAML schema file.
    pub fn load(name_or_path: &str) -> Result<Self, FormError> {
        if let Some(schema) = Self::builtin(name_or_path) {
            return Ok(schema);
        }
        let content = std::fs::read_to_string(name_or_path).map_err(|source| FormError::Io {
            context: format!("reading schema {}", name_or_path),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.iter().any(|h| h.name == name)
    }
}
