//! Contact Form Validation
//!
//! The form is described declaratively by a [`ContactFormSchema`]. Each
//! [`FieldSchema`] derives its [`FieldRule`]s, which drive both the server-side
//! check and the HTML constraint attributes on the rendered form.
//!
//! Editors may tune labels, requiredness, lengths and select options from the
//! CMS (`contactForm.fields`); the set of fields itself is fixed.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::content::types::ContactFieldOverride;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Textarea,
    Select(Vec<String>),
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Phone,
    OneOf(Vec<String>),
    MustBeChecked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldSchema {
    fn new(name: &str, label: &str, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required,
            min_length: None,
            max_length: None,
        }
    }

    fn lengths(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Derive the validation rules for this field, in check order.
    pub fn rules(&self) -> Vec<FieldRule> {
        let mut rules = Vec::new();

        if let FieldKind::Checkbox = self.kind {
            if self.required {
                rules.push(FieldRule::MustBeChecked);
            }
            return rules;
        }

        if self.required {
            rules.push(FieldRule::Required);
        }
        if let Some(min) = self.min_length {
            rules.push(FieldRule::MinLength(min));
        }
        if let Some(max) = self.max_length {
            rules.push(FieldRule::MaxLength(max));
        }
        match &self.kind {
            FieldKind::Email => rules.push(FieldRule::Email),
            FieldKind::Phone => rules.push(FieldRule::Phone),
            FieldKind::Select(options) => rules.push(FieldRule::OneOf(options.clone())),
            _ => {}
        }
        rules
    }

    /// Check one submitted value. Returns the first violated rule's message.
    pub fn check(&self, value: Option<&Value>) -> Option<String> {
        let text = field_text(value);

        for rule in self.rules() {
            let failed = match &rule {
                FieldRule::MustBeChecked => !is_checked(value),
                FieldRule::Required => text.is_empty(),
                // Optional fields left blank skip the remaining rules
                _ if text.is_empty() => return None,
                FieldRule::MinLength(min) => text.chars().count() < *min,
                FieldRule::MaxLength(max) => text.chars().count() > *max,
                FieldRule::Email => !is_valid_email(&text),
                FieldRule::Phone => !is_valid_phone(&text),
                FieldRule::OneOf(options) => !options.iter().any(|o| o == &text),
            };
            if failed {
                return Some(self.message_for(&rule));
            }
        }
        None
    }

    fn message_for(&self, rule: &FieldRule) -> String {
        match rule {
            FieldRule::Required => format!("{} is required", self.label),
            FieldRule::MinLength(min) => format!("{} must be at least {} characters", self.label, min),
            FieldRule::MaxLength(max) => format!("{} must be at most {} characters", self.label, max),
            FieldRule::Email => format!("{} must be a valid email address", self.label),
            FieldRule::Phone => format!("{} must be a valid phone number", self.label),
            FieldRule::OneOf(options) => format!("{} must be one of: {}", self.label, options.join(", ")),
            FieldRule::MustBeChecked => format!("{} must be accepted", self.label),
        }
    }

    /// HTML constraint attributes mirroring the derived rules.
    pub fn input_attributes(&self) -> String {
        let mut attrs = Vec::new();
        for rule in self.rules() {
            match rule {
                FieldRule::Required | FieldRule::MustBeChecked => attrs.push("required".to_string()),
                FieldRule::MinLength(min) => attrs.push(format!("minlength=\"{}\"", min)),
                FieldRule::MaxLength(max) => attrs.push(format!("maxlength=\"{}\"", max)),
                _ => {}
            }
        }
        attrs.join(" ")
    }
}

// ============================================================================
// Schema
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFormSchema {
    pub fields: Vec<FieldSchema>,
}

/// Subjects offered when the CMS does not override them.
pub const DEFAULT_SUBJECTS: &[&str] = &["general", "second-opinion", "partnership", "press"];

impl Default for ContactFormSchema {
    fn default() -> Self {
        let subjects = DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect();
        Self {
            fields: vec![
                FieldSchema::new("name", "Name", FieldKind::Text, true).lengths(Some(2), Some(100)),
                FieldSchema::new("email", "Email", FieldKind::Email, true).lengths(None, Some(254)),
                FieldSchema::new("phone", "Phone", FieldKind::Phone, false).lengths(None, Some(30)),
                FieldSchema::new("subject", "Subject", FieldKind::Select(subjects), false),
                FieldSchema::new("message", "Message", FieldKind::Textarea, true).lengths(Some(10), Some(5000)),
                FieldSchema::new("consent", "Privacy consent", FieldKind::Checkbox, true),
            ],
        }
    }
}

impl ContactFormSchema {
    /// Default schema with CMS overrides applied. Overrides naming unknown fields are ignored.
    pub fn with_overrides(overrides: &[ContactFieldOverride]) -> Self {
        let mut schema = Self::default();
        for patch in overrides {
            let field = match schema.fields.iter_mut().find(|f| f.name == patch.name) {
                Some(field) => field,
                None => {
                    tracing::warn!("Ignoring contact form override for unknown field {}", patch.name);
                    continue;
                }
            };

            if let Some(label) = patch.label.as_deref().filter(|l| !l.trim().is_empty()) {
                field.label = label.trim().to_string();
            }
            if let Some(required) = patch.required {
                field.required = required;
            }
            if patch.min_length.is_some() {
                field.min_length = patch.min_length;
            }
            if patch.max_length.is_some() {
                field.max_length = patch.max_length;
            }
            if let (FieldKind::Select(current), Some(options)) = (&mut field.kind, &patch.options) {
                if !options.is_empty() {
                    *current = options.clone();
                }
            }
        }
        schema
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate every field, collecting all violations.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<(), Vec<FieldViolation>> {
        let violations: Vec<FieldViolation> = self
            .fields
            .iter()
            .filter_map(|field| {
                field.check(values.get(&field.name)).map(|message| FieldViolation {
                    field: field.name.clone(),
                    message,
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

// ============================================================================
// Value helpers
// ============================================================================

/// Submitted value as trimmed text. JSON and form posts both land here.
pub fn field_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Checkbox semantics: JSON `true`, or the usual form-encoded truthy strings.
pub fn is_checked(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes"),
        _ => false,
    }
}

/// Structural email check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// 7 to 15 digits, optionally with `+ ( ) - . ` separators.
pub fn is_valid_phone(phone: &str) -> bool {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '(' | ')' | '-' | '.' | ' '));
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    allowed && (7..=15).contains(&digits)
}
