//! Declarative field validation for submitted forms.
//!
//! Each field is trimmed, then run through a chain of rules. The first rule
//! that fails records one message for that field and the remaining rules in
//! the chain are skipped. Every field is always visited, so a submission
//! reports at most one message per field.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a rule chain for `field`. The value is trimmed up front.
    pub fn field<'a>(&'a mut self, field: &'static str, raw: &str) -> FieldCheck<'a> {
        FieldCheck {
            validator: self,
            field,
            value: raw.trim().to_string(),
            failed: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    fn push(&mut self, field: &'static str, message: &str) {
        self.errors.push(FieldError {
            field,
            message: message.to_string(),
        });
    }
}

pub struct FieldCheck<'a> {
    validator: &'a mut Validator,
    field: &'static str,
    value: String,
    failed: bool,
}

impl<'a> FieldCheck<'a> {
    fn fail(&mut self, message: &str) {
        if !self.failed {
            self.validator.push(self.field, message);
            self.failed = true;
        }
    }

    pub fn min_len(mut self, min: usize, message: &str) -> Self {
        if !self.failed && self.value.chars().count() < min {
            self.fail(message);
        }
        self
    }

    pub fn max_len(mut self, max: usize, message: &str) -> Self {
        if !self.failed && self.value.chars().count() > max {
            self.fail(message);
        }
        self
    }

    pub fn required(self, message: &str) -> Self {
        self.min_len(1, message)
    }

    pub fn alphanumeric(mut self, message: &str) -> Self {
        if !self.failed && !alphanumeric_re().is_match(&self.value) {
            self.fail(message);
        }
        self
    }

    /// The sanitized (trimmed) value, whether or not a rule failed.
    pub fn value(self) -> String {
        self.value
    }

    /// Parse as a finite number strictly greater than zero.
    pub fn positive_number(mut self, message: &str) -> (String, Option<f64>) {
        let parsed = self
            .value
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n > 0.0);
        if parsed.is_none() {
            self.fail(message);
        }
        let parsed = if self.failed { None } else { parsed };
        (self.value, parsed)
    }

    /// Parse as a whole number of zero or more.
    pub fn non_negative_integer(mut self, message: &str) -> (String, Option<i64>) {
        let parsed = self.value.parse::<i64>().ok().filter(|n| *n >= 0);
        if parsed.is_none() {
            self.fail(message);
        }
        let parsed = if self.failed { None } else { parsed };
        (self.value, parsed)
    }
}

fn alphanumeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("static regex"))
}
