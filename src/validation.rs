//! Field rules shared by the form validators.
//!
//! Validators are plain functions over the submitted values: they return the
//! validated value or a [`FormErrors`] map keyed by field name. Nothing in here
//! touches the store; lookups a rule depends on are done by the caller and
//! passed in.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

pub const REQUIRED: &str = "This field is required.";

/// Field-level validation messages, in submission-independent order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.field(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Records the required-field message and returns false for blank input.
/// Other rules for the field should be skipped when this fails.
pub fn required(errors: &mut FormErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
        false
    } else {
        true
    }
}

/// Like [`required`] but whitespace counts as input. Used for passwords.
pub fn present(errors: &mut FormErrors, field: &'static str, value: &str) -> bool {
    if value.is_empty() {
        errors.add(field, REQUIRED);
        false
    } else {
        true
    }
}

pub fn length_between(errors: &mut FormErrors, field: &'static str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.add(field, format!("Field must be between {min} and {max} characters long."));
    }
}

pub fn min_length(errors: &mut FormErrors, field: &'static str, value: &str, min: usize) {
    if value.chars().count() < min {
        errors.add(field, format!("Field must be at least {min} characters long."));
    }
}

pub fn email(errors: &mut FormErrors, field: &'static str, value: &str) {
    if !is_valid_email(value) {
        errors.add(field, "Invalid email address.");
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}
