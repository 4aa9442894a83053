//! Request body validation. Rules collect every failing field before the
//! request is rejected, so clients get the full list at once.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::web::{WebError, WebResult};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error<M: Into<String>>(&mut self, field: &str, message: M) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Trimmed text with a length in `min..=max` characters.
    pub fn text(&mut self, field: &str, value: &str, min: usize, max: usize) -> String {
        let value = value.trim();
        let len = value.chars().count();
        if len < min || len > max {
            self.error(field, format!("{field} must be between {min} and {max} characters"));
        }
        value.to_string()
    }

    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
    ) -> Option<String> {
        value.map(|v| self.text(field, v, min, max))
    }

    /// Valid address, normalised to lowercase.
    pub fn email(&mut self, field: &str, value: &str) -> String {
        let value = value.trim().to_lowercase();
        if !EMAIL_RE.is_match(&value) {
            self.error(field, "please provide a valid email");
        }
        value
    }

    pub fn password(&mut self, field: &str, value: &str) {
        if value.chars().count() < 6 {
            self.error(field, "password must be at least 6 characters long");
        }

        let lower = value.chars().any(|c| c.is_lowercase());
        let upper = value.chars().any(|c| c.is_uppercase());
        let digit = value.chars().any(|c| c.is_ascii_digit());
        if !(lower && upper && digit) {
            self.error(
                field,
                "password must contain at least one lowercase letter, one uppercase letter and one number",
            );
        }
    }

    pub fn required(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.error(field, format!("{field} is required"));
        }
    }

    pub fn non_negative_f64(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.error(field, format!("{field} must be a positive number"));
        }
    }

    pub fn non_negative_i32(&mut self, field: &str, value: i32) {
        if value < 0 {
            self.error(field, format!("{field} must be a positive integer"));
        }
    }

    pub fn one_of<T, F: Fn(&str) -> Option<T>>(
        &mut self,
        field: &str,
        value: &str,
        parse: F,
        allowed: &[&str],
    ) -> Option<T> {
        let parsed = parse(value);
        if parsed.is_none() {
            self.error(field, format!("{field} must be one of: {}", allowed.join(", ")));
        }
        parsed
    }

    pub fn finish(self) -> WebResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(WebError::validation(self.errors))
        }
    }

    #[cfg(test)]
    fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}
