//! Client-side form validation.
//!
//! A form is a plain struct of raw string inputs. [`Form::validate`] runs every
//! rule and either converts the inputs into the request or draft the backend
//! expects, or returns a [`ValidationErrors`] map from field key to message.
//! Validation failures never reach the network.
//!
//! [`FormState`] adds the controlled-input behaviour: editing a field clears
//! that field's error only, and submitting re-runs the full validation.
//!
//! # Example
//!
//! ```
//! use travel_desk_client::forms::{FormState, LoginField, LoginForm};
//!
//! let mut form = FormState::new(LoginForm::default());
//! assert!(form.submit().is_none());
//! assert!(form.error(LoginField::Email).is_some());
//!
//! form.set(LoginField::Email, "agent@example.com");
//! assert!(form.error(LoginField::Email).is_none());
//!
//! form.set(LoginField::Password, "hunter22");
//! let request = form.submit();
//! assert!(request.is_some());
//! ```

pub mod auth;
pub mod catalog;
pub mod chat;

pub use auth::{
    LoginField, LoginForm, RegistrationField, RegistrationForm, VerifyEmailField, VerifyEmailForm,
};
pub use catalog::{FlightField, FlightForm, HotelField, HotelForm, PackageField, PackageForm};
pub use chat::{ChatComposer, ComposerField};

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LEN: usize = 6;

#[allow(clippy::expect_used)]
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

/// Field key to message, in the order the rules ran
///
/// A field without an entry is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    /// No errors
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Record an error; a field keeps its first message
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.entries.push((field, message.into()));
        }
    }

    /// Drop the error of one field
    pub fn remove(&mut self, field: &str) {
        self.entries.retain(|(key, _)| *key != field);
    }

    /// Message for `field`, if it failed
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == field)
            .map(|(_, message)| message.as_str())
    }

    /// Whether `field` has an error
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Whether every field passed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of failing fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Failing field keys with their messages
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(key, message)| (*key, message.as_str()))
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`
    ///
    /// # Errors
    ///
    /// Returns the collected errors when at least one field failed.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ═══════════════════════════════════════════════════════════════════════
// Form state
// ═══════════════════════════════════════════════════════════════════════

/// A validated input form
pub trait Form {
    /// Field selector
    type Field: Copy;

    /// What a valid form converts into
    type Output;

    /// Stable key of a field in [`ValidationErrors`]
    fn key(field: Self::Field) -> &'static str;

    /// Replace the raw input of one field
    fn set(&mut self, field: Self::Field, value: String);

    /// Run every rule
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    fn validate(&self) -> Result<Self::Output, ValidationErrors>;
}

/// Form values plus the errors currently displayed
#[derive(Clone, Debug, Default)]
pub struct FormState<F> {
    values: F,
    errors: ValidationErrors,
}

impl<F: Form> FormState<F> {
    /// Start from `values` with no errors shown
    #[must_use]
    pub fn new(values: F) -> Self {
        Self {
            values,
            errors: ValidationErrors::new(),
        }
    }

    /// Current raw values
    pub const fn values(&self) -> &F {
        &self.values
    }

    /// Errors currently displayed
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Error shown for `field`
    pub fn error(&self, field: F::Field) -> Option<&str> {
        self.errors.get(F::key(field))
    }

    /// Edit one field and clear its error; other errors stay until submit
    pub fn set(&mut self, field: F::Field, value: impl Into<String>) {
        self.values.set(field, value.into());
        self.errors.remove(F::key(field));
    }

    /// Re-run full validation; the output is returned only when valid
    pub fn submit(&mut self) -> Option<F::Output> {
        match self.values.validate() {
            Ok(output) => {
                self.errors = ValidationErrors::new();
                Some(output)
            },
            Err(errors) => {
                tracing::debug!(failing = errors.len(), "Form submission blocked");
                self.errors = errors;
                None
            },
        }
    }

    /// Discard the values and errors
    pub fn reset(&mut self)
    where
        F: Default,
    {
        *self = Self::default();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Rules
// ═══════════════════════════════════════════════════════════════════════

/// Trimmed value, or `None` when blank
#[must_use]
pub fn present(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Whether `value` has the shape `local@domain.tld`
#[must_use]
pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value.trim())
}

/// Require a non-blank value
pub fn required(errors: &mut ValidationErrors, field: &'static str, label: &str, value: &str) {
    if present(value).is_none() {
        errors.insert(field, format!("{label} is required"));
    }
}

/// Require a non-blank, email-shaped value
pub fn email(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if present(value).is_none() {
        errors.insert(field, "Email is required");
    } else if !is_email(value) {
        errors.insert(field, "Email is invalid");
    }
}

/// Require a password of at least [`MIN_PASSWORD_LEN`] characters
pub fn password(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if present(value).is_none() {
        errors.insert(field, "Password is required");
    } else if value.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            field,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
}

/// Require `confirmation` to equal `password`
pub fn confirmation(errors: &mut ValidationErrors, field: &'static str, password: &str, confirmation: &str) {
    if present(confirmation).is_none() {
        errors.insert(field, "Please confirm your password");
    } else if password != confirmation {
        errors.insert(field, "Passwords do not match");
    }
}

/// A numeric form input
pub trait Quantity: FromStr + PartialOrd + Default {
    /// Whether the parsed value is an ordinary number (not `inf` or `NaN`)
    fn is_finite(&self) -> bool {
        true
    }
}

impl Quantity for u32 {}

impl Quantity for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

/// Parse a required, finite number greater than zero
pub fn positive<N: Quantity>(errors: &mut ValidationErrors, field: &'static str, label: &str, value: &str) -> Option<N> {
    let Some(raw) = present(value) else {
        errors.insert(field, format!("{label} is required"));
        return None;
    };

    match raw.parse::<N>() {
        Ok(number) if !number.is_finite() => {
            errors.insert(field, format!("{label} must be a number"));
            None
        },
        Ok(number) if number > N::default() => Some(number),
        Ok(_) => {
            errors.insert(field, format!("{label} must be greater than zero"));
            None
        },
        Err(_) => {
            errors.insert(field, format!("{label} must be a number"));
            None
        },
    }
}

/// Split a comma-separated input into trimmed, non-empty items
#[must_use]
pub fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(present)
        .map(str::to_string)
        .collect()
}
