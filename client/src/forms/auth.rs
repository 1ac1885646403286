//! Login, registration and email verification forms.

use super::{Form, ValidationErrors, confirmation, email, password, present, required};
use travel_desk_api::types::{LoginRequest, RegisterRequest, Role, VerifyEmailRequest};

/// Length of an email verification code
pub const VERIFICATION_CODE_LEN: usize = 6;

// ═══════════════════════════════════════════════════════════════════════
// Login
// ═══════════════════════════════════════════════════════════════════════

/// Fields of [`LoginForm`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginField {
    /// Email
    Email,
    /// Password
    Password,
}

/// Sign-in form
#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    /// Raw email input
    pub email: String,
    /// Raw password input
    pub password: String,
}

impl Form for LoginForm {
    type Field = LoginField;
    type Output = LoginRequest;

    fn key(field: LoginField) -> &'static str {
        match field {
            LoginField::Email => "email",
            LoginField::Password => "password",
        }
    }

    fn set(&mut self, field: LoginField, value: String) {
        match field {
            LoginField::Email => self.email = value,
            LoginField::Password => self.password = value,
        }
    }

    fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        email(&mut errors, "email", &self.email);
        if present(&self.password).is_none() {
            errors.insert("password", "Password is required");
        }

        errors.into_result(|| LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════════════════

/// Fields of [`RegistrationForm`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationField {
    /// Full name
    Name,
    /// Email
    Email,
    /// Phone (optional)
    Phone,
    /// Password
    Password,
    /// Password again
    ConfirmPassword,
    /// `agent`, `customer` or `admin`
    Role,
}

/// Sign-up form
#[derive(Clone, Debug)]
pub struct RegistrationForm {
    /// Raw name input
    pub name: String,
    /// Raw email input
    pub email: String,
    /// Raw phone input, may be blank
    pub phone: String,
    /// Raw password input
    pub password: String,
    /// Raw confirmation input
    pub confirm_password: String,
    /// Raw role input
    pub role: String,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            role: "agent".to_string(),
        }
    }
}

impl Form for RegistrationForm {
    type Field = RegistrationField;
    type Output = RegisterRequest;

    fn key(field: RegistrationField) -> &'static str {
        match field {
            RegistrationField::Name => "name",
            RegistrationField::Email => "email",
            RegistrationField::Phone => "phone",
            RegistrationField::Password => "password",
            RegistrationField::ConfirmPassword => "confirm_password",
            RegistrationField::Role => "role",
        }
    }

    fn set(&mut self, field: RegistrationField, value: String) {
        match field {
            RegistrationField::Name => self.name = value,
            RegistrationField::Email => self.email = value,
            RegistrationField::Phone => self.phone = value,
            RegistrationField::Password => self.password = value,
            RegistrationField::ConfirmPassword => self.confirm_password = value,
            RegistrationField::Role => self.role = value,
        }
    }

    fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "name", "Name", &self.name);
        email(&mut errors, "email", &self.email);
        password(&mut errors, "password", &self.password);
        confirmation(&mut errors, "confirm_password", &self.password, &self.confirm_password);

        let role = Role::parse(&self.role);
        if role.is_none() {
            errors.insert("role", "Select a valid role");
        }

        match role {
            Some(role) if errors.is_empty() => Ok(RegisterRequest {
                name: self.name.trim().to_string(),
                email: self.email.trim().to_string(),
                phone: present(&self.phone).map(str::to_string),
                password: self.password.clone(),
                role,
            }),
            _ => Err(errors),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Email verification
// ═══════════════════════════════════════════════════════════════════════

/// Fields of [`VerifyEmailForm`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyEmailField {
    /// Email being verified
    Email,
    /// Code from the verification mail
    Code,
}

/// Email verification form, usually prefilled with the registered address
#[derive(Clone, Debug, Default)]
pub struct VerifyEmailForm {
    /// Raw email input
    pub email: String,
    /// Raw code input
    pub code: String,
}

impl VerifyEmailForm {
    /// Form for the address awaiting verification
    #[must_use]
    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            code: String::new(),
        }
    }
}

impl Form for VerifyEmailForm {
    type Field = VerifyEmailField;
    type Output = VerifyEmailRequest;

    fn key(field: VerifyEmailField) -> &'static str {
        match field {
            VerifyEmailField::Email => "email",
            VerifyEmailField::Code => "code",
        }
    }

    fn set(&mut self, field: VerifyEmailField, value: String) {
        match field {
            VerifyEmailField::Email => self.email = value,
            VerifyEmailField::Code => self.code = value,
        }
    }

    fn validate(&self) -> Result<VerifyEmailRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        email(&mut errors, "email", &self.email);

        let code = self.code.trim();
        if code.is_empty() {
            errors.insert("code", "Verification code is required");
        } else if code.len() != VERIFICATION_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            errors.insert(
                "code",
                format!("Verification code must be {VERIFICATION_CODE_LEN} digits"),
            );
        }

        errors.into_result(|| VerifyEmailRequest {
            email: self.email.trim().to_string(),
            code: code.to_string(),
        })
    }
}
