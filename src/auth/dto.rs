use serde::Deserialize;

use super::repo_types::NewUser;
use crate::validation::{self, FormErrors};

/// Submitted registration form. Absent fields deserialize as empty so they
/// fail validation instead of the extractor.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Submitted login form.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `?next=` on the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    pub fn target(&self) -> Option<&str> {
        self.next.as_deref().filter(|n| !n.is_empty())
    }
}

/// Whether the submitted username/email already belong to someone.
#[derive(Debug, Default, Clone, Copy)]
pub struct Availability {
    pub username_taken: bool,
    pub email_taken: bool,
}

/// Validated login credentials.
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl RegisterForm {
    pub fn validate(&self, availability: Availability) -> Result<NewUser, FormErrors> {
        let mut errors = FormErrors::new();

        if validation::required(&mut errors, "username", &self.username) {
            validation::length_between(&mut errors, "username", &self.username, 5, 30);
            if availability.username_taken {
                errors.add("username", "Username already taken.");
            }
        }

        if validation::required(&mut errors, "email", &self.email) {
            validation::email(&mut errors, "email", &self.email);
            if availability.email_taken {
                errors.add("email", "Email already taken.");
            }
        }

        if validation::present(&mut errors, "password", &self.password) {
            validation::min_length(&mut errors, "password", &self.password, 8);
        }

        if validation::present(&mut errors, "password_confirm", &self.password_confirm) {
            validation::min_length(&mut errors, "password_confirm", &self.password_confirm, 8);
            if self.password_confirm != self.password {
                errors.add("password_confirm", "Passwords must match");
            }
        }

        errors.into_result(NewUser {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials<'_>, FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "username", &self.username);
        validation::present(&mut errors, "password", &self.password);
        errors.into_result(Credentials {
            username: &self.username,
            password: &self.password,
        })
    }
}
