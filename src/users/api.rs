use serde::{Deserialize, Serialize};

use super::User;
use crate::error::{AppError, ValidationErrors};
use crate::validators::{EMAIL, PASSWORD, USERNAME};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Register {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        errors.check("name", USERNAME.run(self.name.trim()));
        errors.check("email", EMAIL.run(&self.email));
        errors.check("password", PASSWORD.run(&self.password));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: String,
    #[serde(default)]
    pub with_token: bool,
}

impl Login {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        if self.name.is_none() && self.email.is_none() {
            errors.push("email", "Either a name or an e-mail address is required.");
        }
        if self.password.is_empty() {
            errors.push("password", "Password shall not be empty.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginReturn {
    pub user: User,
    /// Only filled for clients that asked to hold the token themselves,
    /// browsers get it as a cookie.
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_reports_every_field() {
        let form = Register {
            name: "a".to_string(),
            email: "nope".to_string(),
            password: "short".to_string(),
        };
        let err = form.validate().unwrap_err();
        let fields: Vec<_> = err.field_errors().unwrap().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "password"]);

        let form = Register {
            name: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "12345678".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn login_requires_an_identifier() {
        let form = Login {
            name: None,
            email: None,
            password: "12345678".to_string(),
            with_token: false,
        };
        assert!(form.validate().is_err());

        let form = Login {
            name: Some("ana".to_string()),
            email: None,
            password: "12345678".to_string(),
            with_token: false,
        };
        assert!(form.validate().is_ok());
    }
}
