use hyper::StatusCode;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use thiserror::Error;
pub use tokio_postgres::Error as DbError;

/// A single violated constraint, named after the request field.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Collects every violated field of a request body before any of it
/// touches the database.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn check(&mut self, field: &'static str, result: Result<(), &'static str>) {
        if let Err(message) = result {
            self.push(field, message);
        }
    }

    pub fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError { field, message });
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationFail(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", e.field)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("An unexpected database error occurred")]
    Database(#[from] DbError),
    #[error("Authentication failed")]
    Unauthenticated,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Permission denied")]
    NoPermission,
    #[error("Validation failed: {0}")]
    ValidationFail(ValidationErrors),
    #[error("Could not allocate a unique join code")]
    CodeExhausted,
    #[error("An unexpected error occurred")]
    Unexpected(anyhow::Error),
    #[error("Wrong request format: {0}")]
    BadRequest(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{0} already exists")]
    AlreadyExists(&'static str),
    #[error("An I/O error occurred")]
    HyperError(#[from] hyper::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        use AppError::*;
        match self {
            Unauthenticated => StatusCode::UNAUTHORIZED,
            NotFound(_) => StatusCode::NOT_FOUND,
            NoPermission => StatusCode::FORBIDDEN,
            ValidationFail(_) | BadRequest(_) => StatusCode::BAD_REQUEST,
            MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AlreadyExists(_) => StatusCode::CONFLICT,
            CodeExhausted => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            AppError::ValidationFail(errors) => Some(errors.fields()),
            _ => None,
        }
    }

    pub fn missing() -> AppError {
        AppError::BadRequest("The request was sent with the wrong path or method".to_string())
    }

    pub fn unexpected<E: Error + Send + Sync + 'static>(e: E) -> AppError {
        AppError::Unexpected(e.into())
    }
}

macro_rules! unexpected {
    () => {
        |e| {
            ::log::error!("Unexpected error: [{}][{}]{}", file!(), line!(), e);
            crate::error::AppError::Unexpected(e.into())
        }
    };
    ($msg: expr) => {{
        let msg = $msg.to_string();
        ::log::error!("Unexpected error: [{}][{}]{}", file!(), line!(), msg);
        crate::error::AppError::Unexpected(::anyhow::anyhow!(msg))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NoPermission.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Campaign").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::AlreadyExists("User").status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::missing().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::CodeExhausted.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AppError::Unexpected(anyhow::anyhow!("oh no")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message() {
        assert_eq!(AppError::NotFound("Campaign").to_string(), "Campaign not found");
    }

    #[test]
    fn collects_every_violation() {
        let mut errors = ValidationErrors::default();
        errors.check("name", Ok(()));
        assert!(errors.clone().into_result().is_ok());

        errors.check("email", Err("Invalid e-mail address"));
        errors.push("password", "Password length shall not be less than 8.");
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let fields: Vec<_> = err.field_errors().unwrap().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["email", "password"]);
        assert_eq!(err.to_string(), "Validation failed: email, password");
    }
}
