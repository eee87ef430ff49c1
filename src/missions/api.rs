use serde::Deserialize;

use crate::error::{AppError, ValidationErrors};
use crate::validators::{DESCRIPTION, TITLE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Create {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        errors.check("name", TITLE.run(self.name.trim()));
        errors.check("description", DESCRIPTION.run(&self.description));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl Edit {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check("name", TITLE.run(name.trim()));
        }
        if let Some(description) = &self.description {
            errors.check("description", DESCRIPTION.run(description));
        }
        errors.into_result()
    }
}
