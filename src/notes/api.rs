use serde::Deserialize;

use crate::error::{AppError, ValidationErrors};
use crate::validators::{CONTENT, TITLE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Create {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        errors.check("title", TITLE.run(self.title.trim()));
        errors.check("content", CONTENT.run(&self.content));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Edit {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        if let Some(title) = &self.title {
            errors.check("title", TITLE.run(title.trim()));
        }
        if let Some(content) = &self.content {
            errors.check("content", CONTENT.run(content));
        }
        errors.into_result()
    }
}
