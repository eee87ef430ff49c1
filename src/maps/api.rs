use serde::Deserialize;

use crate::error::{AppError, ValidationErrors};
use crate::validators::{DESCRIPTION, IMAGE_URL, TITLE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
}

impl Create {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        errors.check("name", TITLE.run(self.name.trim()));
        errors.check("description", DESCRIPTION.run(&self.description));
        errors.check("imageUrl", IMAGE_URL.run(&self.image_url));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
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
        if let Some(image_url) = &self.image_url {
            errors.check("imageUrl", IMAGE_URL.run(image_url));
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_is_checked() {
        let form = Create {
            name: "Phandalin".to_string(),
            description: String::new(),
            image_url: "ftp://example.com/phandalin.png".to_string(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "imageUrl");

        let form = Create {
            name: "Phandalin".to_string(),
            description: String::new(),
            image_url: "https://example.com/phandalin.png".to_string(),
        };
        assert!(form.validate().is_ok());
    }
}
