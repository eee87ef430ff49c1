use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Npc;
use crate::error::{AppError, ValidationErrors};
use crate::locations::Location;
use crate::validators::{DESCRIPTION, TITLE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location_ids: Option<Vec<Uuid>>,
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
    /// When present, replaces the whole set of associated locations.
    pub location_ids: Option<Vec<Uuid>>,
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcWithLocations {
    pub npc: Npc,
    pub locations: Vec<Location>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_a_name() {
        let form = Create {
            name: String::new(),
            description: String::new(),
            location_ids: None,
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "name");

        let form = Create {
            name: "Sildar Hallwinter".to_string(),
            description: "A kindhearted veteran".to_string(),
            location_ids: Some(vec![Uuid::new_v4()]),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn empty_edit_is_valid() {
        let form = Edit {
            name: None,
            description: None,
            location_ids: None,
        };
        assert!(form.validate().is_ok());
    }
}
