use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, ValidationErrors};
use crate::validators::{DESCRIPTION, TITLE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub race_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
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
    /// An explicit `null` clears the reference, an absent field keeps it.
    #[serde(default, deserialize_with = "crate::utils::explicit_null")]
    pub race_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "crate::utils::explicit_null")]
    pub class_id: Option<Option<Uuid>>,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_tells_null_from_absent() {
        let form: Edit = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(form.race_id, None);
        assert_eq!(form.class_id, None);

        let form: Edit = serde_json::from_value(serde_json::json!({ "raceId": null })).unwrap();
        assert_eq!(form.race_id, Some(None));

        let id = Uuid::new_v4();
        let form: Edit = serde_json::from_value(serde_json::json!({ "raceId": id })).unwrap();
        assert_eq!(form.race_id, Some(Some(id)));
    }
}
