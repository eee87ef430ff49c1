use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Campaign, ContributorWithUser};
use crate::characters::Character;
use crate::error::{AppError, ValidationErrors};
use crate::locations::Location;
use crate::maps::Map;
use crate::missions::Mission;
use crate::notes::Note;
use crate::npcs::api::NpcWithLocations;
use crate::validators::{DESCRIPTION, JOIN_CODE, TITLE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub name: String,
    #[serde(default)]
    pub description: String,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    pub code: String,
}

impl Join {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        errors.check("code", JOIN_CODE.run(&self.code));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorChange {
    pub user_id: Uuid,
}

/// The create response is the one public read that carries the code.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCreated {
    pub campaign: Campaign,
    pub join_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCode {
    pub join_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignWithRelated {
    pub campaign: Campaign,
    pub contributors: Vec<ContributorWithUser>,
    pub characters: Vec<Character>,
    pub locations: Vec<Location>,
    pub missions: Vec<Mission>,
    pub notes: Vec<Note>,
    pub maps: Vec<Map>,
    pub npcs: Vec<NpcWithLocations>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_reports_every_violation() {
        let form = Create {
            name: "   ".to_string(),
            description: "d".repeat(5000),
        };
        let err = form.validate().unwrap_err();
        let fields: Vec<_> = err.field_errors().unwrap().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "description"]);

        let form = Create {
            name: "Curse of Strahd".to_string(),
            description: String::new(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn partial_edit_accepts_absent_fields() {
        let form = Edit {
            name: None,
            description: None,
        };
        assert!(form.validate().is_ok());

        let form = Edit {
            name: Some(String::new()),
            description: None,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn join_code_shape_is_checked() {
        assert!(Join { code: "a1-b2_c3D4".to_string() }.validate().is_ok());
        assert!(Join { code: "nope".to_string() }.validate().is_err());
    }
}
