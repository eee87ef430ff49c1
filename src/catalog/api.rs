//! Request forms for the reference catalog.
//!
//! The handlers are generic over these two traits, a form knows how to
//! check itself and how to reach the table it belongs to. Partial
//! updates are the creation schema with every field optional.
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{
    CatalogEntity, Class, Feat, Feature, Item, Race, RaceAbility, Spell, Subclass, Subrace, SubraceAbility,
};
use crate::database::Querist;
use crate::error::{AppError, ValidationErrors};
use crate::validators::{check_one_of, check_range, DESCRIPTION, HIT_DICE, RARITIES, SCHOOLS, TITLE};

#[async_trait]
pub trait CreateForm: DeserializeOwned + Send + Sync {
    type Entity: CatalogEntity + Serialize;

    fn validate(&self) -> Result<(), AppError>;
    async fn insert<T: Querist>(&self, db: &mut T) -> Result<Self::Entity, AppError>;
}

#[async_trait]
pub trait EditForm: DeserializeOwned + Send + Sync {
    type Entity: CatalogEntity + Serialize;

    fn validate(&self) -> Result<(), AppError>;
    async fn apply<T: Querist>(&self, db: &mut T, id: &Uuid) -> Result<Option<Self::Entity>, AppError>;
}

fn check_name(errors: &mut ValidationErrors, name: &str) {
    errors.check("name", TITLE.run(name.trim()));
}

fn check_description(errors: &mut ValidationErrors, description: &str) {
    errors.check("description", DESCRIPTION.run(description));
}

/// The form pairs whose only payload is a name, a description and
/// possibly a parent reference.
macro_rules! catalog_forms {
    ($Create:ident / $Edit:ident for $Entity:ident $(, with $field:ident: $ty:ty)*) => {
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $Create {
            pub name: String,
            #[serde(default)]
            pub description: String,
            $(pub $field: $ty,)*
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $Edit {
            pub name: Option<String>,
            pub description: Option<String>,
            $(pub $field: Option<$ty>,)*
        }

        #[async_trait]
        impl CreateForm for $Create {
            type Entity = $Entity;

            fn validate(&self) -> Result<(), AppError> {
                let mut errors = ValidationErrors::default();
                check_name(&mut errors, &self.name);
                check_description(&mut errors, &self.description);
                errors.into_result()
            }

            async fn insert<T: Querist>(&self, db: &mut T) -> Result<$Entity, AppError> {
                $Entity::create(db, &self.name, &self.description $(, &self.$field)*).await
            }
        }

        #[async_trait]
        impl EditForm for $Edit {
            type Entity = $Entity;

            fn validate(&self) -> Result<(), AppError> {
                let mut errors = ValidationErrors::default();
                if let Some(name) = &self.name {
                    check_name(&mut errors, name);
                }
                if let Some(description) = &self.description {
                    check_description(&mut errors, description);
                }
                errors.into_result()
            }

            async fn apply<T: Querist>(&self, db: &mut T, id: &Uuid) -> Result<Option<$Entity>, AppError> {
                $Entity::edit(
                    db,
                    id,
                    self.name.as_deref(),
                    self.description.as_deref()
                    $(, self.$field.as_ref())*
                )
                .await
            }
        }
    };
}

catalog_forms!(CreateRace / EditRace for Race);
catalog_forms!(CreateFeature / EditFeature for Feature);
catalog_forms!(CreateFeat / EditFeat for Feat);
catalog_forms!(CreateSubrace / EditSubrace for Subrace, with race_id: Uuid);
catalog_forms!(CreateRaceAbility / EditRaceAbility for RaceAbility, with race_id: Uuid);
catalog_forms!(CreateSubraceAbility / EditSubraceAbility for SubraceAbility, with subrace_id: Uuid);
catalog_forms!(CreateSubclass / EditSubclass for Subclass, with class_id: Uuid);

// Classes, spells and items carry constrained fields, their forms are
// spelled out.

fn check_hit_die(errors: &mut ValidationErrors, hit_die: i16) {
    errors.check("hitDie", check_one_of(&hit_die, HIT_DICE, "Hit die must be one of 6, 8, 10 or 12."));
}

fn check_level(errors: &mut ValidationErrors, level: i16) {
    errors.check("level", check_range(level, 0, 9, "Spell level must be between 0 and 9."));
}

fn check_school(errors: &mut ValidationErrors, school: &str) {
    errors.check("school", check_one_of(&school, SCHOOLS, "Unknown school of magic."));
}

fn check_rarity(errors: &mut ValidationErrors, rarity: &str) {
    errors.check("rarity", check_one_of(&rarity, RARITIES, "Unknown rarity."));
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClass {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub hit_die: i16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditClass {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hit_die: Option<i16>,
}

#[async_trait]
impl CreateForm for CreateClass {
    type Entity = Class;

    fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        check_name(&mut errors, &self.name);
        check_description(&mut errors, &self.description);
        check_hit_die(&mut errors, self.hit_die);
        errors.into_result()
    }

    async fn insert<T: Querist>(&self, db: &mut T) -> Result<Class, AppError> {
        Class::create(db, &self.name, &self.description, &self.hit_die).await
    }
}

#[async_trait]
impl EditForm for EditClass {
    type Entity = Class;

    fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            check_name(&mut errors, name);
        }
        if let Some(description) = &self.description {
            check_description(&mut errors, description);
        }
        if let Some(hit_die) = self.hit_die {
            check_hit_die(&mut errors, hit_die);
        }
        errors.into_result()
    }

    async fn apply<T: Querist>(&self, db: &mut T, id: &Uuid) -> Result<Option<Class>, AppError> {
        Class::edit(
            db,
            id,
            self.name.as_deref(),
            self.description.as_deref(),
            self.hit_die.as_ref(),
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpell {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub level: i16,
    pub school: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSpell {
    pub name: Option<String>,
    pub description: Option<String>,
    pub level: Option<i16>,
    pub school: Option<String>,
}

#[async_trait]
impl CreateForm for CreateSpell {
    type Entity = Spell;

    fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        check_name(&mut errors, &self.name);
        check_description(&mut errors, &self.description);
        check_level(&mut errors, self.level);
        check_school(&mut errors, &self.school);
        errors.into_result()
    }

    async fn insert<T: Querist>(&self, db: &mut T) -> Result<Spell, AppError> {
        Spell::create(db, &self.name, &self.description, &self.level, &self.school).await
    }
}

#[async_trait]
impl EditForm for EditSpell {
    type Entity = Spell;

    fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            check_name(&mut errors, name);
        }
        if let Some(description) = &self.description {
            check_description(&mut errors, description);
        }
        if let Some(level) = self.level {
            check_level(&mut errors, level);
        }
        if let Some(school) = &self.school {
            check_school(&mut errors, school);
        }
        errors.into_result()
    }

    async fn apply<T: Querist>(&self, db: &mut T, id: &Uuid) -> Result<Option<Spell>, AppError> {
        Spell::edit(
            db,
            id,
            self.name.as_deref(),
            self.description.as_deref(),
            self.level.as_ref(),
            self.school.as_ref(),
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rarity: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rarity: Option<String>,
}

#[async_trait]
impl CreateForm for CreateItem {
    type Entity = Item;

    fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        check_name(&mut errors, &self.name);
        check_description(&mut errors, &self.description);
        check_rarity(&mut errors, &self.rarity);
        errors.into_result()
    }

    async fn insert<T: Querist>(&self, db: &mut T) -> Result<Item, AppError> {
        Item::create(db, &self.name, &self.description, &self.rarity).await
    }
}

#[async_trait]
impl EditForm for EditItem {
    type Entity = Item;

    fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            check_name(&mut errors, name);
        }
        if let Some(description) = &self.description {
            check_description(&mut errors, description);
        }
        if let Some(rarity) = &self.rarity {
            check_rarity(&mut errors, rarity);
        }
        errors.into_result()
    }

    async fn apply<T: Querist>(&self, db: &mut T, id: &Uuid) -> Result<Option<Item>, AppError> {
        Item::edit(
            db,
            id,
            self.name.as_deref(),
            self.description.as_deref(),
            self.rarity.as_ref(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spell_form_reports_every_violation() {
        let form: CreateSpell = serde_json::from_value(serde_json::json!({
            "name": "",
            "level": 12,
            "school": "hydromancy",
        }))
        .unwrap();
        let err = form.validate().unwrap_err();
        let fields: Vec<_> = err.field_errors().unwrap().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "level", "school"]);

        let form: CreateSpell = serde_json::from_value(serde_json::json!({
            "name": "Fireball",
            "description": "A bright streak flashes to a point you choose.",
            "level": 3,
            "school": "evocation",
        }))
        .unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn class_hit_die_is_constrained() {
        let form: CreateClass = serde_json::from_value(serde_json::json!({
            "name": "Wizard",
            "hitDie": 7,
        }))
        .unwrap();
        let err = form.validate().unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "hitDie");

        let form: CreateClass = serde_json::from_value(serde_json::json!({
            "name": "Wizard",
            "hitDie": 6,
        }))
        .unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn item_rarity_is_constrained() {
        let form: CreateItem = serde_json::from_value(serde_json::json!({
            "name": "Vorpal Sword",
            "rarity": "mythic",
        }))
        .unwrap();
        assert!(form.validate().is_err());

        let form: CreateItem = serde_json::from_value(serde_json::json!({
            "name": "Vorpal Sword",
            "rarity": "legendary",
        }))
        .unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn partial_subrace_edit_accepts_absent_fields() {
        let form: EditSubrace = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(form.validate().is_ok());

        let form: EditSubrace = serde_json::from_value(serde_json::json!({ "name": "" })).unwrap();
        assert!(form.validate().is_err());
    }
}
