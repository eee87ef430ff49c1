pub mod api;
pub mod handlers;
mod models;

pub use models::{CatalogEntity, Class, Feat, Feature, Item, Race, RaceAbility, Spell, Subclass, Subrace, SubraceAbility};
