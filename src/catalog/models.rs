//! The reference catalog: globally shared lookup tables maintained by
//! administrators and readable by anyone.
//!
//! All ten tables share one lifecycle, so the entity types come out of
//! a macro and the handlers drive them through the `CatalogEntity`
//! trait. Parent references are real foreign keys, creating a child
//! under a missing parent reads as the parent being not found.
use async_trait::async_trait;
use chrono::naive::NaiveDateTime;
use postgres_types::FromSql;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{self, Querist};
use crate::error::{AppError, DbError};
use crate::utils::{inner_map, merge_blank};

#[async_trait]
pub trait CatalogEntity: Sized + Send {
    /// The display name used in not-found messages.
    const WHAT: &'static str;

    async fn all<T: Querist>(db: &mut T) -> Result<Vec<Self>, DbError>;
    async fn get_by_id<T: Querist>(db: &mut T, id: &Uuid) -> Result<Option<Self>, DbError>;
    async fn delete<T: Querist>(db: &mut T, id: &Uuid) -> Result<u64, DbError>;
}

macro_rules! catalog_entity {
    (
        $Entity:ident, $table:literal, $what:literal,
        fields { $($field:ident: $ty:ty),* $(,)? },
        create $create_sql:literal,
        edit $edit_sql:literal
        $(, parent ($fk:literal, $parent:literal))*
    ) => {
        #[derive(Debug, Serialize, Deserialize, FromSql, Clone)]
        #[serde(rename_all = "camelCase")]
        #[postgres(name = $table)]
        pub struct $Entity {
            pub id: Uuid,
            pub name: String,
            pub description: String,
            $(pub $field: $ty,)*
            #[serde(with = "crate::date_format")]
            pub created: NaiveDateTime,
            #[serde(with = "crate::date_format")]
            pub modified: NaiveDateTime,
        }

        impl $Entity {
            fn classify(e: DbError) -> AppError {
                $(
                    if database::violated_foreign_key(&e) == Some($fk) {
                        return AppError::NotFound($parent);
                    }
                )*
                e.into()
            }

            pub async fn create<T: Querist>(
                db: &mut T,
                name: &str,
                description: &str,
                $($field: &$ty,)*
            ) -> Result<$Entity, AppError> {
                let name = merge_blank(name);
                let result = db
                    .query_exactly_one($create_sql, &[&name, &description $(, $field)*])
                    .await;
                match result {
                    Ok(row) => Ok(row.get(0)),
                    Err(e) => Err(Self::classify(e)),
                }
            }

            pub async fn edit<T: Querist>(
                db: &mut T,
                id: &Uuid,
                name: Option<&str>,
                description: Option<&str>,
                $($field: Option<&$ty>,)*
            ) -> Result<Option<$Entity>, AppError> {
                let name = name.map(merge_blank);
                let result = db
                    .query_one($edit_sql, &[id, &name, &description $(, &$field)*])
                    .await;
                match result {
                    Ok(row) => Ok(row.map(|row| row.get(0))),
                    Err(e) => Err(Self::classify(e)),
                }
            }
        }

        #[async_trait]
        impl CatalogEntity for $Entity {
            const WHAT: &'static str = $what;

            async fn all<T: Querist>(db: &mut T) -> Result<Vec<$Entity>, DbError> {
                let rows = db
                    .query(concat!("SELECT ", $table, " FROM ", $table, " ORDER BY name"), &[])
                    .await?;
                Ok(rows.into_iter().map(|row| row.get(0)).collect())
            }

            async fn get_by_id<T: Querist>(db: &mut T, id: &Uuid) -> Result<Option<$Entity>, DbError> {
                let result = db
                    .query_one(
                        concat!("SELECT ", $table, " FROM ", $table, " WHERE id = $1 LIMIT 1"),
                        &[id],
                    )
                    .await;
                inner_map(result, |row| row.get(0))
            }

            async fn delete<T: Querist>(db: &mut T, id: &Uuid) -> Result<u64, DbError> {
                db.execute(concat!("DELETE FROM ", $table, " WHERE id = $1"), &[id]).await
            }
        }
    };
}

catalog_entity! {
    Race, "races", "Race",
    fields {},
    create "INSERT INTO races (name, description) VALUES ($1, $2) RETURNING races",
    edit "UPDATE races SET name = coalesce($2, name), description = coalesce($3, description), \
          modified = (now() at time zone 'utc') WHERE id = $1 RETURNING races"
}

catalog_entity! {
    Subrace, "subraces", "Subrace",
    fields { race_id: Uuid },
    create "INSERT INTO subraces (name, description, race_id) VALUES ($1, $2, $3) RETURNING subraces",
    edit "UPDATE subraces SET name = coalesce($2, name), description = coalesce($3, description), \
          race_id = coalesce($4, race_id), modified = (now() at time zone 'utc') \
          WHERE id = $1 RETURNING subraces",
    parent ("subraces_race_id_fkey", "Race")
}

catalog_entity! {
    RaceAbility, "race_abilities", "Race ability",
    fields { race_id: Uuid },
    create "INSERT INTO race_abilities (name, description, race_id) VALUES ($1, $2, $3) RETURNING race_abilities",
    edit "UPDATE race_abilities SET name = coalesce($2, name), description = coalesce($3, description), \
          race_id = coalesce($4, race_id), modified = (now() at time zone 'utc') \
          WHERE id = $1 RETURNING race_abilities",
    parent ("race_abilities_race_id_fkey", "Race")
}

catalog_entity! {
    SubraceAbility, "subrace_abilities", "Subrace ability",
    fields { subrace_id: Uuid },
    create "INSERT INTO subrace_abilities (name, description, subrace_id) VALUES ($1, $2, $3) \
            RETURNING subrace_abilities",
    edit "UPDATE subrace_abilities SET name = coalesce($2, name), description = coalesce($3, description), \
          subrace_id = coalesce($4, subrace_id), modified = (now() at time zone 'utc') \
          WHERE id = $1 RETURNING subrace_abilities",
    parent ("subrace_abilities_subrace_id_fkey", "Subrace")
}

catalog_entity! {
    Class, "classes", "Class",
    fields { hit_die: i16 },
    create "INSERT INTO classes (name, description, hit_die) VALUES ($1, $2, $3) RETURNING classes",
    edit "UPDATE classes SET name = coalesce($2, name), description = coalesce($3, description), \
          hit_die = coalesce($4, hit_die), modified = (now() at time zone 'utc') \
          WHERE id = $1 RETURNING classes"
}

catalog_entity! {
    Subclass, "subclasses", "Subclass",
    fields { class_id: Uuid },
    create "INSERT INTO subclasses (name, description, class_id) VALUES ($1, $2, $3) RETURNING subclasses",
    edit "UPDATE subclasses SET name = coalesce($2, name), description = coalesce($3, description), \
          class_id = coalesce($4, class_id), modified = (now() at time zone 'utc') \
          WHERE id = $1 RETURNING subclasses",
    parent ("subclasses_class_id_fkey", "Class")
}

catalog_entity! {
    Spell, "spells", "Spell",
    fields { level: i16, school: String },
    create "INSERT INTO spells (name, description, level, school) VALUES ($1, $2, $3, $4) RETURNING spells",
    edit "UPDATE spells SET name = coalesce($2, name), description = coalesce($3, description), \
          level = coalesce($4, level), school = coalesce($5, school), \
          modified = (now() at time zone 'utc') WHERE id = $1 RETURNING spells"
}

catalog_entity! {
    Item, "items", "Item",
    fields { rarity: String },
    create "INSERT INTO items (name, description, rarity) VALUES ($1, $2, $3) RETURNING items",
    edit "UPDATE items SET name = coalesce($2, name), description = coalesce($3, description), \
          rarity = coalesce($4, rarity), modified = (now() at time zone 'utc') \
          WHERE id = $1 RETURNING items"
}

catalog_entity! {
    Feature, "features", "Feature",
    fields {},
    create "INSERT INTO features (name, description) VALUES ($1, $2) RETURNING features",
    edit "UPDATE features SET name = coalesce($2, name), description = coalesce($3, description), \
          modified = (now() at time zone 'utc') WHERE id = $1 RETURNING features"
}

catalog_entity! {
    Feat, "feats", "Feat",
    fields {},
    create "INSERT INTO feats (name, description) VALUES ($1, $2) RETURNING feats",
    edit "UPDATE feats SET name = coalesce($2, name), description = coalesce($3, description), \
          modified = (now() at time zone 'utc') WHERE id = $1 RETURNING feats"
}
