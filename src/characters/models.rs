use chrono::naive::NaiveDateTime;
use postgres_types::FromSql;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{self, Querist};
use crate::error::{AppError, DbError};
use crate::utils::{inner_map, merge_blank};

#[derive(Debug, Serialize, Deserialize, FromSql, Clone)]
#[serde(rename_all = "camelCase")]
#[postgres(name = "characters")]
pub struct Character {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub name: String,
    pub description: String,
    pub race_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
    #[serde(with = "crate::date_format")]
    pub modified: NaiveDateTime,
}

fn classify(e: DbError) -> AppError {
    match database::violated_foreign_key(&e) {
        Some("characters_race_id_fkey") => AppError::NotFound("Race"),
        Some("characters_class_id_fkey") => AppError::NotFound("Class"),
        _ => e.into(),
    }
}

impl Character {
    pub async fn create<T: Querist>(
        db: &mut T,
        campaign_id: &Uuid,
        name: &str,
        description: &str,
        race_id: Option<&Uuid>,
        class_id: Option<&Uuid>,
    ) -> Result<Character, AppError> {
        let name = merge_blank(name);
        let result = db
            .query_exactly_one(
                include_str!("sql/create.sql"),
                &[campaign_id, &name, &description, &race_id, &class_id],
            )
            .await;
        match result {
            Ok(row) => Ok(row.get(0)),
            Err(e) => Err(classify(e)),
        }
    }

    pub async fn get<T: Querist>(db: &mut T, campaign_id: &Uuid, id: &Uuid) -> Result<Option<Character>, DbError> {
        let result = db.query_one(include_str!("sql/get.sql"), &[id, campaign_id]).await;
        inner_map(result, |row| row.get(0))
    }

    pub async fn get_by_campaign<T: Querist>(db: &mut T, campaign_id: &Uuid) -> Result<Vec<Character>, DbError> {
        let rows = db.query(include_str!("sql/by_campaign.sql"), &[campaign_id]).await?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    /// The catalog references distinguish "leave alone" (`None`) from
    /// "clear" (`Some(None)`).
    pub async fn edit<T: Querist>(
        db: &mut T,
        campaign_id: &Uuid,
        id: &Uuid,
        name: Option<&str>,
        description: Option<&str>,
        race_id: Option<Option<Uuid>>,
        class_id: Option<Option<Uuid>>,
    ) -> Result<Option<Character>, AppError> {
        let name = name.map(merge_blank);
        let result = db
            .query_one(
                include_str!("sql/edit.sql"),
                &[
                    id,
                    campaign_id,
                    &name,
                    &description,
                    &race_id.is_some(),
                    &race_id.flatten(),
                    &class_id.is_some(),
                    &class_id.flatten(),
                ],
            )
            .await;
        match result {
            Ok(row) => Ok(row.map(|row| row.get(0))),
            Err(e) => Err(classify(e)),
        }
    }

    pub async fn delete<T: Querist>(db: &mut T, campaign_id: &Uuid, id: &Uuid) -> Result<u64, DbError> {
        db.execute(include_str!("sql/delete.sql"), &[id, campaign_id]).await
    }
}
