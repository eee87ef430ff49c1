use chrono::naive::NaiveDateTime;
use postgres_types::FromSql;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::Querist;
use crate::error::DbError;
use crate::utils::{inner_map, merge_blank};

#[derive(Debug, Serialize, Deserialize, FromSql, Clone)]
#[serde(rename_all = "camelCase")]
#[postgres(name = "missions")]
pub struct Mission {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub name: String,
    pub description: String,
    pub completed: bool,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
    #[serde(with = "crate::date_format")]
    pub modified: NaiveDateTime,
}

impl Mission {
    pub async fn create<T: Querist>(
        db: &mut T,
        campaign_id: &Uuid,
        name: &str,
        description: &str,
        completed: bool,
    ) -> Result<Mission, DbError> {
        let name = merge_blank(name);
        let row = db
            .query_exactly_one(
                include_str!("sql/create.sql"),
                &[campaign_id, &name, &description, &completed],
            )
            .await?;
        Ok(row.get(0))
    }

    pub async fn get<T: Querist>(db: &mut T, campaign_id: &Uuid, id: &Uuid) -> Result<Option<Mission>, DbError> {
        let result = db.query_one(include_str!("sql/get.sql"), &[id, campaign_id]).await;
        inner_map(result, |row| row.get(0))
    }

    pub async fn get_by_campaign<T: Querist>(db: &mut T, campaign_id: &Uuid) -> Result<Vec<Mission>, DbError> {
        let rows = db.query(include_str!("sql/by_campaign.sql"), &[campaign_id]).await?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    pub async fn edit<T: Querist>(
        db: &mut T,
        campaign_id: &Uuid,
        id: &Uuid,
        name: Option<&str>,
        description: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Option<Mission>, DbError> {
        let name = name.map(merge_blank);
        let result = db
            .query_one(
                include_str!("sql/edit.sql"),
                &[id, campaign_id, &name, &description, &completed],
            )
            .await;
        inner_map(result, |row| row.get(0))
    }

    pub async fn delete<T: Querist>(db: &mut T, campaign_id: &Uuid, id: &Uuid) -> Result<u64, DbError> {
        db.execute(include_str!("sql/delete.sql"), &[id, campaign_id]).await
    }
}
