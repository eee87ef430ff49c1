use chrono::naive::NaiveDateTime;
use postgres_types::FromSql;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::api::NpcWithLocations;
use crate::database::{self, Querist};
use crate::error::{AppError, DbError};
use crate::locations::Location;
use crate::utils::{inner_map, merge_blank};

#[derive(Debug, Serialize, Deserialize, FromSql, Clone)]
#[serde(rename_all = "camelCase")]
#[postgres(name = "npcs")]
pub struct Npc {
    pub id: Uuid,
    // Nullable in the schema, the REST surface always sets it.
    pub campaign_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
    #[serde(with = "crate::date_format")]
    pub modified: NaiveDateTime,
}

impl Npc {
    pub async fn create<T: Querist>(
        db: &mut T,
        campaign_id: &Uuid,
        name: &str,
        description: &str,
    ) -> Result<Npc, DbError> {
        let name = merge_blank(name);
        let row = db
            .query_exactly_one(include_str!("sql/create.sql"), &[campaign_id, &name, &description])
            .await?;
        Ok(row.get(0))
    }

    pub async fn get<T: Querist>(db: &mut T, campaign_id: &Uuid, id: &Uuid) -> Result<Option<Npc>, DbError> {
        let result = db.query_one(include_str!("sql/get.sql"), &[id, campaign_id]).await;
        inner_map(result, |row| row.get(0))
    }

    /// One join query, folded into one entry per NPC. The rows arrive
    /// grouped by NPC id, so a plain fold is enough.
    pub async fn with_locations_by_campaign<T: Querist>(
        db: &mut T,
        campaign_id: &Uuid,
    ) -> Result<Vec<NpcWithLocations>, DbError> {
        let rows = db
            .query(include_str!("sql/by_campaign_with_locations.sql"), &[campaign_id])
            .await?;
        let mut npcs: Vec<NpcWithLocations> = Vec::new();
        for row in rows {
            let npc: Npc = row.get(0);
            let location: Option<Location> = row.get(1);
            match npcs.last_mut() {
                Some(last) if last.npc.id == npc.id => {
                    if let Some(location) = location {
                        last.locations.push(location);
                    }
                }
                _ => npcs.push(NpcWithLocations {
                    npc,
                    locations: location.into_iter().collect(),
                }),
            }
        }
        Ok(npcs)
    }

    pub async fn locations<T: Querist>(db: &mut T, id: &Uuid) -> Result<Vec<Location>, DbError> {
        let rows = db.query(include_str!("sql/locations.sql"), &[id]).await?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    pub async fn edit<T: Querist>(
        db: &mut T,
        campaign_id: &Uuid,
        id: &Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Npc>, DbError> {
        let name = name.map(merge_blank);
        let result = db
            .query_one(include_str!("sql/edit.sql"), &[id, campaign_id, &name, &description])
            .await;
        inner_map(result, |row| row.get(0))
    }

    pub async fn delete<T: Querist>(db: &mut T, campaign_id: &Uuid, id: &Uuid) -> Result<u64, DbError> {
        db.execute(include_str!("sql/delete.sql"), &[id, campaign_id]).await
    }

    /// The insert goes through a select that pins the location to the
    /// same campaign, so a foreign location reads as missing.
    pub async fn connect_location<T: Querist>(
        db: &mut T,
        id: &Uuid,
        location_id: &Uuid,
        campaign_id: &Uuid,
    ) -> Result<(), AppError> {
        let result = db
            .execute(include_str!("sql/connect_location.sql"), &[id, location_id, campaign_id])
            .await;
        match result {
            Ok(0) => Err(AppError::NotFound("Location")),
            Ok(_) => Ok(()),
            // The submitted list repeated a location, that is fine.
            Err(e) if database::is_unique_violation(&e, "npc_locations_pkey") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn disconnect_locations<T: Querist>(db: &mut T, id: &Uuid) -> Result<u64, DbError> {
        db.execute(include_str!("sql/disconnect_locations.sql"), &[id]).await
    }
}
