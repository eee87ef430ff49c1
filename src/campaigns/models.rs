use chrono::naive::NaiveDateTime;
use futures::FutureExt;
use postgres_types::FromSql;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::code;
use crate::authority;
use crate::database::{self, Querist};
use crate::error::{AppError, DbError};
use crate::session::Session;
use crate::users::User;
use crate::utils::{inner_map, merge_blank};

#[derive(Debug, Serialize, Deserialize, FromSql, Clone)]
#[serde(rename_all = "camelCase")]
#[postgres(name = "campaigns")]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    /// Anyone holding the code may join, so it stays off the wire.
    /// Owners receive it from the create and join-code routes.
    #[serde(skip)]
    pub join_code: String,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
    #[serde(with = "crate::date_format")]
    pub modified: NaiveDateTime,
}

impl Campaign {
    pub async fn create<T: Querist>(
        db: &mut T,
        name: &str,
        description: &str,
        owner_id: &Uuid,
    ) -> Result<Campaign, AppError> {
        // The attempt future may only borrow the connection, so the
        // closure owns its copies of the fields.
        let name = merge_blank(name);
        let description = description.to_string();
        let owner_id = *owner_id;
        code::allocate(db, move |db, join_code| {
            let name = name.clone();
            let description = description.clone();
            async move {
                let result = db
                    .query_exactly_one(
                        include_str!("sql/create.sql"),
                        &[&name, &description, &owner_id, &join_code],
                    )
                    .await;
                match result {
                    Ok(row) => Ok(Some(row.get(0))),
                    Err(e) if database::is_unique_violation(&e, "campaigns_join_code_key") => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
            .boxed()
        })
        .await
    }

    pub async fn all<T: Querist>(db: &mut T, owner_id: Option<&Uuid>) -> Result<Vec<Campaign>, DbError> {
        use postgres_types::Type;

        let rows = db
            .query_typed(include_str!("sql/all.sql"), &[Type::UUID], &[&owner_id])
            .await?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    pub async fn get_by_id<T: Querist>(db: &mut T, id: &Uuid) -> Result<Option<Campaign>, DbError> {
        let result = db.query_one(include_str!("sql/get.sql"), &[id]).await;
        inner_map(result, |row| row.get(0))
    }

    pub async fn get_by_code<T: Querist>(db: &mut T, code: &str) -> Result<Option<Campaign>, DbError> {
        let result = db.query_one(include_str!("sql/get_by_code.sql"), &[&code]).await;
        inner_map(result, |row| row.get(0))
    }

    /// Fetches a campaign that must exist for the request to make sense.
    pub async fn require<T: Querist>(db: &mut T, id: &Uuid) -> Result<Campaign, AppError> {
        Campaign::get_by_id(db, id).await?.ok_or(AppError::NotFound("Campaign"))
    }

    /// Fetches a campaign once the session may mutate it and its children.
    pub async fn owned<T: Querist>(db: &mut T, session: &Session, id: &Uuid) -> Result<Campaign, AppError> {
        let campaign = Campaign::get_by_id(db, id).await?;
        authority::own(session, campaign, |c| &c.owner_id, "Campaign")
    }

    pub async fn edit<T: Querist>(
        db: &mut T,
        id: &Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Campaign>, DbError> {
        let name = name.map(merge_blank);
        let result = db
            .query_one(include_str!("sql/edit.sql"), &[id, &name, &description])
            .await;
        inner_map(result, |row| row.get(0))
    }

    pub async fn delete<T: Querist>(db: &mut T, id: &Uuid) -> Result<u64, DbError> {
        db.execute(include_str!("sql/delete.sql"), &[id]).await
    }

    /// The owner never appears as a contributor row, ownership lives on
    /// the campaign itself.
    pub fn ensure_not_owner(&self, user_id: &Uuid) -> Result<(), AppError> {
        if self.owner_id == *user_id {
            Err(AppError::BadRequest("You already own this campaign".to_string()))
        } else {
            Ok(())
        }
    }

    /// Replaces the join code, invalidating the old one.
    pub async fn regenerate_code<T: Querist>(db: &mut T, id: &Uuid) -> Result<String, AppError> {
        let id = *id;
        code::allocate(db, move |db, join_code| {
            async move {
                let result = db
                    .query_one(include_str!("sql/set_code.sql"), &[&id, &join_code])
                    .await;
                match result {
                    Ok(Some(row)) => Ok(Some(row.get(0))),
                    Ok(None) => Err(AppError::NotFound("Campaign")),
                    Err(e) if database::is_unique_violation(&e, "campaigns_join_code_key") => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
            .boxed()
        })
        .await
    }
}

#[derive(Debug, Serialize, Deserialize, FromSql, Clone)]
#[serde(rename_all = "camelCase")]
#[postgres(name = "contributors")]
pub struct Contributor {
    pub user_id: Uuid,
    pub campaign_id: Uuid,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
}

impl Contributor {
    pub async fn add<T: Querist>(db: &mut T, user_id: &Uuid, campaign_id: &Uuid) -> Result<Contributor, AppError> {
        let result = db
            .query_exactly_one(include_str!("sql/add_contributor.sql"), &[user_id, campaign_id])
            .await;
        match result {
            Ok(row) => Ok(row.get(0)),
            Err(e) if database::is_unique_violation(&e, "contributors_pkey") => {
                Err(AppError::AlreadyExists("Contributor"))
            }
            Err(e) => match database::violated_foreign_key(&e) {
                Some("contributors_user_id_fkey") => Err(AppError::NotFound("User")),
                Some("contributors_campaign_id_fkey") => Err(AppError::NotFound("Campaign")),
                _ => Err(e.into()),
            },
        }
    }

    pub async fn remove<T: Querist>(db: &mut T, user_id: &Uuid, campaign_id: &Uuid) -> Result<u64, DbError> {
        db.execute(include_str!("sql/remove_contributor.sql"), &[user_id, campaign_id])
            .await
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContributorWithUser {
    pub contributor: Contributor,
    pub user: User,
}

impl ContributorWithUser {
    pub async fn get_by_campaign<T: Querist>(db: &mut T, campaign_id: &Uuid) -> Result<Vec<ContributorWithUser>, DbError> {
        let rows = db.query(include_str!("sql/contributors.sql"), &[campaign_id]).await?;
        Ok(rows
            .into_iter()
            .map(|row| ContributorWithUser {
                contributor: row.get(0),
                user: row.get(1),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_code_is_never_serialized() {
        let now = chrono::Utc::now().naive_utc();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            name: "Lost Mine of Phandelver".to_string(),
            description: String::new(),
            owner_id: Uuid::new_v4(),
            join_code: "a1-b2_c3D4".to_string(),
            created: now,
            modified: now,
        };
        let json = serde_json::to_string(&campaign).unwrap();
        assert!(!json.contains("joinCode"));
        assert!(!json.contains("a1-b2_c3D4"));
        assert!(json.contains("Lost Mine of Phandelver"));
    }

    #[test]
    fn the_owner_is_never_a_contributor() {
        let now = chrono::Utc::now().naive_utc();
        let owner_id = Uuid::new_v4();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            name: "Curse of Strahd".to_string(),
            description: String::new(),
            owner_id,
            join_code: "a1-b2_c3D4".to_string(),
            created: now,
            modified: now,
        };
        let err = campaign.ensure_not_owner(&owner_id).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(campaign.ensure_not_owner(&Uuid::new_v4()).is_ok());
    }
}
