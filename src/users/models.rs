use chrono::naive::NaiveDateTime;
use postgres_types::FromSql;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{self, Querist};
use crate::error::{AppError, DbError};
use crate::utils::inner_map;

#[derive(Debug, Serialize, Deserialize, FromSql, Clone, Copy, PartialEq, Eq)]
#[postgres(name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[postgres(name = "standard")]
    Standard,
    #[postgres(name = "admin")]
    Admin,
}

#[derive(Debug, Serialize, FromSql, Clone)]
#[serde(rename_all = "camelCase")]
#[postgres(name = "users")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(skip)]
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub role: Role,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
}

fn hash_password(password: &str) -> Result<String, AppError> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| unexpected!(e))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    use argon2::password_hash::Error::Password;
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed = PasswordHash::new(hash).map_err(|e| unexpected!(e))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(Password) => Ok(false),
        Err(e) => Err(unexpected!(e)),
    }
}

impl User {
    pub async fn all<T: Querist>(db: &mut T) -> Result<Vec<User>, DbError> {
        let rows = db.query(include_str!("sql/all.sql"), &[]).await?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    pub async fn register<T: Querist>(db: &mut T, name: &str, email: &str, password: &str) -> Result<User, AppError> {
        let name = name.trim();
        let email = email.to_ascii_lowercase();
        let password = hash_password(password)?;
        let result = db
            .query_exactly_one(include_str!("sql/create.sql"), &[&name, &email, &password])
            .await;
        match result {
            Ok(row) => Ok(row.get(0)),
            Err(e) if database::is_unique_violation(&e, "users_email_key") => Err(AppError::AlreadyExists("User")),
            Err(e) => Err(e.into()),
        }
    }

    async fn get<T: Querist>(db: &mut T, email: Option<&str>, name: Option<&str>) -> Result<Option<User>, DbError> {
        use postgres_types::Type;

        let email = email.map(|s| s.to_ascii_lowercase());
        let result = db
            .query_one_typed(
                include_str!("sql/get.sql"),
                &[Type::TEXT, Type::TEXT],
                &[&email, &name],
            )
            .await;
        inner_map(result, |row| row.get(0))
    }

    pub async fn get_by_email<T: Querist>(db: &mut T, email: &str) -> Result<Option<User>, DbError> {
        User::get(db, Some(email), None).await
    }

    pub async fn get_by_name<T: Querist>(db: &mut T, name: &str) -> Result<Option<User>, DbError> {
        User::get(db, None, Some(name)).await
    }

    /// A missing account and a bad password are different failures, the
    /// first is a 404 and the second a 401.
    pub async fn login<T: Querist>(
        db: &mut T,
        name: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<User, AppError> {
        let user = match (email, name) {
            (Some(email), _) => User::get_by_email(db, email).await?,
            (None, Some(name)) => User::get_by_name(db, name).await?,
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Either a name or an e-mail address is required".to_string(),
                ))
            }
        };
        let user = user.ok_or(AppError::NotFound("User"))?;
        if verify_password(password, &user.password)? {
            Ok(user)
        } else {
            Err(AppError::Unauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hashing() {
        let hash = hash_password("MadokaMadokaSuHaSuHa").unwrap();
        assert_ne!(hash, "MadokaMadokaSuHaSuHa");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("MadokaMadokaSuHaSuHa", &hash).unwrap());
        assert!(!verify_password("KyubeyIsInnocent", &hash).unwrap());
    }

    #[test]
    fn same_password_different_salt() {
        let first = hash_password("open sesame").unwrap();
        let second = hash_password("open sesame").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn password_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "humura".to_string(),
            email: "humura@example.net".to_string(),
            password: "$argon2id$not-a-real-hash".to_string(),
            role: Role::Standard,
            created: chrono::Utc::now().naive_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("email"));
        assert!(json.contains("humura"));
    }
}
