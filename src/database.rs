use std::collections::HashMap;
use std::env;
use std::hash::BuildHasher;

use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{NoTls, Row, Statement};

use crate::error::DbError;

pub mod pool;

pub fn postgres_url() -> String {
    env::var("DATABASE_URL").expect("Failed to load the Postgres connect URL")
}

/// Did the statement trip the named unique constraint?
pub fn is_unique_violation(error: &DbError, constraint: &str) -> bool {
    match error.as_db_error() {
        Some(e) if e.code() == &SqlState::UNIQUE_VIOLATION => e.constraint() == Some(constraint),
        _ => false,
    }
}

/// The name of the violated foreign key constraint, if that is what failed.
pub fn violated_foreign_key(error: &DbError) -> Option<&str> {
    let e = error.as_db_error()?;
    if e.code() == &SqlState::FOREIGN_KEY_VIOLATION {
        e.constraint()
    } else {
        None
    }
}

struct CrcBuilder;

impl BuildHasher for CrcBuilder {
    type Hasher = crc32fast::Hasher;

    fn build_hasher(&self) -> crc32fast::Hasher {
        crc32fast::Hasher::new()
    }
}

pub struct Client {
    client: tokio_postgres::Client,
    // Statements are keyed by their source text, which is always a
    // `include_str!` literal with a stable address.
    prepared: HashMap<&'static str, Statement, CrcBuilder>,
}

impl Client {
    pub async fn with_config(config: &tokio_postgres::Config) -> Result<Client, DbError> {
        let (client, connection) = config.connect(NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("Postgres connection error: {}", e);
            }
        });
        let prepared = HashMap::with_capacity_and_hasher(32, CrcBuilder);
        Ok(Client { client, prepared })
    }

    async fn prepare(&mut self, source: &'static str, types: &[Type]) -> Result<Statement, DbError> {
        if let Some(statement) = self.prepared.get(source) {
            return Ok(statement.clone());
        }
        let statement = self.client.prepare_typed(source, types).await?;
        self.prepared.insert(source, statement.clone());
        Ok(statement)
    }
}

#[async_trait]
pub trait Querist: Send {
    async fn query_typed(
        &mut self,
        source: &'static str,
        types: &[Type],
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, DbError>;

    /// Expects exactly one row, anything else is a database error.
    async fn query_exactly_one_typed(
        &mut self,
        source: &'static str,
        types: &[Type],
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row, DbError>;

    async fn execute_typed(
        &mut self,
        source: &'static str,
        types: &[Type],
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, DbError>;

    async fn query(&mut self, source: &'static str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>, DbError> {
        self.query_typed(source, &[], params).await
    }

    async fn query_one(
        &mut self,
        source: &'static str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, DbError> {
        Ok(self.query(source, params).await?.into_iter().next())
    }

    async fn query_one_typed(
        &mut self,
        source: &'static str,
        types: &[Type],
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, DbError> {
        Ok(self.query_typed(source, types, params).await?.into_iter().next())
    }

    async fn query_exactly_one(
        &mut self,
        source: &'static str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row, DbError> {
        self.query_exactly_one_typed(source, &[], params).await
    }

    async fn execute(&mut self, source: &'static str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, DbError> {
        self.execute_typed(source, &[], params).await
    }
}

#[async_trait]
impl Querist for Client {
    async fn query_typed(
        &mut self,
        source: &'static str,
        types: &[Type],
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, DbError> {
        let statement = self.prepare(source, types).await?;
        self.client.query(&statement, params).await
    }

    async fn query_exactly_one_typed(
        &mut self,
        source: &'static str,
        types: &[Type],
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row, DbError> {
        let statement = self.prepare(source, types).await?;
        self.client.query_one(&statement, params).await
    }

    async fn execute_typed(
        &mut self,
        source: &'static str,
        types: &[Type],
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, DbError> {
        let statement = self.prepare(source, types).await?;
        self.client.execute(&statement, params).await
    }
}
