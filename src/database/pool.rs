use async_trait::async_trait;

use crate::database::{postgres_url, Client};
use crate::pool::{Factory, Pool};

const POOL_SIZE: usize = 10;

pub type DbPool = Pool<Client, PostgresFactory>;

pub struct PostgresFactory {
    config: tokio_postgres::Config,
}

impl PostgresFactory {
    pub fn new() -> PostgresFactory {
        let config = postgres_url()
            .parse()
            .expect("Failed to parse the Postgres connect URL");
        PostgresFactory { config }
    }
}

#[async_trait]
impl Factory for PostgresFactory {
    type Output = Client;

    async fn make(&self) -> Client {
        Client::with_config(&self.config)
            .await
            .expect("Failed to connect to Postgres")
    }
}

pub async fn init() -> DbPool {
    Pool::with_num(POOL_SIZE, PostgresFactory::new()).await
}
