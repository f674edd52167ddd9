use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, ClientSession, Collection,
};
use std::time::Duration;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

pub const PROFILES_COLLECTION: &str = "profiles";
pub const QUIZZES_COLLECTION: &str = "quizzes";
pub const QUESTIONS_COLLECTION: &str = "questions";
pub const ATTEMPTS_COLLECTION: &str = "attempts";
pub const ANSWERS_COLLECTION: &str = "student_answers";

#[derive(Clone)]
pub struct Database {
    client: Client,
    db_name: String,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut client_options = ClientOptions::parse(&config.mongo_conn_string).await?;

        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);
        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(2);
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        let hello = client
            .database("admin")
            .run_command(doc! { "hello": 1 })
            .await?;
        if !supports_transactions(&hello) {
            log::error!("MongoDB at the configured address is a standalone server");
            return Err(AppError::InternalError(
                "MongoDB must run as a replica set or sharded cluster: publishing, deletion \
                 and submission use transactions"
                    .to_string(),
            ));
        }

        log::info!("Connected to MongoDB database '{}'", config.mongo_db_name);

        Ok(Self {
            client,
            db_name: config.mongo_db_name.clone(),
        })
    }

    pub fn get_collection<T>(&self, collection_name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.client
            .database(&self.db_name)
            .collection(collection_name)
    }

    /// Sessions back the multi-collection writes (publish, submission).
    /// Transactions need a replica set or sharded cluster.
    pub async fn start_session(&self) -> AppResult<ClientSession> {
        let session = self.client.start_session().await?;
        Ok(session)
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Replica set members report `setName`; mongos reports `msg: "isdbgrid"`.
fn supports_transactions(hello: &Document) -> bool {
    hello.contains_key("setName") || hello.get_str("msg").is_ok_and(|m| m == "isdbgrid")
}
