use async_trait::async_trait;
use mongodb::{bson::doc, error::ErrorKind, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, PROFILES_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::Profile,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: Profile) -> AppResult<Profile>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Profile>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Profile>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoProfileRepository {
    collection: Collection<Profile>,
}

impl MongoProfileRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(PROFILES_COLLECTION);
        Self { collection }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(mongodb::error::WriteFailure::WriteError(write_error)) => {
            write_error.code == 11000
        }
        _ => false,
    }
}

#[async_trait]
impl ProfileRepository for MongoProfileRepository {
    async fn create(&self, profile: Profile) -> AppResult<Profile> {
        match self.collection.insert_one(&profile).await {
            Ok(_) => Ok(profile),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(format!(
                "Profile with email '{}' already exists",
                profile.email
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Profile>> {
        let profile = self.collection.find_one(doc! { "id": id }).await?;
        Ok(profile)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Profile>> {
        let profile = self
            .collection
            .find_one(doc! { "email": email.trim().to_lowercase() })
            .await?;
        Ok(profile)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for profiles collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(email_index).await?;

        log::info!("Successfully created indexes for profiles collection");
        Ok(())
    }
}
