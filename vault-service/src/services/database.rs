//! MongoDB-backed identity and hierarchy stores.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Bson, DateTime as BsonDateTime},
    error::{ErrorKind, WriteFailure},
    options::{
        FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument, UpdateOptions,
    },
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

use super::hierarchy::{ensure_distinct_divisions, OrgStore};
use super::identity::IdentityStore;
use super::ServiceError;
use crate::models::{Credential, Division, DivisionRef, OrgUnit, Role, User};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for vault-service");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.users()
            .create_index(email_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create email index on users collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on users.email");

        // Multikey unique index: a division id may exist in only one unit.
        let division_index = IndexModel::builder()
            .keys(doc! { "divisions.id": 1 })
            .options(
                IndexOptions::builder()
                    .name("division_id_unique".to_string())
                    .unique(true)
                    .sparse(true)
                    .build(),
            )
            .build();

        self.org_units()
            .create_index(division_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create division index on org_units collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on org_units.divisions.id");

        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn org_units(&self) -> Collection<OrgUnit> {
        self.db.collection("org_units")
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

fn after_update() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

#[async_trait]
impl IdentityStore for MongoDb {
    async fn insert_user(&self, user: &User) -> Result<(), ServiceError> {
        match self.users().insert_one(user, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(ServiceError::EmailAlreadyRegistered),
            Err(e) => {
                tracing::error!(error = %e, "Database error inserting user");
                Err(e.into())
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users().find_one(doc! { "_id": user_id }, None).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        let options = FindOptions::builder().sort(doc! { "created_at": 1 }).build();
        let cursor = self.users().find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_role(&self, user_id: &str, role: Role) -> Result<Option<User>, ServiceError> {
        let updated = self
            .users()
            .find_one_and_update(
                doc! { "_id": user_id },
                doc! { "$set": { "role": role.as_str(), "updated_at": BsonDateTime::now() } },
                after_update(),
            )
            .await?;
        Ok(updated)
    }

    async fn set_assignment(
        &self,
        user_id: &str,
        assignment: Option<&DivisionRef>,
    ) -> Result<Option<User>, ServiceError> {
        let (org_unit_id, division_id) = match assignment {
            Some(a) => (
                Bson::String(a.org_unit_id.clone()),
                Bson::String(a.division_id.clone()),
            ),
            None => (Bson::Null, Bson::Null),
        };

        let updated = self
            .users()
            .find_one_and_update(
                doc! { "_id": user_id },
                doc! {
                    "$set": {
                        "org_unit_id": org_unit_id,
                        "division_id": division_id,
                        "updated_at": BsonDateTime::now(),
                    }
                },
                after_update(),
            )
            .await?;
        Ok(updated)
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                ServiceError::from(e)
            })?;
        Ok(())
    }
}

#[async_trait]
impl OrgStore for MongoDb {
    async fn insert_unit(&self, unit: &OrgUnit) -> Result<(), ServiceError> {
        ensure_distinct_divisions(unit)?;

        match self.org_units().insert_one(unit, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(ServiceError::Conflict(format!(
                "Unit '{}' or one of its division ids already exists",
                unit.id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn count_units(&self) -> Result<u64, ServiceError> {
        Ok(self.org_units().count_documents(None, None).await?)
    }

    async fn list_units(&self) -> Result<Vec<OrgUnit>, ServiceError> {
        let options = FindOptions::builder()
            .projection(doc! { "divisions.credentials": 0 })
            .sort(doc! { "name": 1 })
            .build();
        let cursor = self.org_units().find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_unit(&self, unit_id: &str) -> Result<Option<OrgUnit>, ServiceError> {
        Ok(self.org_units().find_one(doc! { "_id": unit_id }, None).await?)
    }

    async fn find_unit_by_division(
        &self,
        division_id: &str,
    ) -> Result<Option<OrgUnit>, ServiceError> {
        Ok(self
            .org_units()
            .find_one(doc! { "divisions.id": division_id }, None)
            .await?)
    }

    async fn push_credential(
        &self,
        unit_id: &str,
        division_id: &str,
        credential: &Credential,
    ) -> Result<Option<Division>, ServiceError> {
        let credential = to_bson(credential)
            .map_err(|e| anyhow::anyhow!("Failed to encode credential: {}", e))?;

        // Positional push runs server-side, so concurrent appends do not overwrite each other.
        let updated = self
            .org_units()
            .find_one_and_update(
                doc! { "_id": unit_id, "divisions.id": division_id },
                doc! { "$push": { "divisions.$.credentials": credential } },
                after_update(),
            )
            .await?;

        Ok(updated.and_then(|mut unit| {
            let index = unit.divisions.iter().position(|d| d.id == division_id)?;
            Some(unit.divisions.swap_remove(index))
        }))
    }

    async fn replace_credential(
        &self,
        unit_id: &str,
        division_id: &str,
        credential: &Credential,
    ) -> Result<bool, ServiceError> {
        let encoded = to_bson(credential)
            .map_err(|e| anyhow::anyhow!("Failed to encode credential: {}", e))?;

        let options = UpdateOptions::builder()
            .array_filters(vec![
                doc! { "d.id": division_id },
                doc! { "c.id": credential.id.as_str() },
            ])
            .build();

        let result = self
            .org_units()
            .update_one(
                doc! {
                    "_id": unit_id,
                    "divisions": {
                        "$elemMatch": { "id": division_id, "credentials.id": credential.id.as_str() }
                    }
                },
                doc! { "$set": { "divisions.$[d].credentials.$[c]": encoded } },
                options,
            )
            .await?;

        Ok(result.matched_count > 0)
    }
}
