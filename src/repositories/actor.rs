use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::{
    entities::{actor, movie_actor},
    error::{AppError, AppResult},
    models::{ActorPayload, ActorRecord, ActorUpdate},
};

#[derive(Clone)]
pub struct ActorRepository {
    db: DatabaseConnection,
}

impl ActorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<ActorRecord>> {
        let rows = actor::Entity::find().order_by_asc(actor::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(ActorRecord::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ActorRecord> {
        self.find(id).await.map(ActorRecord::from)
    }

    pub async fn create(&self, payload: ActorPayload) -> AppResult<ActorRecord> {
        let model = actor::ActiveModel {
            name: Set(payload.name.trim().to_string()),
            photo: Set(clean_photo(payload.photo)),
            ..Default::default()
        };
        let created = model.insert(&self.db).await?;
        tracing::debug!(id = created.id, name = %created.name, "actor created");
        Ok(created.into())
    }

    pub async fn update(&self, id: i32, changes: ActorUpdate) -> AppResult<ActorRecord> {
        let current = self.find(id).await?;
        let mut model = current.clone().into_active_model();
        if let Some(name) = changes.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(photo) = changes.photo {
            model.photo = Set(clean_photo(Some(photo)));
        }
        if !model.is_changed() {
            return Ok(current.into());
        }
        Ok(model.update(&self.db).await?.into())
    }

    /// Removes the actor together with its movie credits.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        if actor::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound("Actor"));
        }

        let credits = movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::ActorId.eq(id))
            .exec(&txn)
            .await?;
        actor::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::debug!(id, credits = credits.rows_affected, "actor deleted");
        Ok(())
    }

    async fn find(&self, id: i32) -> AppResult<actor::Model> {
        actor::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound("Actor"))
    }
}

fn clean_photo(photo: Option<String>) -> Option<String> {
    photo.map(|p| p.trim().to_string()).filter(|p| !p.is_empty())
}

impl From<actor::Model> for ActorRecord {
    fn from(m: actor::Model) -> Self {
        Self { id: m.id, name: m.name, photo: m.photo }
    }
}
