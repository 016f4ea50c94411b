use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::{
    entities::{genre, movie_genre},
    error::{AppError, AppResult},
    models::{GenreRecord, NamePayload},
};

#[derive(Clone)]
pub struct GenreRepository {
    db: DatabaseConnection,
}

impl GenreRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<GenreRecord>> {
        let rows = genre::Entity::find().order_by_asc(genre::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(GenreRecord::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<GenreRecord> {
        self.find(id).await.map(GenreRecord::from)
    }

    pub async fn create(&self, payload: NamePayload) -> AppResult<GenreRecord> {
        let model =
            genre::ActiveModel { name: Set(payload.name.trim().to_string()), ..Default::default() };
        Ok(model.insert(&self.db).await?.into())
    }

    pub async fn update(&self, id: i32, payload: NamePayload) -> AppResult<GenreRecord> {
        let mut model = self.find(id).await?.into_active_model();
        model.name = Set(payload.name.trim().to_string());
        Ok(model.update(&self.db).await?.into())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        if genre::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound("Genre"));
        }

        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::GenreId.eq(id))
            .exec(&txn)
            .await?;
        genre::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn find(&self, id: i32) -> AppResult<genre::Model> {
        genre::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound("Genre"))
    }
}

impl From<genre::Model> for GenreRecord {
    fn from(m: genre::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}
