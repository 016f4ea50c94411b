use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::{
    entities::{country, movie_country},
    error::{AppError, AppResult},
    models::{CountryRecord, NamePayload},
};

/// Countries are identified to users by name, so names stay unique.
#[derive(Clone)]
pub struct CountryRepository {
    db: DatabaseConnection,
}

impl CountryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<CountryRecord>> {
        let rows = country::Entity::find().order_by_asc(country::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(CountryRecord::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CountryRecord> {
        self.find(id).await.map(CountryRecord::from)
    }

    pub async fn create(&self, payload: NamePayload) -> AppResult<CountryRecord> {
        let name = payload.name.trim().to_string();
        self.ensure_name_free(&name, None).await?;

        let created = country::ActiveModel { name: Set(name.clone()), ..Default::default() }
            .insert(&self.db)
            .await
            .map_err(|e| name_taken(e.into(), &name))?;
        tracing::debug!(id = created.id, name = %created.name, "country created");
        Ok(created.into())
    }

    /// Renames a country.
    pub async fn update(&self, id: i32, payload: NamePayload) -> AppResult<CountryRecord> {
        let current = self.find(id).await?;
        let name = payload.name.trim().to_string();
        if name == current.name {
            return Ok(current.into());
        }
        self.ensure_name_free(&name, Some(id)).await?;

        let mut model = current.into_active_model();
        model.name = Set(name.clone());
        let updated = model.update(&self.db).await.map_err(|e| name_taken(e.into(), &name))?;
        Ok(updated.into())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        if country::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound("Country"));
        }

        movie_country::Entity::delete_many()
            .filter(movie_country::Column::CountryId.eq(id))
            .exec(&txn)
            .await?;
        country::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn find(&self, id: i32) -> AppResult<country::Model> {
        country::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound("Country"))
    }

    async fn ensure_name_free(&self, name: &str, except: Option<i32>) -> AppResult<()> {
        let mut query = country::Entity::find().filter(country::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(country::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(conflict(name));
        }
        Ok(())
    }
}

fn conflict(name: &str) -> AppError {
    AppError::Conflict(format!("Country \"{name}\" already exists"))
}

/// The pre-check can lose a race with a concurrent writer; the unique index
/// still rejects the write.
fn name_taken(err: AppError, name: &str) -> AppError {
    match err {
        AppError::Conflict(_) => conflict(name),
        other => other,
    }
}

impl From<country::Model> for CountryRecord {
    fn from(m: country::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn named(name: &str) -> NamePayload {
        NamePayload { name: name.to_string() }
    }

    #[tokio::test]
    async fn create_then_list() {
        let repo = CountryRepository::new(db::memory().await);
        let france = repo.create(named(" France ")).await.unwrap();
        assert_eq!(france.name, "France");
        assert_eq!(repo.list().await.unwrap(), [france]);
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let repo = CountryRepository::new(db::memory().await);
        repo.create(named("Korea")).await.unwrap();
        let japan = repo.create(named("Japan")).await.unwrap();

        assert!(matches!(repo.create(named("Korea")).await, Err(AppError::Conflict(_))));
        assert!(matches!(repo.update(japan.id, named("Korea")).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn unique_index_violation_maps_to_conflict() {
        let db = db::memory().await;
        let repo = CountryRepository::new(db.clone());
        repo.create(named("France")).await.unwrap();

        // Straight to the table, past the name check.
        let err = country::ActiveModel { name: Set("France".into()), ..Default::default() }
            .insert(&db)
            .await
            .unwrap_err();
        assert!(matches!(name_taken(err.into(), "France"), AppError::Conflict(m) if m.contains("France")));
    }

    #[tokio::test]
    async fn rename_to_same_name_is_a_no_op() {
        let repo = CountryRepository::new(db::memory().await);
        let usa = repo.create(named("USA")).await.unwrap();
        assert_eq!(repo.update(usa.id, named("USA")).await.unwrap(), usa);

        let renamed = repo.update(usa.id, named("United States")).await.unwrap();
        assert_eq!(renamed.name, "United States");
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let repo = CountryRepository::new(db::memory().await);
        assert!(matches!(repo.delete(1).await, Err(AppError::NotFound("Country"))));
    }
}
