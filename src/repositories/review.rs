use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    entities::{movie, review},
    error::{AppError, AppResult},
    models::{ReviewPayload, ReviewView},
    repositories::now_sec,
};

#[derive(Clone)]
pub struct ReviewRepository {
    db: DatabaseConnection,
}

impl ReviewRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_for_movie(&self, movie_id: i32) -> AppResult<Vec<ReviewView>> {
        let rows = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ReviewView::from).collect())
    }

    /// Appends a review. Reviews are never edited afterwards.
    pub async fn create(&self, payload: ReviewPayload, user_id: Option<i32>) -> AppResult<ReviewView> {
        if movie::Entity::find_by_id(payload.movie_id).one(&self.db).await?.is_none() {
            return Err(AppError::NotFound("Movie"));
        }

        let created = review::ActiveModel {
            movie_id: Set(payload.movie_id),
            user_id: Set(user_id),
            author: Set(payload.user.trim().to_string()),
            rating: Set(payload.rating),
            content: Set(payload.text.trim().to_string()),
            created_at: Set(now_sec()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::debug!(id = created.id, movie_id = created.movie_id, "review added");
        Ok(created.into())
    }

    /// Deletes a review written by `user_id`.
    pub async fn delete_owned(&self, id: i32, user_id: i32) -> AppResult<()> {
        let review = review::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Review"))?;

        if review.user_id != Some(user_id) {
            return Err(AppError::Forbidden("Only the author can delete this review".into()));
        }

        review::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

impl From<review::Model> for ReviewView {
    fn from(m: review::Model) -> Self {
        let date = jiff::Timestamp::from_second(m.created_at)
            .map(|ts| ts.to_zoned(jiff::tz::TimeZone::UTC).date().to_string())
            .unwrap_or_default();
        Self {
            id: m.id,
            movie_id: m.movie_id,
            author: m.author,
            rating: m.rating,
            content: m.content,
            date,
        }
    }
}
