use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

use crate::{
    entities::{session, user},
    error::{AppError, AppResult},
    models::SessionUser,
    repositories::now_sec,
};

/// Accounts and their login sessions.
#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<user::Model> {
        let email = normalize_email(email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let created = user::ActiveModel {
            name: Set(name.trim().to_string()),
            email: Set(email),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(now_sec()),
            last_login: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("User already exists".into()),
            other => other,
        })?;
        tracing::info!(user_id = created.id, "account created");
        Ok(created)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<user::Model> {
        user::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound("User"))
    }

    pub async fn touch_last_login(&self, user: user::Model) -> AppResult<user::Model> {
        let mut model = user.into_active_model();
        model.last_login = Set(Some(now_sec()));
        Ok(model.update(&self.db).await?)
    }

    /// Opens a session for `user_id` and returns its token. Expired sessions
    /// of every user are swept first.
    pub async fn create_session(&self, user_id: i32, ttl_seconds: i64) -> AppResult<String> {
        let now = now_sec();
        let swept = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;
        if swept.rows_affected > 0 {
            tracing::debug!(count = swept.rows_affected, "expired sessions removed");
        }

        let token = format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple());

        session::ActiveModel {
            token: Set(token.clone()),
            user_id: Set(user_id),
            expires_at: Set(now + ttl_seconds),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(token)
    }

    /// Resolves a session token to its user. Expired sessions are purged.
    pub async fn find_session_user(&self, token: &str) -> AppResult<Option<user::Model>> {
        let Some(session) =
            session::Entity::find().filter(session::Column::Token.eq(token)).one(&self.db).await?
        else {
            return Ok(None);
        };

        if session.expires_at <= now_sec() {
            session::Entity::delete_by_id(session.id).exec(&self.db).await?;
            return Ok(None);
        }

        Ok(user::Entity::find_by_id(session.user_id).one(&self.db).await?)
    }

    pub async fn delete_session(&self, token: &str) -> AppResult<()> {
        session::Entity::delete_many()
            .filter(session::Column::Token.eq(token))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl From<user::Model> for SessionUser {
    fn from(m: user::Model) -> Self {
        Self { id: m.id, name: m.name, email: m.email }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn emails_are_unique_case_insensitively() {
        let repo = UserRepository::new(db::memory().await);
        repo.create("Ana", "Ana@Example.com", "hash").await.unwrap();
        assert!(matches!(
            repo.create("Ana again", "ana@example.com ", "hash").await,
            Err(AppError::Conflict(_))
        ));
        assert!(repo.find_by_email("ANA@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sessions_resolve_until_expiry() {
        let repo = UserRepository::new(db::memory().await);
        let user = repo.create("Ana", "ana@example.com", "hash").await.unwrap();

        let live = repo.create_session(user.id, 3600).await.unwrap();
        assert_eq!(repo.find_session_user(&live).await.unwrap().map(|u| u.id), Some(user.id));

        let stale = repo.create_session(user.id, -1).await.unwrap();
        assert!(repo.find_session_user(&stale).await.unwrap().is_none());

        repo.delete_session(&live).await.unwrap();
        assert!(repo.find_session_user(&live).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn new_sessions_sweep_expired_ones() {
        let repo = UserRepository::new(db::memory().await);
        let ana = repo.create("Ana", "ana@example.com", "hash").await.unwrap();
        let joon = repo.create("Joon", "joon@example.com", "hash").await.unwrap();

        repo.create_session(ana.id, -1).await.unwrap();
        repo.create_session(ana.id, -1).await.unwrap();
        let live = repo.create_session(joon.id, 3600).await.unwrap();

        let rows = session::Entity::find().all(&repo.db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].token, live);
    }
}
