use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::{ListableRepository, ResourceTyped};
use crate::web::AuthenticatedUser;
use crate::web::UserRole;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserEntity {
    id: Uuid,
    name: String,
    email: String,
    #[serde(skip)]
    password_hash: Option<String>,
    role: String,
    avatar: Option<String>,
    #[serde(skip)]
    google_id: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct UserEntityCreate {
    pub name: String,
    pub email: String,
    /// `None` for accounts that only sign in through OAuth.
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub google_id: Option<String>,
}

#[derive(Debug)]
pub struct UserEntityUpdate {
    pub name: String,
}

#[derive(Debug, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::repo::ResourceType {
        crate::model::repo::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn role(&self) -> UserRole {
        UserRole::from(self.role.as_str())
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn google_id(&self) -> Option<&str> {
        self.google_id.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

#[async_trait::async_trait]
impl CrudRepository<UserEntity, UserEntityCreate, UserEntityUpdate, Uuid> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreate,
    ) -> DatabaseResult<Self> {
        let user = sqlx::query_as(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, avatar, google_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role.to_string())
        .bind(&data.avatar)
        .bind(&data.google_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(user)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityUpdate,
    ) -> DatabaseResult<Self> {
        let user = sqlx::query_as(
            "UPDATE users SET name = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(&data.name)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(user)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait::async_trait]
impl ListableRepository<UserEntity, UserFilter> for UserEntity {
    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.role.as_ref().map(UserRole::to_string))
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        filter: &UserFilter,
    ) -> DatabaseResult<i64> {
        let result: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR role = $1)")
                .bind(filter.role.as_ref().map(UserRole::to_string))
                .fetch_one(mm.executor())
                .await?;

        Ok(result)
    }
}

impl_paginatable_for!(UserEntity, UserFilter);

#[async_trait]
impl HasOwner for UserEntity {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.id) // owners of users are themselves
    }
}

impl UserEntity {
    pub async fn find_by_email(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    /// Account matching a Google identity, by `google_id` first and by email second.
    pub async fn find_by_google(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        google_id: &str,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE google_id = $1 OR email = $2
            ORDER BY (google_id = $1) DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(google_id)
        .bind(email)
        .fetch_optional(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn link_google_id(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        google_id: &str,
    ) -> DatabaseResult<Self> {
        let user = sqlx::query_as(
            "UPDATE users SET google_id = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(google_id)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(user)
    }

    pub async fn set_role(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        role: UserRole,
    ) -> DatabaseResult<Self> {
        let user = sqlx::query_as(
            "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(role.to_string())
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(user)
    }
}
