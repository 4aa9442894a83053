use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Module {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    order_index: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ModuleCreate {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: Option<i32>,
}

#[derive(Debug, Default)]
pub struct ModuleUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

impl ResourceTyped for Module {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Module
    }
}

impl Module {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

#[async_trait]
impl CrudRepository<Module, ModuleCreate, ModuleUpdate, Uuid> for Module {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleCreate,
    ) -> DatabaseResult<Self> {
        // appended after the last module unless an explicit position is given
        let module = sqlx::query_as(
            r#"
            INSERT INTO modules (id, course_id, title, description, order_index)
            VALUES ($1, $2, $3, $4, COALESCE($5,
                (SELECT COALESCE(MAX(order_index), 0) + 1 FROM modules WHERE course_id = $2)))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order_index)
        .fetch_one(mm.executor())
        .await?;

        Ok(module)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleUpdate,
    ) -> DatabaseResult<Self> {
        let module = sqlx::query_as(
            r#"
            UPDATE modules SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                order_index = COALESCE($3, order_index)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order_index)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(module)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM modules WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM modules WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Module {
    pub async fn find_by_title(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
        title: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM modules WHERE course_id = $1 AND title = $2")
            .bind(course_id)
            .bind(title)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Module {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner = sqlx::query_scalar("SELECT instructor_id FROM courses WHERE id = $1")
            .bind(self.course_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(owner)
    }
}

// Utils

/// Module outline shown on the course page.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ModuleSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    module: Module,
    lessons_count: i64,
    total_duration: i64,
}

impl ModuleSummary {
    pub async fn all_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                m.*,
                COUNT(l.id) AS lessons_count,
                COALESCE(SUM(l.duration), 0)::BIGINT AS total_duration
            FROM modules m
            LEFT JOIN lessons l ON l.module_id = m.id
            WHERE m.course_id = $1
            GROUP BY m.id
            ORDER BY m.order_index, m.created_at
            "#,
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn lessons_count(&self) -> i64 {
        self.lessons_count
    }

    pub fn total_duration(&self) -> i64 {
        self.total_duration
    }
}
