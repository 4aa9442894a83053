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
pub struct Lesson {
    id: Uuid,
    module_id: Uuid,
    title: String,
    content: String,
    video_url: Option<String>,
    /// Length in seconds.
    duration: i32,
    order_index: i32,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn duration(&self) -> i32 {
        self.duration
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

#[derive(Debug)]
pub struct LessonCreate {
    pub module_id: Uuid,
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub duration: i32,
    pub order_index: Option<i32>,
}

#[derive(Debug, Default)]
pub struct LessonUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub order_index: Option<i32>,
}

#[async_trait]
impl CrudRepository<Lesson, LessonCreate, LessonUpdate, Uuid> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let lesson = sqlx::query_as(
            r#"
            INSERT INTO lessons (id, module_id, title, content, video_url, duration, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7,
                (SELECT COALESCE(MAX(order_index), 0) + 1 FROM lessons WHERE module_id = $2)))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.module_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.video_url)
        .bind(data.duration)
        .bind(data.order_index)
        .fetch_one(mm.executor())
        .await?;

        Ok(lesson)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonUpdate,
    ) -> DatabaseResult<Self> {
        let lesson = sqlx::query_as(
            r#"
            UPDATE lessons SET
                title = COALESCE($1, title),
                content = COALESCE($2, content),
                video_url = COALESCE($3, video_url),
                duration = COALESCE($4, duration),
                order_index = COALESCE($5, order_index)
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.video_url)
        .bind(data.duration)
        .bind(data.order_index)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(lesson)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lessons WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Lesson {
    /// Course of `lesson_id` if the actor is enrolled in it, `None` when the lesson
    /// doesn't exist or belongs to a course the actor isn't enrolled in.
    pub async fn enrolled_course_id(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Uuid>> {
        let course_id = sqlx::query_scalar(
            r#"
            SELECT m.course_id
            FROM lessons l
            JOIN modules m ON m.id = l.module_id
            JOIN enrollments e ON e.course_id = m.course_id
            WHERE l.id = $1 AND e.student_id = $2
            "#,
        )
        .bind(lesson_id)
        .bind(actor.user_id())
        .fetch_optional(mm.executor())
        .await?;

        Ok(course_id)
    }
}

#[async_trait]
impl HasOwner for Lesson {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner = sqlx::query_scalar(
            r#"
            SELECT c.instructor_id
            FROM modules m JOIN courses c ON c.id = m.course_id
            WHERE m.id = $1
            "#,
        )
        .bind(self.module_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(owner)
    }
}
