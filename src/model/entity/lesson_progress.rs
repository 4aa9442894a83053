use crate::model::repo::ResourceTyped;
use crate::model::error::DatabaseResult;
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, prelude::FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    id: Uuid,
    student_id: Uuid,
    lesson_id: Uuid,
    completed: bool,
    watched_duration: i32,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct LessonProgressUpsert {
    pub lesson_id: Uuid,
    pub completed: bool,
    /// `None` records 0, also over an earlier value.
    pub watched_duration: Option<i32>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn watched_duration(&self) -> i32 {
        self.watched_duration
    }

    pub fn completed_at(&self) -> Option<&DateTime<Utc>> {
        self.completed_at.as_ref()
    }

    /// Records the actor's progress on a lesson, one row per student and lesson.
    /// Every call overwrites the whole row.
    pub async fn upsert(
        conn: &mut PgConnection,
        actor: &AuthenticatedUser,
        data: LessonProgressUpsert,
    ) -> DatabaseResult<Self> {
        let progress = sqlx::query_as(
            r#"
            INSERT INTO lesson_progress (id, student_id, lesson_id, completed, watched_duration, completed_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, 0), CASE WHEN $4 THEN NOW() ELSE NULL END)
            ON CONFLICT (student_id, lesson_id) DO UPDATE SET
                completed = EXCLUDED.completed,
                watched_duration = EXCLUDED.watched_duration,
                completed_at = EXCLUDED.completed_at,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(data.lesson_id)
        .bind(data.completed)
        .bind(data.watched_duration)
        .fetch_one(&mut *conn)
        .await?;

        Ok(progress)
    }
}
