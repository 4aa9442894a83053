use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::progress::{completion_ratio, progress_percentage};
use crate::model::repo::{ListableRepository, ResourceTyped};
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, prelude::FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Enrollment {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    enrolled_at: DateTime<Utc>,
    /// Unrounded completion percentage.
    progress: f64,
    completed_at: Option<DateTime<Utc>>,
}

impl ResourceTyped for Enrollment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Enrollment
    }
}

impl Enrollment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn completed_at(&self) -> Option<&DateTime<Utc>> {
        self.completed_at.as_ref()
    }

    pub async fn enroll(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        let enrollment = sqlx::query_as(
            r#"
            INSERT INTO enrollments (id, student_id, course_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(enrollment)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM enrollments WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_student_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM enrollments WHERE student_id = $1 AND course_id = $2")
                .bind(student_id)
                .bind(course_id)
                .fetch_optional(mm.executor())
                .await?;
        Ok(result)
    }

    pub async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    /// Recomputes the stored progress from the student's completed lessons.
    /// `completed_at` is stamped once the course reaches 100% and cleared below it.
    #[tracing::instrument(skip(conn))]
    pub async fn recalculate_progress(
        conn: &mut PgConnection,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<f64> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(l.id) AS total,
                COUNT(lp.id) FILTER (WHERE lp.completed) AS completed
            FROM lessons l
            JOIN modules m ON m.id = l.module_id
            LEFT JOIN lesson_progress lp
                ON lp.lesson_id = l.id AND lp.student_id = $1
            WHERE m.course_id = $2
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&mut *conn)
        .await?;

        let progress = completion_ratio(completed, total);

        sqlx::query(
            r#"
            UPDATE enrollments SET
                progress = $1,
                completed_at = CASE WHEN $1 >= 100 THEN COALESCE(completed_at, NOW()) ELSE NULL END
            WHERE student_id = $2 AND course_id = $3
            "#,
        )
        .bind(progress)
        .bind(student_id)
        .bind(course_id)
        .execute(&mut *conn)
        .await?;

        tracing::debug!(total, completed, progress, "enrollment progress updated");

        Ok(progress)
    }
}

#[async_trait]
impl HasOwner for Enrollment {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.student_id)
    }
}

/// Enrollment joined with course and student names, returned after enrolling.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct EnrollmentDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    enrollment: Enrollment,
    course_title: String,
    student_name: String,
}

impl EnrollmentDetail {
    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT e.*, c.title AS course_title, u.name AS student_name
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            JOIN users u ON u.id = e.student_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    pub fn enrollment(&self) -> &Enrollment {
        &self.enrollment
    }
}

#[derive(Debug, Default)]
pub struct EnrollmentFilter {
    pub student_id: Uuid,
}

/// Row of the "my courses" list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct EnrollmentSummary {
    pub id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub level: String,
    pub instructor_name: String,
    pub total_lessons: i64,
    pub completed_lessons: i64,
}

impl ResourceTyped for EnrollmentSummary {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Enrollment
    }
}

impl EnrollmentSummary {
    pub fn progress(&self) -> i32 {
        progress_percentage(self.completed_lessons, self.total_lessons)
    }
}

#[async_trait]
impl ListableRepository<EnrollmentSummary, EnrollmentFilter> for EnrollmentSummary {
    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        filter: &EnrollmentFilter,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT
                e.id, e.course_id, e.enrolled_at, e.completed_at,
                c.title, c.description, c.thumbnail, c.level,
                u.name AS instructor_name,
                (SELECT COUNT(l.id)
                   FROM lessons l JOIN modules m ON m.id = l.module_id
                  WHERE m.course_id = c.id) AS total_lessons,
                (SELECT COUNT(lp.id)
                   FROM lesson_progress lp
                   JOIN lessons l ON l.id = lp.lesson_id
                   JOIN modules m ON m.id = l.module_id
                  WHERE m.course_id = c.id
                    AND lp.student_id = e.student_id
                    AND lp.completed) AS completed_lessons
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            JOIN users u ON u.id = c.instructor_id
            WHERE e.student_id = $1
            ORDER BY e.enrolled_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.student_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        filter: &EnrollmentFilter,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE student_id = $1")
            .bind(filter.student_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }
}

impl_paginatable_for!(EnrollmentSummary, EnrollmentFilter);
