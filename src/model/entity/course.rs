use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::{ListableRepository, ResourceTyped};
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// Course row joined with the instructor's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    title: String,
    description: String,
    instructor_id: Uuid,
    instructor_name: String,
    instructor_avatar: Option<String>,
    category: String,
    level: String,
    price: f64,
    thumbnail: Option<String>,
    is_published: bool,
    is_approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CourseCreate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: CourseLevel,
    pub price: f64,
    pub thumbnail: Option<String>,
}

/// Partial update, `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Default)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub instructor_id: Option<Uuid>,
    /// Admins also see drafts.
    pub include_unpublished: bool,
}

/// Catalogue entry: a course plus its enrollment count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    course: Course,
    enrolled_students: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseStats {
    pub enrolled_students: i64,
    pub average_score: Option<f64>,
    pub certificates_issued: i64,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl ResourceTyped for CourseSummary {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instructor_id(&self) -> Uuid {
        self.instructor_id
    }

    pub fn instructor_name(&self) -> &str {
        &self.instructor_name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }

    pub fn is_approved(&self) -> bool {
        self.is_approved
    }
}

impl CourseSummary {
    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn enrolled_students(&self) -> i64 {
        self.enrolled_students
    }
}

#[async_trait]
impl CrudRepository<Course, CourseCreate, CourseUpdate, Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            WITH c AS (
                INSERT INTO courses (id, title, description, instructor_id, category, level, price, thumbnail)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT c.*, u.name AS instructor_name, u.avatar AS instructor_avatar
            FROM c JOIN users u ON u.id = c.instructor_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(actor.user_id())
        .bind(&data.category)
        .bind(data.level.to_string())
        .bind(data.price)
        .bind(&data.thumbnail)
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseUpdate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            WITH c AS (
                UPDATE courses SET
                    title = COALESCE($1, title),
                    description = COALESCE($2, description),
                    category = COALESCE($3, category),
                    level = COALESCE($4, level),
                    price = COALESCE($5, price),
                    thumbnail = COALESCE($6, thumbnail),
                    updated_at = NOW()
                WHERE id = $7
                RETURNING *
            )
            SELECT c.*, u.name AS instructor_name, u.avatar AS instructor_avatar
            FROM c JOIN users u ON u.id = c.instructor_id
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.level.map(|l| l.to_string()))
        .bind(data.price)
        .bind(&data.thumbnail)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
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
        let result = sqlx::query_as(
            r#"
            SELECT c.*, u.name AS instructor_name, u.avatar AS instructor_avatar
            FROM courses c JOIN users u ON u.id = c.instructor_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(result)
    }
}

impl Course {
    pub async fn set_approved(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        approved: bool,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE courses SET is_approved = $1, updated_at = NOW() WHERE id = $2")
            .bind(approved)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        Ok(Self {
            is_approved: approved,
            ..self
        })
    }

    pub async fn set_published(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        published: bool,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE courses SET is_published = $1, updated_at = NOW() WHERE id = $2")
            .bind(published)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        Ok(Self {
            is_published: published,
            ..self
        })
    }

    /// Published course by id; drafts are not open for enrollment.
    pub async fn find_published(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let course = Self::find_by_id(mm, actor, id).await?;
        Ok(course.filter(|c| c.is_published))
    }
}

#[async_trait]
impl ListableRepository<CourseSummary, CourseFilter> for CourseSummary {
    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        filter: &CourseFilter,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT c.*, u.name AS instructor_name, u.avatar AS instructor_avatar,
                   (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrolled_students
            FROM courses c
            JOIN users u ON u.id = c.instructor_id
            WHERE ($1::text IS NULL OR c.category = $1)
              AND ($2::text IS NULL OR c.level = $2)
              AND ($3::uuid IS NULL OR c.instructor_id = $3)
              AND ($4 OR c.is_published)
            ORDER BY c.created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(&filter.category)
        .bind(filter.level.map(|l| l.to_string()))
        .bind(filter.instructor_id)
        .bind(filter.include_unpublished)
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        filter: &CourseFilter,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM courses c
            WHERE ($1::text IS NULL OR c.category = $1)
              AND ($2::text IS NULL OR c.level = $2)
              AND ($3::uuid IS NULL OR c.instructor_id = $3)
              AND ($4 OR c.is_published)
            "#,
        )
        .bind(&filter.category)
        .bind(filter.level.map(|l| l.to_string()))
        .bind(filter.instructor_id)
        .bind(filter.include_unpublished)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }
}

impl_paginatable_for!(CourseSummary, CourseFilter);

#[async_trait]
impl HasOwner for Course {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.instructor_id)
    }
}

impl CourseStats {
    pub async fn fetch(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        let stats = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(DISTINCT e.student_id)
                   FROM enrollments e WHERE e.course_id = $1) AS enrolled_students,
                (SELECT AVG(ea.score)
                   FROM exam_attempts ea JOIN exams ex ON ex.id = ea.exam_id
                  WHERE ex.course_id = $1 AND ea.passed) AS average_score,
                (SELECT COUNT(*)
                   FROM certificates cert WHERE cert.course_id = $1) AS certificates_issued
            "#,
        )
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(stats)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn level_parse_test() {
        assert_eq!(CourseLevel::parse("beginner"), Some(CourseLevel::Beginner));
        assert_eq!(CourseLevel::parse("advanced"), Some(CourseLevel::Advanced));
        assert_eq!(CourseLevel::parse("Beginner"), None);
        assert_eq!(CourseLevel::parse("invalid-level"), None);
        assert_eq!(CourseLevel::Intermediate.to_string(), "intermediate");
    }
}
