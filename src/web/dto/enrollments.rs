use serde::{Deserialize, Serialize};

use crate::{
    model::{
        PageQuery, Pagination,
        entity::{EnrollmentDetail, EnrollmentSummary, LessonProgress, LessonProgressUpsert},
    },
    web::{WebResult, validation::Validator},
};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MyCoursesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl MyCoursesQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct LessonProgressBody {
    pub completed: Option<bool>,
    #[serde(rename = "watchedDuration", alias = "watched_duration")]
    pub watched_duration: Option<i32>,
}

impl LessonProgressBody {
    pub fn validate(self, lesson_id: uuid::Uuid) -> WebResult<LessonProgressUpsert> {
        let mut v = Validator::new();
        if self.completed.is_none() {
            v.error("completed", "completed must be a boolean");
        }
        if let Some(watched) = self.watched_duration {
            v.non_negative_i32("watchedDuration", watched);
        }
        v.finish()?;

        Ok(LessonProgressUpsert {
            lesson_id,
            completed: self.completed.unwrap_or(false),
            watched_duration: self.watched_duration,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EnrollmentResponse {
    pub message: String,
    pub enrollment: EnrollmentDetail,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MyCourse {
    #[serde(flatten)]
    pub enrollment: EnrollmentSummary,
    /// Rounded completion percentage.
    pub progress: i32,
}

impl From<EnrollmentSummary> for MyCourse {
    fn from(enrollment: EnrollmentSummary) -> Self {
        Self {
            progress: enrollment.progress(),
            enrollment,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MyCoursesResponse {
    pub enrollments: Vec<MyCourse>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonProgressResponse {
    pub message: String,
    pub progress: LessonProgress,
    /// Course completion after this update, rounded.
    pub course_progress: i32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn progress_body_camel_case_test() {
        let body: LessonProgressBody =
            serde_json::from_str(r#"{"completed": true, "watchedDuration": 300}"#).unwrap();
        assert_eq!(body.completed, Some(true));
        assert_eq!(body.watched_duration, Some(300));

        let upsert = body.validate(uuid::Uuid::new_v4()).unwrap();
        assert!(upsert.completed);
    }

    #[test]
    fn progress_body_requires_completed_test() {
        let body: LessonProgressBody = serde_json::from_str(r#"{"watchedDuration": 10}"#).unwrap();
        assert!(body.validate(uuid::Uuid::new_v4()).is_err());

        let body: LessonProgressBody =
            serde_json::from_str(r#"{"completed": false, "watchedDuration": -1}"#).unwrap();
        assert!(body.validate(uuid::Uuid::new_v4()).is_err());
    }
}
