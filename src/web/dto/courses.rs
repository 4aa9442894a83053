use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::{
        PageQuery, Pagination,
        entity::{
            Course, CourseCreate, CourseLevel, CourseStats, CourseSummary, CourseUpdate,
            ModuleSummary,
        },
    },
    web::{WebResult, validation::Validator},
};

const LEVELS: [&str; 3] = ["beginner", "intermediate", "advanced"];

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub instructor_id: Option<Uuid>,
}

impl CourseListQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CourseCreateBody {
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
}

impl CourseCreateBody {
    pub fn validate(self) -> WebResult<CourseCreate> {
        let mut v = Validator::new();
        let title = v.text("title", &self.title, 3, 255);
        let description = v.text("description", &self.description, 10, 2000);
        let category = v.text("category", &self.category, 2, 100);
        let level = v.one_of("level", &self.level, CourseLevel::parse, &LEVELS);
        let price = self.price.unwrap_or(0.0);
        v.non_negative_f64("price", price);
        v.finish()?;

        Ok(CourseCreate {
            title,
            description,
            category,
            level: level.unwrap_or(CourseLevel::Beginner),
            price,
            thumbnail: self.thumbnail,
        })
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CourseUpdateBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
}

impl CourseUpdateBody {
    pub fn validate(self) -> WebResult<CourseUpdate> {
        let mut v = Validator::new();
        let title = v.optional_text("title", self.title.as_deref(), 3, 255);
        let description = v.optional_text("description", self.description.as_deref(), 10, 2000);
        let category = v.optional_text("category", self.category.as_deref(), 2, 100);
        let level = self
            .level
            .as_deref()
            .and_then(|level| v.one_of("level", level, CourseLevel::parse, &LEVELS));
        if let Some(price) = self.price {
            v.non_negative_f64("price", price);
        }
        v.finish()?;

        Ok(CourseUpdate {
            title,
            description,
            category,
            level,
            price: self.price,
            thumbnail: self.thumbnail,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ApproveBody {
    pub approved: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PublishBody {
    pub published: bool,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseResponse {
    pub message: String,
    pub course: Course,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CoursesResponse {
    pub courses: Vec<CourseSummary>,
    pub pagination: Pagination,
}

/// Course page: the course, its curriculum outline and aggregate stats.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleSummary>,
    pub stats: CourseStats,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseDetailResponse {
    pub course: CourseDetail,
}

#[cfg(test)]
mod test {
    use super::*;

    fn valid() -> CourseCreateBody {
        CourseCreateBody {
            title: String::from("Test Course"),
            description: String::from("This is a test course description"),
            category: String::from("Programming"),
            level: String::from("beginner"),
            price: Some(99.99),
            thumbnail: None,
        }
    }

    #[test]
    fn create_valid_test() {
        let course = valid().validate().unwrap();
        assert_eq!(course.title, "Test Course");
        assert_eq!(course.level, CourseLevel::Beginner);
        assert_eq!(course.price, 99.99);
    }

    #[test]
    fn create_price_defaults_to_zero_test() {
        let body = CourseCreateBody {
            price: None,
            ..valid()
        };
        assert_eq!(body.validate().unwrap().price, 0.0);
    }

    #[test]
    fn create_invalid_test() {
        let body = CourseCreateBody {
            title: String::from("A"),
            description: String::from("short"),
            category: String::new(),
            level: String::from("invalid-level"),
            price: Some(-10.0),
            thumbnail: None,
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn update_partial_test() {
        let body = CourseUpdateBody {
            title: Some(String::from("Updated Course Title")),
            ..Default::default()
        };
        let update = body.validate().unwrap();
        assert_eq!(update.title.as_deref(), Some("Updated Course Title"));
        assert!(update.description.is_none());

        let body = CourseUpdateBody {
            level: Some(String::from("expert")),
            ..Default::default()
        };
        assert!(body.validate().is_err());
    }
}
