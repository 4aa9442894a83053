use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{Lesson, LessonCreate, LessonUpdate, Module, ModuleCreate, ModuleUpdate},
    web::{WebResult, validation::Validator},
};

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ModuleCreateBody {
    pub title: String,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

impl ModuleCreateBody {
    pub fn validate(self, course_id: Uuid) -> WebResult<ModuleCreate> {
        let mut v = Validator::new();
        let title = v.text("title", &self.title, 3, 255);
        v.finish()?;

        Ok(ModuleCreate {
            course_id,
            title,
            description: self.description.unwrap_or_default(),
            order_index: self.order_index,
        })
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ModuleUpdateBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

impl ModuleUpdateBody {
    pub fn validate(self) -> WebResult<ModuleUpdate> {
        let mut v = Validator::new();
        let title = v.optional_text("title", self.title.as_deref(), 3, 255);
        v.finish()?;

        Ok(ModuleUpdate {
            title,
            description: self.description,
            order_index: self.order_index,
        })
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct LessonCreateBody {
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    /// Seconds.
    pub duration: Option<i32>,
    pub order_index: Option<i32>,
}

impl LessonCreateBody {
    pub fn validate(self, module_id: Uuid) -> WebResult<LessonCreate> {
        let mut v = Validator::new();
        let title = v.text("title", &self.title, 3, 255);
        let duration = self.duration.unwrap_or(0);
        v.non_negative_i32("duration", duration);
        v.finish()?;

        Ok(LessonCreate {
            module_id,
            title,
            content: self.content.unwrap_or_default(),
            video_url: self.video_url,
            duration,
            order_index: self.order_index,
        })
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct LessonUpdateBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub order_index: Option<i32>,
}

impl LessonUpdateBody {
    pub fn validate(self) -> WebResult<LessonUpdate> {
        let mut v = Validator::new();
        let title = v.optional_text("title", self.title.as_deref(), 3, 255);
        if let Some(duration) = self.duration {
            v.non_negative_i32("duration", duration);
        }
        v.finish()?;

        Ok(LessonUpdate {
            title,
            content: self.content,
            video_url: self.video_url,
            duration: self.duration,
            order_index: self.order_index,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleResponse {
    pub message: String,
    pub module: Module,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonResponse {
    pub message: String,
    pub lesson: Lesson,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn module_create_test() {
        let course_id = Uuid::new_v4();
        let body = ModuleCreateBody {
            title: String::from(" Basics "),
            ..Default::default()
        };
        let module = body.validate(course_id).unwrap();
        assert_eq!(module.title, "Basics");
        assert_eq!(module.description, "");
        assert_eq!(module.course_id, course_id);

        let body = ModuleCreateBody {
            title: String::from("ab"),
            ..Default::default()
        };
        assert!(body.validate(course_id).is_err());
    }

    #[test]
    fn lesson_duration_test() {
        let body = LessonCreateBody {
            title: String::from("Intro"),
            duration: Some(-5),
            ..Default::default()
        };
        assert!(body.validate(Uuid::new_v4()).is_err());

        let update = LessonUpdateBody {
            duration: Some(120),
            ..Default::default()
        };
        assert_eq!(update.validate().unwrap().duration, Some(120));
    }
}
