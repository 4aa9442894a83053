mod user;
pub use user::{UserEntity, UserEntityCreate, UserEntityUpdate, UserFilter};

mod course;
pub use course::{
    Course, CourseCreate, CourseFilter, CourseLevel, CourseStats, CourseSummary, CourseUpdate,
};

mod module;
pub use module::{Module, ModuleCreate, ModuleSummary, ModuleUpdate};

mod lesson;
pub use lesson::{Lesson, LessonCreate, LessonUpdate};

mod enrollment;
pub use enrollment::{
    Enrollment, EnrollmentDetail, EnrollmentFilter, EnrollmentSummary,
};

mod lesson_progress;
pub use lesson_progress::{LessonProgress, LessonProgressUpsert};
