//! Course progress: per-lesson completion rows grouped into modules, plus the
//! completion percentage shared by enrollments and the progress endpoint.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{DatabaseResult, ModelManager};

/// Completion in percent, unrounded. `0.0` for a course without lessons, never above `100.0`.
pub fn completion_ratio(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }

    let completed = completed.clamp(0, total);
    completed as f64 / total as f64 * 100.0
}

/// Completion in whole percent, rounded half up.
pub fn progress_percentage(completed: i64, total: i64) -> i32 {
    completion_ratio(completed, total).round() as i32
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressRow {
    pub module_id: Uuid,
    pub module_title: String,
    pub module_order: i32,
    pub lesson_id: Uuid,
    pub lesson_title: String,
    pub duration: i32,
    pub lesson_order: i32,
    pub completed: bool,
    pub watched_duration: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonProgressItem {
    pub id: Uuid,
    pub title: String,
    pub duration: i32,
    pub order_index: i32,
    pub completed: bool,
    pub watched_duration: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleProgress {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub lessons: Vec<LessonProgressItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProgressStats {
    pub total_lessons: i64,
    pub completed_lessons: i64,
    pub progress_percentage: i32,
}

impl ProgressStats {
    pub fn new(total_lessons: i64, completed_lessons: i64) -> Self {
        Self {
            total_lessons,
            completed_lessons,
            progress_percentage: progress_percentage(completed_lessons, total_lessons),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseProgress {
    pub modules: Vec<ModuleProgress>,
    pub stats: ProgressStats,
}

impl CourseProgress {
    /// Groups lesson rows by module. Modules keep the order in which they first appear,
    /// lessons keep row order within their module.
    pub fn from_rows(rows: Vec<ProgressRow>) -> Self {
        let total = rows.len() as i64;
        let completed = rows.iter().filter(|r| r.completed).count() as i64;

        let mut modules: Vec<ModuleProgress> = Vec::new();
        let mut index: HashMap<Uuid, usize> = HashMap::new();

        for row in rows {
            let slot = *index.entry(row.module_id).or_insert_with(|| {
                modules.push(ModuleProgress {
                    id: row.module_id,
                    title: row.module_title.clone(),
                    order_index: row.module_order,
                    lessons: Vec::new(),
                });
                modules.len() - 1
            });

            modules[slot].lessons.push(LessonProgressItem {
                id: row.lesson_id,
                title: row.lesson_title,
                duration: row.duration,
                order_index: row.lesson_order,
                completed: row.completed,
                watched_duration: row.watched_duration,
                completed_at: row.completed_at,
            });
        }

        Self {
            modules,
            stats: ProgressStats::new(total, completed),
        }
    }

    #[tracing::instrument(skip(mm))]
    pub async fn fetch(
        mm: &ModelManager,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        let rows: Vec<ProgressRow> = sqlx::query_as(
            r#"
            SELECT
                m.id AS module_id,
                m.title AS module_title,
                m.order_index AS module_order,
                l.id AS lesson_id,
                l.title AS lesson_title,
                l.duration,
                l.order_index AS lesson_order,
                COALESCE(lp.completed, FALSE) AS completed,
                COALESCE(lp.watched_duration, 0) AS watched_duration,
                lp.completed_at
            FROM modules m
            JOIN lessons l ON l.module_id = m.id
            LEFT JOIN lesson_progress lp
                ON lp.lesson_id = l.id
                AND lp.student_id = $1
            WHERE m.course_id = $2
            ORDER BY m.order_index, m.id, l.order_index, l.id
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(Self::from_rows(rows))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(module: Uuid, module_order: i32, lesson_order: i32, completed: bool) -> ProgressRow {
        ProgressRow {
            module_id: module,
            module_title: format!("module {module_order}"),
            module_order,
            lesson_id: Uuid::new_v4(),
            lesson_title: format!("lesson {lesson_order}"),
            duration: 600,
            lesson_order,
            completed,
            watched_duration: if completed { 600 } else { 0 },
            completed_at: completed.then(Utc::now),
        }
    }

    #[test]
    fn percentage_test() {
        assert_eq!(progress_percentage(0, 0), 0);
        assert_eq!(progress_percentage(0, 3), 0);
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 67);
        assert_eq!(progress_percentage(1, 2), 50);
        assert_eq!(progress_percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(progress_percentage(3, 3), 100);
    }

    #[test]
    fn percentage_is_clamped_test() {
        assert_eq!(progress_percentage(5, 3), 100);
        assert_eq!(progress_percentage(-1, 3), 0);
        assert_eq!(completion_ratio(4, 0), 0.0);
        assert!((completion_ratio(1, 3) - 33.333).abs() < 0.001);
    }

    #[test]
    fn group_rows_test() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let rows = vec![
            row(first, 1, 1, true),
            row(first, 1, 2, false),
            row(second, 2, 1, true),
        ];

        let progress = CourseProgress::from_rows(rows);
        assert_eq!(progress.modules.len(), 2);
        assert_eq!(progress.modules[0].id, first);
        assert_eq!(progress.modules[0].lessons.len(), 2);
        assert_eq!(progress.modules[0].lessons[1].order_index, 2);
        assert_eq!(progress.modules[1].id, second);
        assert_eq!(progress.stats, ProgressStats::new(3, 2));
        assert_eq!(progress.stats.progress_percentage, 67);
    }

    #[test]
    fn group_interleaved_rows_test() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let rows = vec![
            row(first, 1, 1, false),
            row(second, 2, 1, false),
            row(first, 1, 2, false),
        ];

        let progress = CourseProgress::from_rows(rows);
        assert_eq!(progress.modules.len(), 2);
        assert_eq!(progress.modules[0].lessons.len(), 2);
        assert_eq!(progress.modules[1].lessons.len(), 1);
    }

    #[test]
    fn empty_course_test() {
        let progress = CourseProgress::from_rows(vec![]);
        assert!(progress.modules.is_empty());
        assert_eq!(progress.stats, ProgressStats::new(0, 0));
        assert_eq!(progress.stats.progress_percentage, 0);
    }
}
