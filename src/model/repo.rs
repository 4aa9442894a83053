use serde::{Deserialize, Serialize};

use crate::{
    model::{ModelManager, error::DatabaseResult},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResourceType {
    User,
    Course,
    Module,
    Lesson,
    Enrollment,
    LessonProgress,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Course => write!(f, "Course"),
            Self::Module => write!(f, "Module"),
            Self::Lesson => write!(f, "Lesson"),
            Self::Enrollment => write!(f, "Enrollment"),
            Self::LessonProgress => write!(f, "Lesson progress"),
        }
    }
}

/// `page`/`limit` query parameters. Pages start at 1.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(query: PageQuery, total: i64) -> Self {
        let limit = query.limit();
        Self {
            page: query.page(),
            limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, query: PageQuery) -> Self {
        Self {
            items,
            pagination: Pagination::new(query, total),
        }
    }
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

#[async_trait::async_trait]
pub trait CrudRepository<T, Create, Update, V>
where
    T: ResourceTyped,
    V: Clone + Copy,
{
    async fn create(mm: &ModelManager, actor: &AuthenticatedUser, data: Create)
    -> DatabaseResult<T>;

    async fn update(
        self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: Update,
    ) -> DatabaseResult<T>
    where
        Self: Sized;

    async fn delete(self, mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<()>
    where
        Self: Sized;

    async fn find_by_id(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: V,
    ) -> DatabaseResult<Option<T>>;
}

/// Filtered listing. `F` narrows the rows (category, owner, role...).
#[async_trait::async_trait]
pub trait ListableRepository<T, F>
where
    T: ResourceTyped,
    F: Sync,
{
    async fn list(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        filter: &F,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<T>>;

    async fn count(mm: &ModelManager, actor: &AuthenticatedUser, filter: &F)
    -> DatabaseResult<i64>;
}

#[async_trait::async_trait]
pub trait PaginatableRepository<T, F>
where
    T: ResourceTyped + ListableRepository<T, F>,
    F: Sync,
{
    async fn page(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        filter: &F,
        query: PageQuery,
    ) -> DatabaseResult<Page<T>>;
}

#[macro_export]
macro_rules! impl_paginatable_for {
    ($ent:ident, $filter:ident) => {
        #[async_trait::async_trait]
        impl $crate::model::PaginatableRepository<$ent, $filter> for $ent {
            async fn page(
                mm: &$crate::model::ModelManager,
                actor: &$crate::web::AuthenticatedUser,
                filter: &$filter,
                query: $crate::model::PageQuery,
            ) -> $crate::model::DatabaseResult<$crate::model::Page<$ent>> {
                use $crate::model::ListableRepository;

                let (items, count) = tokio::try_join!(
                    $ent::list(mm, actor, filter, query.limit(), query.offset()),
                    $ent::count(mm, actor, filter),
                )?;
                Ok($crate::model::Page::new(items, count, query))
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn page_query_defaults_test() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn page_query_bounds_test() {
        let query = PageQuery::new(Some(0), Some(1000));
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), PageQuery::MAX_LIMIT);

        let query = PageQuery::new(Some(3), Some(-5));
        assert_eq!(query.limit(), 1);
        assert_eq!(query.offset(), 2);

        let query = PageQuery::new(Some(3), Some(20));
        assert_eq!(query.offset(), 40);
    }

    #[test]
    fn pagination_pages_test() {
        let query = PageQuery::new(Some(2), Some(10));
        assert_eq!(Pagination::new(query, 0).pages, 0);
        assert_eq!(Pagination::new(query, 10).pages, 1);
        assert_eq!(Pagination::new(query, 11).pages, 2);

        let p = Pagination::new(query, 25);
        assert_eq!(p, Pagination { page: 2, limit: 10, total: 25, pages: 3 });
    }
}
