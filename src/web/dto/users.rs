use serde::{Deserialize, Serialize};

use crate::model::{PageQuery, Pagination, entity::UserEntity};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// `admin`, `instructor` or `student`
    pub role: Option<String>,
}

impl UserListQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UsersResponse {
    pub users: Vec<UserEntity>,
    pub pagination: Pagination,
}
