mod access;
pub use access::{HasOwner, check_access};

mod database;
pub use database::{DbConnection, MIGRATOR};

pub mod entity;

mod error;
pub use error::{DatabaseError, DatabaseResult};

pub mod progress;

mod repo;
pub use repo::{
    CrudRepository, ListableRepository, Page, PageQuery, PaginatableRepository, Pagination,
    ResourceType, ResourceTyped,
};

use sqlx::{PgPool, Postgres, Transaction};

#[derive(Debug, Clone)]
pub struct ModelManager {
    database: DbConnection,
}

impl ModelManager {
    pub fn new(conn: DbConnection) -> Self {
        Self { database: conn }
    }

    pub fn executor(&self) -> &PgPool {
        self.database.pool()
    }

    /// Statements run on the transaction are discarded unless it is committed.
    pub async fn begin(&self) -> DatabaseResult<Transaction<'static, Postgres>> {
        Ok(self.database.pool().begin().await?)
    }
}
