use crate::domain::{Category, DomainError};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Поиск сразу ограничен опубликованными рубриками: скрытая рубрика
    /// неотличима от отсутствующей.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Category, DomainError>;
}

pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE slug = $1 AND is_published
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => Ok(Category {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
                slug: row.try_get("slug")?,
                is_published: row.try_get("is_published")?,
                created_at: row.try_get("created_at")?,
            }),
            None => Err(DomainError::CategoryNotFound),
        }
    }
}
