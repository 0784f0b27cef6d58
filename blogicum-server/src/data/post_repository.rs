use crate::domain::post::{NewPost, PostFilter, PostView};
use crate::domain::{DomainError, Post};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, author_id: i64, new_post: NewPost) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError>;
    async fn update(&self, id: i64, new_post: NewPost) -> Result<Post, DomainError>;
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
    /// Выборка листинга: присоединяет автора, рубрику и локацию,
    /// аннотирует числом комментариев, сортирует по дате публикации
    /// (новые первыми) и отдаёт страницу вместе с общим количеством.
    async fn list(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostView>, i64), DomainError>;
    /// То же правило видимости, применённое к одному посту.
    async fn find_view(&self, id: i64, restrict: bool) -> Result<PostView, DomainError>;
}

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &PgRow) -> Result<Post, DomainError> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
        image: row.try_get("image")?,
        author_id: row.try_get("author_id")?,
        category_id: row.try_get("category_id")?,
        location_id: row.try_get("location_id")?,
    })
}

fn view_from_row(row: &PgRow) -> Result<PostView, DomainError> {
    Ok(PostView {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
        image: row.try_get("image")?,
        author_id: row.try_get("author_id")?,
        author_username: row.try_get("author_username")?,
        category_id: row.try_get("category_id")?,
        category_title: row.try_get("category_title")?,
        category_slug: row.try_get("category_slug")?,
        location_name: row.try_get("location_name")?,
        comment_count: row.try_get("comment_count")?,
    })
}

// Рубрика присоединяется LEFT JOIN, но условие c.is_published при
// restrict = TRUE отбрасывает посты без рубрики: NULL не проходит WHERE.
const VIEW_SELECT: &str = r#"
    SELECT p.id, p.title, p.text, p.pub_date, p.is_published, p.created_at, p.image,
           p.author_id, u.username AS author_username,
           p.category_id, c.title AS category_title, c.slug AS category_slug,
           l.name AS location_name,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, author_id: i64, new_post: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (title, text, pub_date, is_published, image,
                               author_id, category_id, location_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, text, pub_date, is_published, created_at, image,
                      author_id, category_id, location_id
            "#,
        )
        .bind(&new_post.title)
        .bind(&new_post.text)
        .bind(new_post.pub_date)
        .bind(new_post.is_published)
        .bind(&new_post.image)
        .bind(author_id)
        .bind(new_post.category_id)
        .bind(new_post.location_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {}", e);
            if e.to_string().contains("foreign key") {
                DomainError::ValidationError("Unknown category or location".to_string())
            } else {
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        post_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, text, pub_date, is_published, created_at, image,
                   author_id, category_id, location_id
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn update(&self, id: i64, new_post: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1,
                text = $2,
                pub_date = $3,
                is_published = $4,
                image = $5,
                category_id = $6,
                location_id = $7
            WHERE id = $8
            RETURNING id, title, text, pub_date, is_published, created_at, image,
                      author_id, category_id, location_id
            "#,
        )
        .bind(&new_post.title)
        .bind(&new_post.text)
        .bind(new_post.pub_date)
        .bind(new_post.is_published)
        .bind(&new_post.image)
        .bind(new_post.category_id)
        .bind(new_post.location_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("foreign key") {
                DomainError::ValidationError("Unknown category or location".to_string())
            } else {
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::PostNotFound)
        } else {
            Ok(())
        }
    }

    async fn list(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostView>, i64), DomainError> {
        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM posts p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE ($1::BIGINT IS NULL OR p.author_id = $1)
              AND ($2::BIGINT IS NULL OR p.category_id = $2)
              AND (NOT $3::BOOLEAN
                   OR (p.is_published AND p.pub_date <= NOW() AND c.is_published))
            "#,
        )
        .bind(filter.author_id)
        .bind(filter.category_id)
        .bind(filter.restrict)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let total: i64 = count_row.try_get("count")?;

        let query = format!(
            r#"
            {VIEW_SELECT}
            WHERE ($1::BIGINT IS NULL OR p.author_id = $1)
              AND ($2::BIGINT IS NULL OR p.category_id = $2)
              AND (NOT $3::BOOLEAN
                   OR (p.is_published AND p.pub_date <= NOW() AND c.is_published))
            ORDER BY p.pub_date DESC, p.id
            LIMIT $4 OFFSET $5
            "#
        );

        let rows = sqlx::query(&query)
            .bind(filter.author_id)
            .bind(filter.category_id)
            .bind(filter.restrict)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let posts = rows
            .iter()
            .map(view_from_row)
            .collect::<Result<Vec<PostView>, DomainError>>()?;

        Ok((posts, total))
    }

    async fn find_view(&self, id: i64, restrict: bool) -> Result<PostView, DomainError> {
        let query = format!(
            r#"
            {VIEW_SELECT}
            WHERE p.id = $1
              AND (NOT $2::BOOLEAN
                   OR (p.is_published AND p.pub_date <= NOW() AND c.is_published))
            "#
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(restrict)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => view_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }
}
