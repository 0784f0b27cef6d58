use crate::domain::comment::CommentView;
use crate::domain::{Comment, DomainError};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(
        &self,
        author_id: i64,
        post_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError>;
    /// Комментарии поста вместе с авторами, старые первыми.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError>;
    /// Выборка сразу ограничена автором: чужой комментарий
    /// неотличим от отсутствующего.
    async fn find_owned(
        &self,
        id: i64,
        post_id: i64,
        author_id: i64,
    ) -> Result<Comment, DomainError>;
    async fn update_owned(
        &self,
        id: i64,
        post_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError>;
    async fn delete_owned(&self, id: i64, post_id: i64, author_id: i64)
        -> Result<(), DomainError>;
}

pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn comment_from_row(row: &PgRow) -> Result<Comment, DomainError> {
    Ok(Comment {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
        author_id: row.try_get("author_id")?,
        post_id: row.try_get("post_id")?,
    })
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(
        &self,
        author_id: i64,
        post_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO comments (text, author_id, post_id)
            VALUES ($1, $2, $3)
            RETURNING id, text, created_at, author_id, post_id
            "#,
        )
        .bind(text)
        .bind(author_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        comment_from_row(&row)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT cm.id, cm.text, cm.created_at, cm.author_id,
                   u.username AS author_username, cm.post_id
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            WHERE cm.post_id = $1
            ORDER BY cm.created_at, cm.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(CommentView {
                    id: row.try_get("id")?,
                    text: row.try_get("text")?,
                    created_at: row.try_get("created_at")?,
                    author_id: row.try_get("author_id")?,
                    author_username: row.try_get("author_username")?,
                    post_id: row.try_get("post_id")?,
                })
            })
            .collect()
    }

    async fn find_owned(
        &self,
        id: i64,
        post_id: i64,
        author_id: i64,
    ) -> Result<Comment, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, text, created_at, author_id, post_id
            FROM comments
            WHERE id = $1 AND post_id = $2 AND author_id = $3
            "#,
        )
        .bind(id)
        .bind(post_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => comment_from_row(&row),
            None => Err(DomainError::CommentNotFound),
        }
    }

    async fn update_owned(
        &self,
        id: i64,
        post_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE comments
            SET text = $1
            WHERE id = $2 AND post_id = $3 AND author_id = $4
            RETURNING id, text, created_at, author_id, post_id
            "#,
        )
        .bind(text)
        .bind(id)
        .bind(post_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => comment_from_row(&row),
            None => Err(DomainError::CommentNotFound),
        }
    }

    async fn delete_owned(
        &self,
        id: i64,
        post_id: i64,
        author_id: i64,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "DELETE FROM comments WHERE id = $1 AND post_id = $2 AND author_id = $3",
        )
        .bind(id)
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::CommentNotFound)
        } else {
            Ok(())
        }
    }
}
