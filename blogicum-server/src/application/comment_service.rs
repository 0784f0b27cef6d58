use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::CommentForm;
use crate::domain::{Comment, DomainError};
use std::sync::Arc;

pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository + Send + Sync>,
    post_repo: Arc<dyn PostRepository + Send + Sync>,
}

fn validate_comment_form(form: &CommentForm) -> Result<(), DomainError> {
    if form.text.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Comment text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

impl CommentService {
    pub fn new(
        comment_repo: Arc<dyn CommentRepository + Send + Sync>,
        post_repo: Arc<dyn PostRepository + Send + Sync>,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
        }
    }

    pub async fn add_comment(
        &self,
        author_id: i64,
        post_id: i64,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        validate_comment_form(&form)?;

        // комментировать можно только существующий пост
        self.post_repo.find_by_id(post_id).await?;

        let comment = self.comment_repo.create(author_id, post_id, &form.text).await?;

        tracing::info!(
            "Comment created: id={}, post_id={}, author_id={}",
            comment.id,
            post_id,
            author_id
        );

        Ok(comment)
    }

    /// Экземпляр для формы редактирования или подтверждения удаления.
    /// Выборка ограничена автором, чужой комментарий — это 404.
    pub async fn owned_comment(
        &self,
        user_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, DomainError> {
        self.comment_repo.find_owned(comment_id, post_id, user_id).await
    }

    pub async fn update_comment(
        &self,
        user_id: i64,
        post_id: i64,
        comment_id: i64,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        validate_comment_form(&form)?;

        let comment = self
            .comment_repo
            .update_owned(comment_id, post_id, user_id, &form.text)
            .await?;

        tracing::info!(
            "Comment updated: id={}, post_id={}, author_id={}",
            comment_id,
            post_id,
            user_id
        );

        Ok(comment)
    }

    pub async fn delete_comment(
        &self,
        user_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        self.comment_repo
            .delete_owned(comment_id, post_id, user_id)
            .await?;

        tracing::info!(
            "Comment deleted: id={}, post_id={}, author_id={}",
            comment_id,
            post_id,
            user_id
        );

        Ok(())
    }
}
