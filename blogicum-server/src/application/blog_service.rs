use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::category::CategoryResponse;
use crate::domain::comment::CommentView;
use crate::domain::ownership;
use crate::domain::post::{NewPost, PostFilter, PostForm, PostView};
use crate::domain::user::UserResponse;
use crate::domain::{DomainError, Post};
use serde::Serialize;
use std::sync::Arc;

pub const POSTS_PER_PAGE: i64 = 10;

/// Страница поста: аннотированный пост и его комментарии,
/// старые комментарии первыми.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

pub struct BlogService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    category_repo: Arc<dyn CategoryRepository + Send + Sync>,
    comment_repo: Arc<dyn CommentRepository + Send + Sync>,
}

fn page_offset(page: i64) -> i64 {
    (page.max(1) - 1) * POSTS_PER_PAGE
}

fn validate_post_form(form: PostForm) -> Result<NewPost, DomainError> {
    if form.title.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if form.title.chars().count() > 256 {
        return Err(DomainError::ValidationError(
            "Title is longer than 256 characters".to_string(),
        ));
    }
    if form.text.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Text cannot be empty".to_string(),
        ));
    }

    Ok(NewPost {
        title: form.title,
        text: form.text,
        pub_date: form.pub_date,
        image: form.image,
        category_id: form.category_id,
        location_id: form.location_id,
        is_published: form.is_published.unwrap_or(true),
    })
}

/// Мутации поста разрешены только автору; несовпадение превращается
/// в редирект на страницу поста, а не в 403.
fn ensure_post_author(user_id: i64, post: &Post) -> Result<(), DomainError> {
    if !ownership::is_author(user_id, post) {
        tracing::warn!(
            "User {} attempted to modify post {} owned by {}",
            user_id,
            post.id,
            post.author_id
        );
        return Err(DomainError::NotPostAuthor { post_id: post.id });
    }
    Ok(())
}

impl BlogService {
    pub fn new(
        post_repo: Arc<dyn PostRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        category_repo: Arc<dyn CategoryRepository + Send + Sync>,
        comment_repo: Arc<dyn CommentRepository + Send + Sync>,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            category_repo,
            comment_repo,
        }
    }

    pub async fn index_page(&self, page: i64) -> Result<(Vec<PostView>, i64), DomainError> {
        self.post_repo
            .list(&PostFilter::public(), POSTS_PER_PAGE, page_offset(page))
            .await
    }

    pub async fn category_page(
        &self,
        slug: &str,
        page: i64,
    ) -> Result<(CategoryResponse, Vec<PostView>, i64), DomainError> {
        let category = self.category_repo.find_published_by_slug(slug).await?;

        let (posts, total) = self
            .post_repo
            .list(
                &PostFilter::for_category(category.id),
                POSTS_PER_PAGE,
                page_offset(page),
            )
            .await?;

        Ok((CategoryResponse::from(category), posts, total))
    }

    /// Владелец видит все свои посты, остальные — только публично видимые.
    pub async fn profile_page(
        &self,
        username: &str,
        viewer: Option<i64>,
        page: i64,
    ) -> Result<(UserResponse, Vec<PostView>, i64), DomainError> {
        let owner = self.user_repo.find_by_username(username).await?;
        let restrict = viewer != Some(owner.id);

        let (posts, total) = self
            .post_repo
            .list(
                &PostFilter::for_author(owner.id, restrict),
                POSTS_PER_PAGE,
                page_offset(page),
            )
            .await?;

        Ok((UserResponse::from(owner), posts, total))
    }

    /// Автор видит свой пост всегда; для остальных тот же идентификатор
    /// повторно разрешается через правило видимости и скрытый пост
    /// неотличим от отсутствующего.
    pub async fn post_detail(
        &self,
        post_id: i64,
        viewer: Option<i64>,
    ) -> Result<PostDetail, DomainError> {
        let post = self.post_repo.find_by_id(post_id).await?;
        let restrict = viewer != Some(post.author_id);

        let view = self.post_repo.find_view(post_id, restrict).await?;
        let comments = self.comment_repo.list_for_post(post_id).await?;

        Ok(PostDetail {
            post: view,
            comments,
        })
    }

    pub async fn create_post(
        &self,
        author_id: i64,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let new_post = validate_post_form(form)?;

        let post = self.post_repo.create(author_id, new_post).await?;

        tracing::info!("Post created: id={}, author_id={}", post.id, author_id);

        Ok(post)
    }

    /// Экземпляр для формы редактирования или подтверждения удаления.
    pub async fn owned_post(&self, post_id: i64, user_id: i64) -> Result<Post, DomainError> {
        let post = self.post_repo.find_by_id(post_id).await?;
        ensure_post_author(user_id, &post)?;
        Ok(post)
    }

    pub async fn update_post(
        &self,
        post_id: i64,
        user_id: i64,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let post = self.post_repo.find_by_id(post_id).await?;
        ensure_post_author(user_id, &post)?;

        let new_post = validate_post_form(form)?;
        let updated = self.post_repo.update(post_id, new_post).await?;

        tracing::info!("Post updated: id={}, author_id={}", post_id, user_id);

        Ok(updated)
    }

    pub async fn delete_post(&self, post_id: i64, user_id: i64) -> Result<(), DomainError> {
        let post = self.post_repo.find_by_id(post_id).await?;
        ensure_post_author(user_id, &post)?;

        self.post_repo.delete(post_id).await?;

        tracing::info!("Post deleted: id={}, author_id={}", post_id, user_id);

        Ok(())
    }
}
