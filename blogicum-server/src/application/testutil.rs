//! Репозитории в памяти для тестов сервисов. Видимость считается тем же
//! предикатом `domain::visibility`, который повторяют SQL-выборки.

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::CommentView;
use crate::domain::post::{NewPost, PostFilter, PostView};
use crate::domain::user::{RegisterUserRequest, UpdateProfileRequest};
use crate::domain::visibility::is_publicly_visible;
use crate::domain::{Category, Comment, DomainError, Post, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    categories: Vec<Category>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn category_of(&self, post: &Post) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| Some(c.id) == post.category_id)
    }

    fn view_of(&self, post: &Post) -> PostView {
        let author_username = self
            .users
            .iter()
            .find(|u| u.id == post.author_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        let category = self.category_of(post);

        PostView {
            id: post.id,
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: post.pub_date,
            is_published: post.is_published,
            created_at: post.created_at,
            image: post.image.clone(),
            author_id: post.author_id,
            author_username,
            category_id: post.category_id,
            category_title: category.map(|c| c.title.clone()),
            category_slug: category.map(|c| c.slug.clone()),
            location_name: None,
            comment_count: self
                .comments
                .iter()
                .filter(|c| c.post_id == post.id)
                .count() as i64,
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user(&self, username: &str) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.users.push(User {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            created_at: Utc::now(),
        });
        id
    }

    pub fn add_category(&self, slug: &str, is_published: bool) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.categories.push(Category {
            id,
            title: slug.to_string(),
            description: String::new(),
            slug: slug.to_string(),
            is_published,
            created_at: Utc::now(),
        });
        id
    }

    pub fn add_post(
        &self,
        author_id: i64,
        category_id: Option<i64>,
        pub_date: DateTime<Utc>,
        is_published: bool,
    ) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.posts.push(Post {
            id,
            title: format!("post {id}"),
            text: "text".to_string(),
            pub_date,
            is_published,
            created_at: Utc::now(),
            image: None,
            author_id,
            category_id,
            location_id: None,
        });
        id
    }

    pub fn add_comment_at(
        &self,
        author_id: i64,
        post_id: i64,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.comments.push(Comment {
            id,
            text: text.to_string(),
            created_at,
            author_id,
            post_id,
        });
        id
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(
        &self,
        req: RegisterUserRequest,
        password_hash: String,
    ) -> Result<User, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.username == req.username || u.email == req.email)
        {
            return Err(DomainError::UserAlreadyExists);
        }
        let id = inner.next_id();
        let user = User {
            id,
            username: req.username,
            email: req.email,
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, DomainError> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, DomainError> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }

    async fn update_profile(
        &self,
        id: i64,
        req: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.id != id && (u.username == req.username || u.email == req.email))
        {
            return Err(DomainError::UserAlreadyExists);
        }
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::UserNotFound)?;
        user.first_name = req.first_name;
        user.last_name = req.last_name;
        user.username = req.username;
        user.email = req.email;
        Ok(user.clone())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        let inner = self.inner.lock().unwrap();
        inner
            .categories
            .iter()
            .find(|c| c.slug == slug && c.is_published)
            .cloned()
            .ok_or(DomainError::CategoryNotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, author_id: i64, new_post: NewPost) -> Result<Post, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let post = Post {
            id,
            title: new_post.title,
            text: new_post.text,
            pub_date: new_post.pub_date,
            is_published: new_post.is_published,
            created_at: Utc::now(),
            image: new_post.image,
            author_id,
            category_id: new_post.category_id,
            location_id: new_post.location_id,
        };
        inner.posts.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        let inner = self.inner.lock().unwrap();
        inner
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(DomainError::PostNotFound)
    }

    async fn update(&self, id: i64, new_post: NewPost) -> Result<Post, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let post = inner
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DomainError::PostNotFound)?;
        post.title = new_post.title;
        post.text = new_post.text;
        post.pub_date = new_post.pub_date;
        post.is_published = new_post.is_published;
        post.image = new_post.image;
        post.category_id = new_post.category_id;
        post.location_id = new_post.location_id;
        Ok(post.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.posts.len();
        inner.posts.retain(|p| p.id != id);
        if inner.posts.len() == before {
            return Err(DomainError::PostNotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostView>, i64), DomainError> {
        let inner = self.inner.lock().unwrap();
        let now = Utc::now();

        let mut matches: Vec<&Post> = inner
            .posts
            .iter()
            .filter(|p| filter.author_id.map_or(true, |a| p.author_id == a))
            .filter(|p| filter.category_id.map_or(true, |c| p.category_id == Some(c)))
            .filter(|p| {
                !filter.restrict || is_publicly_visible(p, inner.category_of(p), now)
            })
            .collect();
        matches.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(a.id.cmp(&b.id)));

        let total = matches.len() as i64;
        let page = matches
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|p| inner.view_of(p))
            .collect();

        Ok((page, total))
    }

    async fn find_view(&self, id: i64, restrict: bool) -> Result<PostView, DomainError> {
        let inner = self.inner.lock().unwrap();
        let post = inner
            .posts
            .iter()
            .find(|p| p.id == id)
            .ok_or(DomainError::PostNotFound)?;
        if restrict && !is_publicly_visible(post, inner.category_of(post), Utc::now()) {
            return Err(DomainError::PostNotFound);
        }
        Ok(inner.view_of(post))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(
        &self,
        author_id: i64,
        post_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let comment = Comment {
            id,
            text: text.to_string(),
            created_at: Utc::now(),
            author_id,
            post_id,
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError> {
        let inner = self.inner.lock().unwrap();
        let mut comments: Vec<&Comment> = inner
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                text: c.text.clone(),
                created_at: c.created_at,
                author_id: c.author_id,
                author_username: inner
                    .users
                    .iter()
                    .find(|u| u.id == c.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
                post_id: c.post_id,
            })
            .collect())
    }

    async fn find_owned(
        &self,
        id: i64,
        post_id: i64,
        author_id: i64,
    ) -> Result<Comment, DomainError> {
        let inner = self.inner.lock().unwrap();
        inner
            .comments
            .iter()
            .find(|c| c.id == id && c.post_id == post_id && c.author_id == author_id)
            .cloned()
            .ok_or(DomainError::CommentNotFound)
    }

    async fn update_owned(
        &self,
        id: i64,
        post_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let comment = inner
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.post_id == post_id && c.author_id == author_id)
            .ok_or(DomainError::CommentNotFound)?;
        comment.text = text.to_string();
        Ok(comment.clone())
    }

    async fn delete_owned(
        &self,
        id: i64,
        post_id: i64,
        author_id: i64,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.comments.len();
        inner
            .comments
            .retain(|c| !(c.id == id && c.post_id == post_id && c.author_id == author_id));
        if inner.comments.len() == before {
            return Err(DomainError::CommentNotFound);
        }
        Ok(())
    }
}
