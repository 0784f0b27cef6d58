use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Дата в будущем означает отложенную публикацию.
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub image: Option<String>,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
}

/// Форма создания/редактирования поста: все поля модели, кроме автора.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
    pub is_published: Option<bool>,
}

/// Проверенные данные формы, готовые к записи.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
    pub is_published: bool,
}

/// Параметры выборки постов: базовая коллекция (все посты, посты
/// рубрики, посты автора) плюс флаг ограничения видимости.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    pub restrict: bool,
}

impl PostFilter {
    pub fn public() -> Self {
        Self {
            restrict: true,
            ..Self::default()
        }
    }

    pub fn for_category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            restrict: true,
            ..Self::default()
        }
    }

    pub fn for_author(author_id: i64, restrict: bool) -> Self {
        Self {
            author_id: Some(author_id),
            restrict,
            ..Self::default()
        }
    }
}

/// Строка листинга: пост вместе с автором, рубрикой, локацией
/// и числом комментариев.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub image: Option<String>,
    pub author_id: i64,
    pub author_username: String,
    pub category_id: Option<i64>,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub location_name: Option<String>,
    pub comment_count: i64,
}
