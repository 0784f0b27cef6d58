use chrono::{DateTime, Utc};

use super::category::Category;
use super::post::Post;

/// Правило публичной видимости поста: пост опубликован, дата публикации
/// наступила и рубрика поста опубликована. Пост без рубрики публично
/// не виден: условие на рубрику требует её наличия.
///
/// SQL-выборки в `data::post_repository` повторяют это же правило.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category.is_some_and(|c| c.is_published)
}
