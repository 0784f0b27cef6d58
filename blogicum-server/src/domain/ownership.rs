use super::comment::Comment;
use super::post::Post;

/// Сущности, у которых есть единственный автор.
pub trait Authored {
    fn author_id(&self) -> i64;
}

impl Authored for Post {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// Изменять и удалять сущность может только её автор.
pub fn is_author(user_id: i64, entity: &impl Authored) -> bool {
    entity.author_id() == user_id
}
