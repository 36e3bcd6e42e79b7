//! The entity-store seam. The engine only talks to [`Store`]; the SQLite
//! [`Database`] is the production implementation.

use anyhow::Result;
use chrono::{DateTime, Utc};

use pinboard_db::Database;
use pinboard_db::models::{CommentRow, ImageRow, UserRow};
use pinboard_types::models::{Comment, Image, User};

pub enum UserKey<'a> {
    Id(i64),
    Username(&'a str),
    Nickname(&'a str),
    Email(&'a str),
}

pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

pub struct ImageWithOwner {
    pub image: Image,
    pub owner_username: Option<String>,
}

pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author_nickname: Option<String>,
}

pub struct ReactionWithUser {
    pub emoji: String,
    pub user_id: i64,
    pub username: Option<String>,
}

pub trait Store: Send + Sync {
    // -- Users --
    fn insert_user(
        &self,
        username: &str,
        nickname: &str,
        email: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<i64>;
    fn find_user(&self, key: UserKey<'_>) -> Result<Option<StoredUser>>;
    fn set_nickname(&self, user_id: i64, nickname: &str) -> Result<bool>;

    // -- Images --
    fn insert_image(
        &self,
        owner_id: i64,
        title: &str,
        description: Option<&str>,
        file_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<i64>;
    fn image(&self, id: i64) -> Result<Option<ImageWithOwner>>;
    fn recent_images(&self, limit: u32) -> Result<Vec<ImageWithOwner>>;
    fn images_owned_by(&self, owner_id: i64) -> Result<Vec<Image>>;
    fn count_images_owned_by(&self, owner_id: i64) -> Result<u64>;
    fn update_image(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool>;
    fn delete_image(&self, id: i64) -> Result<bool>;

    // -- Comments --
    /// Returns the id and the stored timestamp, which may be later than `now`
    /// so that it orders after the image owner's watermark.
    fn insert_comment(
        &self,
        image_id: i64,
        author_id: i64,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<(i64, DateTime<Utc>)>;
    fn comment(&self, id: i64) -> Result<Option<Comment>>;
    fn comments_on(&self, image_id: i64) -> Result<Vec<CommentWithAuthor>>;
    fn count_comments_on(&self, image_id: i64) -> Result<u64>;
    /// Newest first; strictly after `since`; authored by anyone but `exclude_author`.
    fn comments_after(
        &self,
        image_id: i64,
        since: DateTime<Utc>,
        exclude_author: i64,
    ) -> Result<Vec<CommentWithAuthor>>;
    fn count_comments_after(
        &self,
        image_id: i64,
        since: DateTime<Utc>,
        exclude_author: i64,
    ) -> Result<u64>;
    fn delete_comment(&self, id: i64) -> Result<bool>;

    // -- Reactions --
    /// Returns true when the reaction was added, false when removed.
    fn toggle_reaction(&self, image_id: i64, user_id: i64, emoji: &str, now: DateTime<Utc>)
    -> Result<bool>;
    fn reactions_on(&self, image_id: i64) -> Result<Vec<ReactionWithUser>>;

    // -- Watermarks --
    /// Returns the stored watermark: `now`, or the newest comment on the image
    /// if that is later.
    fn upsert_watermark(
        &self,
        image_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>>;
    fn watermark(&self, image_id: i64, user_id: i64) -> Result<Option<DateTime<Utc>>>;
}

impl Store for Database {
    fn insert_user(
        &self,
        username: &str,
        nickname: &str,
        email: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        self.create_user(username, nickname, email, password_hash, now)
    }

    fn find_user(&self, key: UserKey<'_>) -> Result<Option<StoredUser>> {
        let row = match key {
            UserKey::Id(id) => self.get_user_by_id(id)?,
            UserKey::Username(username) => self.get_user_by_username(username)?,
            UserKey::Nickname(nickname) => self.get_user_by_nickname(nickname)?,
            UserKey::Email(email) => self.get_user_by_email(email)?,
        };
        Ok(row.map(stored_user))
    }

    fn set_nickname(&self, user_id: i64, nickname: &str) -> Result<bool> {
        Database::update_nickname(self, user_id, nickname)
    }

    fn insert_image(
        &self,
        owner_id: i64,
        title: &str,
        description: Option<&str>,
        file_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        Database::insert_image(self, owner_id, title, description, file_ref, now)
    }

    fn image(&self, id: i64) -> Result<Option<ImageWithOwner>> {
        Ok(self.get_image(id)?.map(image_with_owner))
    }

    fn recent_images(&self, limit: u32) -> Result<Vec<ImageWithOwner>> {
        Ok(self.list_images(limit)?.into_iter().map(image_with_owner).collect())
    }

    fn images_owned_by(&self, owner_id: i64) -> Result<Vec<Image>> {
        Ok(self
            .get_images_by_owner(owner_id)?
            .into_iter()
            .map(|row| image_with_owner(row).image)
            .collect())
    }

    fn count_images_owned_by(&self, owner_id: i64) -> Result<u64> {
        self.count_images_by_owner(owner_id)
    }

    fn update_image(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        Database::update_image(self, id, title, description, now)
    }

    fn delete_image(&self, id: i64) -> Result<bool> {
        Database::delete_image(self, id)
    }

    fn insert_comment(
        &self,
        image_id: i64,
        author_id: i64,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<(i64, DateTime<Utc>)> {
        Database::insert_comment(self, image_id, author_id, content, now)
    }

    fn comment(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.get_comment(id)?.map(|row| comment_with_author(row).comment))
    }

    fn comments_on(&self, image_id: i64) -> Result<Vec<CommentWithAuthor>> {
        Ok(self
            .get_comments_for_image(image_id)?
            .into_iter()
            .map(comment_with_author)
            .collect())
    }

    fn count_comments_on(&self, image_id: i64) -> Result<u64> {
        self.count_comments_for_image(image_id)
    }

    fn comments_after(
        &self,
        image_id: i64,
        since: DateTime<Utc>,
        exclude_author: i64,
    ) -> Result<Vec<CommentWithAuthor>> {
        Ok(self
            .get_comments_after(image_id, since, exclude_author)?
            .into_iter()
            .map(comment_with_author)
            .collect())
    }

    fn count_comments_after(
        &self,
        image_id: i64,
        since: DateTime<Utc>,
        exclude_author: i64,
    ) -> Result<u64> {
        Database::count_comments_after(self, image_id, since, exclude_author)
    }

    fn delete_comment(&self, id: i64) -> Result<bool> {
        Database::delete_comment(self, id)
    }

    fn toggle_reaction(
        &self,
        image_id: i64,
        user_id: i64,
        emoji: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        Database::toggle_reaction(self, image_id, user_id, emoji, now)
    }

    fn reactions_on(&self, image_id: i64) -> Result<Vec<ReactionWithUser>> {
        Ok(self
            .get_reactions_for_image(image_id)?
            .into_iter()
            .map(|row| ReactionWithUser {
                emoji: row.emoji,
                user_id: row.user_id,
                username: row.username,
            })
            .collect())
    }

    fn upsert_watermark(
        &self,
        image_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        self.upsert_view(image_id, user_id, now)
    }

    fn watermark(&self, image_id: i64, user_id: i64) -> Result<Option<DateTime<Utc>>> {
        self.get_view(image_id, user_id)
    }
}

fn stored_user(row: UserRow) -> StoredUser {
    StoredUser {
        user: User {
            id: row.id,
            username: row.username,
            nickname: row.nickname,
            email: row.email,
            created_at: row.created_at,
        },
        password_hash: row.password,
    }
}

fn image_with_owner(row: ImageRow) -> ImageWithOwner {
    ImageWithOwner {
        image: Image {
            id: row.id,
            title: row.title,
            description: row.description,
            file_ref: row.file_ref,
            owner_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        owner_username: row.username,
    }
}

fn comment_with_author(row: CommentRow) -> CommentWithAuthor {
    CommentWithAuthor {
        comment: Comment {
            id: row.id,
            image_id: row.image_id,
            author_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
        },
        author_nickname: row.nickname,
    }
}
