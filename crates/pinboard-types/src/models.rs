use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nickname shown when the commenting user record no longer exists.
pub const UNKNOWN_NICKNAME: &str = "unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Opaque reference to the file held by the external blob store.
    pub file_ref: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comments are immutable once written; they can only be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub image_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionAction {
    Added,
    Removed,
}

/// One comment the image owner has not seen yet.
#[derive(Debug, Clone, PartialEq)]
pub struct UnreadItem {
    pub image_id: i64,
    pub image_title: String,
    pub comment_id: i64,
    pub commenter_id: i64,
    /// `None` when the commenter's user record is gone.
    pub commenter_nickname: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    /// `{image_id}_{comment_id}`, unique across images.
    pub id: String,
    pub image_id: i64,
    pub image_title: String,
    pub comment_id: i64,
    pub commenter_nickname: String,
    pub comment_preview: String,
    pub created_at: DateTime<Utc>,
}

/// Comment counters for one image, as seen by its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUnread {
    pub image: Image,
    pub total_comments: u64,
    pub unread_comments: u64,
}
