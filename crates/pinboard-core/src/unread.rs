//! Unread-comment aggregation for an image owner.
//!
//! A comment on image I is unread for I's owner when it was written by
//! someone else strictly after the owner's watermark on I. An image the owner
//! never marked as viewed has the watermark [`NEVER_VIEWED`], so every
//! foreign comment on it counts.

use chrono::{DateTime, Utc};

use pinboard_types::models::{Image, ImageUnread, UnreadItem};

use crate::{Board, Result, Store};

/// Watermark used for images that have never been marked as viewed.
pub const NEVER_VIEWED: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// One owned image and the instant after which its comments are unread.
struct UnreadWindow {
    image: Image,
    since: DateTime<Utc>,
}

impl<S: Store> Board<S> {
    fn unread_windows(&self, owner_id: i64) -> Result<Vec<UnreadWindow>> {
        self.store
            .images_owned_by(owner_id)?
            .into_iter()
            .map(|image| -> Result<UnreadWindow> {
                let since = self
                    .store
                    .watermark(image.id, owner_id)?
                    .unwrap_or(NEVER_VIEWED);
                Ok(UnreadWindow { image, since })
            })
            .collect()
    }

    /// Total unread comments across every image `owner_id` owns. Not capped.
    pub fn count_unread(&self, owner_id: i64) -> Result<u64> {
        let mut total = 0;
        for window in self.unread_windows(owner_id)? {
            total += self
                .store
                .count_comments_after(window.image.id, window.since, owner_id)?;
        }
        Ok(total)
    }

    /// Every unread comment across `owner_id`'s images, grouped per image
    /// (newest image first, newest comment first within an image).
    pub fn list_unread(&self, owner_id: i64) -> Result<Vec<UnreadItem>> {
        let mut items = Vec::new();
        for window in self.unread_windows(owner_id)? {
            let comments = self
                .store
                .comments_after(window.image.id, window.since, owner_id)?;
            items.extend(comments.into_iter().map(|c| UnreadItem {
                image_id: window.image.id,
                image_title: window.image.title.clone(),
                comment_id: c.comment.id,
                commenter_id: c.comment.author_id,
                commenter_nickname: c.author_nickname,
                content: c.comment.content,
                created_at: c.comment.created_at,
            }));
        }
        Ok(items)
    }

    /// Per-image comment totals and unread counts for the owner's profile.
    pub fn unread_by_image(&self, owner_id: i64) -> Result<Vec<ImageUnread>> {
        self.unread_windows(owner_id)?
            .into_iter()
            .map(|window| -> Result<ImageUnread> {
                let total_comments = self.store.count_comments_on(window.image.id)?;
                let unread_comments =
                    self.store
                        .count_comments_after(window.image.id, window.since, owner_id)?;
                Ok(ImageUnread {
                    image: window.image,
                    total_comments,
                    unread_comments,
                })
            })
            .collect()
    }
}
