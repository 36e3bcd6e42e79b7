use std::cmp::Reverse;

use pinboard_types::models::{NotificationEntry, UNKNOWN_NICKNAME, UnreadItem};

use crate::{Board, Result, Store};

/// Most entries a feed ever holds.
pub const FEED_LIMIT: usize = 10;

/// Characters of comment text kept in a preview.
pub const PREVIEW_CHARS: usize = 30;

impl<S: Store> Board<S> {
    /// The owner's notification feed: the most recent unread comments across
    /// all their images, newest first, at most [`FEED_LIMIT`] entries.
    pub fn build_feed(&self, owner_id: i64) -> Result<Vec<NotificationEntry>> {
        Ok(feed_from(self.list_unread(owner_id)?))
    }
}

/// Sort unread items newest first (ties: higher comment id first), keep the
/// first [`FEED_LIMIT`], and shape them into entries.
pub fn feed_from(mut items: Vec<UnreadItem>) -> Vec<NotificationEntry> {
    items.sort_by_key(|item| Reverse((item.created_at, item.comment_id)));
    items.truncate(FEED_LIMIT);
    items.into_iter().map(entry_from).collect()
}

fn entry_from(item: UnreadItem) -> NotificationEntry {
    NotificationEntry {
        id: format!("{}_{}", item.image_id, item.comment_id),
        image_id: item.image_id,
        image_title: item.image_title,
        comment_id: item.comment_id,
        commenter_nickname: item
            .commenter_nickname
            .unwrap_or_else(|| UNKNOWN_NICKNAME.to_string()),
        comment_preview: preview(&item.content),
        created_at: item.created_at,
    }
}

/// First [`PREVIEW_CHARS`] characters plus `...`, or the whole text when it
/// already fits.
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, tick};
    use chrono::Duration;

    fn item(image_id: i64, comment_id: i64, secs: i64) -> UnreadItem {
        UnreadItem {
            image_id,
            image_title: format!("image {}", image_id),
            comment_id,
            commenter_id: 7,
            commenter_nickname: None,
            content: "hello".into(),
            created_at: testutil::t0() + Duration::seconds(secs),
        }
    }

    #[test]
    fn test_preview_boundary() {
        let thirty = "a".repeat(30);
        assert_eq!(preview(&thirty), thirty);

        let thirty_one = "b".repeat(31);
        assert_eq!(preview(&thirty_one), format!("{}...", "b".repeat(30)));

        assert_eq!(preview(""), "");
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let hangul = "가".repeat(31);
        assert_eq!(preview(&hangul), format!("{}...", "가".repeat(30)));
        assert_eq!(preview(&"😍".repeat(30)), "😍".repeat(30));
    }

    #[test]
    fn test_sorted_across_images_with_stable_ties() {
        let items = vec![
            item(1, 10, 5),
            item(2, 11, 9),
            item(1, 12, 1),
            item(3, 14, 5),
            item(2, 13, 5),
        ];

        let ids: Vec<String> = feed_from(items).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["2_11", "3_14", "2_13", "1_10", "1_12"]);
    }

    #[test]
    fn test_capped_to_ten_most_recent() {
        let items: Vec<UnreadItem> = (0..25).map(|i| item(1, i, i)).collect();

        let feed = feed_from(items);
        assert_eq!(feed.len(), FEED_LIMIT);
        assert_eq!(feed[0].comment_id, 24);
        assert_eq!(feed[9].comment_id, 15);
    }

    #[test]
    fn test_missing_commenter_uses_placeholder() {
        let feed = feed_from(vec![item(1, 1, 0)]);
        assert_eq!(feed[0].commenter_nickname, UNKNOWN_NICKNAME);
    }

    #[test]
    fn test_owner_scenario() {
        let (board, clock) = testutil::board();
        let owner = testutil::user(&board, "owner");
        let a = testutil::user(&board, "alice");
        let b = testutil::user(&board, "bob");
        let image = testutil::image(&board, owner, "Harbour");

        tick(&clock);
        board.create_comment(Some(image), a, "lovely light").unwrap();
        tick(&clock);
        let from_b = board.create_comment(Some(image), b, "where is this?").unwrap();

        let feed = board.build_feed(owner).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].comment_id, from_b.id);
        assert_eq!(feed[0].commenter_nickname, "BOB");
        assert_eq!(feed[0].image_title, "Harbour");
        assert_eq!(feed[0].id, format!("{}_{}", image, from_b.id));
        assert_eq!(board.count_unread(owner).unwrap(), 2);

        tick(&clock);
        board.mark_viewed(image, owner).unwrap();
        assert_eq!(board.count_unread(owner).unwrap(), 0);
        assert!(board.build_feed(owner).unwrap().is_empty());

        tick(&clock);
        let long = "0123456789".repeat(4);
        board.create_comment(Some(image), a, &long).unwrap();

        let feed = board.build_feed(owner).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].comment_preview, format!("{}...", &long[..30]));
        assert_eq!(feed[0].commenter_nickname, "ALICE");
    }
}
