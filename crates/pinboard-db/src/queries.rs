use crate::models::{CommentRow, ImageRow, ReactionRow, UserRow, to_micros, ts_column};
use crate::Database;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, TransactionBehavior, params};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        username: &str,
        nickname: &str,
        email: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (username, nickname, email, password, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![username, nickname, email, password_hash, to_micros(&now)],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_nickname(&self, nickname: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "nickname", nickname))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn update_nickname(&self, user_id: i64, nickname: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE users SET nickname = ?1 WHERE id = ?2",
                params![nickname, user_id],
            )?;
            Ok(n > 0)
        })
    }

    // -- Images --

    pub fn insert_image(
        &self,
        user_id: i64,
        title: &str,
        description: Option<&str>,
        file_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let ts = to_micros(&now);
            conn.execute(
                "INSERT INTO images (title, description, file_ref, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![title, description, file_ref, user_id, ts, ts],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_image(&self, id: i64) -> Result<Option<ImageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE i.id = ?1", IMAGE_SELECT))?;
            stmt.query_row([id], image_from_row).optional()
        })
    }

    /// Newest first.
    pub fn list_images(&self, limit: u32) -> Result<Vec<ImageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} ORDER BY i.created_at DESC, i.id DESC LIMIT ?1",
                IMAGE_SELECT
            ))?;
            let rows = stmt
                .query_map([limit], image_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Images owned by `user_id`, newest first.
    pub fn get_images_by_owner(&self, user_id: i64) -> Result<Vec<ImageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE i.user_id = ?1 ORDER BY i.created_at DESC, i.id DESC",
                IMAGE_SELECT
            ))?;
            let rows = stmt
                .query_map([user_id], image_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_images_by_owner(&self, user_id: i64) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM images WHERE user_id = ?1",
                [user_id],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }

    pub fn update_image(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE images SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                params![title, description, to_micros(&now), id],
            )?;
            Ok(n > 0)
        })
    }

    /// Deletes the image; comments, reactions and views go with it via
    /// `ON DELETE CASCADE`.
    pub fn delete_image(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM images WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Comments --

    /// Returns the new id and the stored `created_at`.
    ///
    /// `created_at` is at least one microsecond past the image owner's
    /// watermark, so a comment committed after `upsert_view` stays unread even
    /// when `now` was read before the view was recorded.
    pub fn insert_comment(
        &self,
        image_id: i64,
        user_id: i64,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<(i64, DateTime<Utc>)> {
        self.with_conn_mut(|conn| {
            let inserted: (i64, DateTime<Utc>) = conn.query_row(
                "INSERT INTO comments (content, image_id, user_id, created_at)
                 SELECT ?1, ?2, ?3, MAX(?4, COALESCE(
                     (SELECT v.last_viewed_at + 1
                      FROM image_views v
                      JOIN images i ON i.id = v.image_id AND i.user_id = v.user_id
                      WHERE v.image_id = ?2),
                     ?4))
                 RETURNING id, created_at",
                params![content, image_id, user_id, to_micros(&now)],
                |row| Ok((row.get(0)?, ts_column(row, 1)?)),
            )?;
            Ok(inserted)
        })
    }

    pub fn get_comment(&self, id: i64) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE c.id = ?1", COMMENT_SELECT))?;
            stmt.query_row([id], comment_from_row).optional()
        })
    }

    /// All comments on an image, oldest first.
    pub fn get_comments_for_image(&self, image_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE c.image_id = ?1 ORDER BY c.created_at ASC, c.id ASC",
                COMMENT_SELECT
            ))?;
            let rows = stmt
                .query_map([image_id], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_comments_for_image(&self, image_id: i64) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM comments WHERE image_id = ?1",
                [image_id],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }

    /// Comments on `image_id` strictly newer than `since` and not written by
    /// `exclude_user`, newest first.
    pub fn get_comments_after(
        &self,
        image_id: i64,
        since: DateTime<Utc>,
        exclude_user: i64,
    ) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE c.image_id = ?1 AND c.created_at > ?2 AND c.user_id != ?3
                 ORDER BY c.created_at DESC, c.id DESC",
                COMMENT_SELECT
            ))?;
            let rows = stmt
                .query_map(params![image_id, to_micros(&since), exclude_user], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Count-only twin of [`Database::get_comments_after`].
    pub fn count_comments_after(
        &self,
        image_id: i64,
        since: DateTime<Utc>,
        exclude_user: i64,
    ) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM comments
                 WHERE image_id = ?1 AND created_at > ?2 AND user_id != ?3",
                params![image_id, to_micros(&since), exclude_user],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }

    pub fn delete_comment(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Reactions --

    /// Toggle a reaction: removes if exists, inserts if not.
    /// Returns true when the reaction was inserted, false when removed.
    pub fn toggle_reaction(
        &self,
        image_id: i64,
        user_id: i64,
        emoji: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let removed = tx.execute(
                "DELETE FROM reactions WHERE emoji = ?1 AND image_id = ?2 AND user_id = ?3",
                params![emoji, image_id, user_id],
            )?;

            let added = if removed == 0 {
                tx.execute(
                    "INSERT INTO reactions (emoji, image_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![emoji, image_id, user_id, to_micros(&now)],
                )?;
                true
            } else {
                false
            };

            tx.commit()?;
            Ok(added)
        })
    }

    /// Reactions on an image in the order they were made.
    pub fn get_reactions_for_image(&self, image_id: i64) -> Result<Vec<ReactionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.emoji, r.image_id, r.user_id, u.username, r.created_at
                 FROM reactions r
                 LEFT JOIN users u ON r.user_id = u.id
                 WHERE r.image_id = ?1
                 ORDER BY r.created_at ASC, r.id ASC",
            )?;
            let rows = stmt
                .query_map([image_id], |row| {
                    Ok(ReactionRow {
                        id: row.get(0)?,
                        emoji: row.get(1)?,
                        image_id: row.get(2)?,
                        user_id: row.get(3)?,
                        username: row.get(4)?,
                        created_at: ts_column(row, 5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Image views --

    /// Set the (image, user) watermark to `now`, creating the row on first use.
    /// Moves the (image, user) watermark to `now`, or to the newest comment on
    /// the image if that is later. Returns the stored watermark.
    pub fn upsert_view(
        &self,
        image_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        self.with_conn_mut(|conn| {
            let stored = conn.query_row(
                "INSERT INTO image_views (image_id, user_id, last_viewed_at)
                 VALUES (?1, ?2, MAX(?3, COALESCE(
                     (SELECT MAX(created_at) FROM comments WHERE image_id = ?1),
                     ?3)))
                 ON CONFLICT(image_id, user_id) DO UPDATE SET last_viewed_at = excluded.last_viewed_at
                 RETURNING last_viewed_at",
                params![image_id, user_id, to_micros(&now)],
                |row| ts_column(row, 0),
            )?;
            Ok(stored)
        })
    }

    pub fn get_view(&self, image_id: i64, user_id: i64) -> Result<Option<DateTime<Utc>>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT last_viewed_at FROM image_views WHERE image_id = ?1 AND user_id = ?2",
                params![image_id, user_id],
                |row| ts_column(row, 0),
            )
            .optional()
        })
    }

    pub fn count_views_for_image(&self, image_id: i64) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM image_views WHERE image_id = ?1",
                [image_id],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }
}

// JOIN users to fetch the display name in a single query (no N+1)
const IMAGE_SELECT: &str = "SELECT i.id, i.title, i.description, i.file_ref, i.user_id, u.username,
        i.created_at, i.updated_at
     FROM images i
     LEFT JOIN users u ON i.user_id = u.id";

const COMMENT_SELECT: &str = "SELECT c.id, c.image_id, c.user_id, u.nickname, c.content, c.created_at
     FROM comments c
     LEFT JOIN users u ON c.user_id = u.id";

fn query_user<P: rusqlite::ToSql>(conn: &Connection, column: &str, value: P) -> Result<Option<UserRow>> {
    // `column` is always one of our literal column names, never user input.
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, nickname, email, password, created_at FROM users WHERE {} = ?1",
        column
    ))?;

    stmt.query_row([value], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            nickname: row.get(2)?,
            email: row.get(3)?,
            password: row.get(4)?,
            created_at: ts_column(row, 5)?,
        })
    })
    .optional()
}

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<ImageRow> {
    Ok(ImageRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        file_ref: row.get(3)?,
        user_id: row.get(4)?,
        username: row.get(5)?,
        created_at: ts_column(row, 6)?,
        updated_at: ts_column(row, 7)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        image_id: row.get(1)?,
        user_id: row.get(2)?,
        nickname: row.get(3)?,
        content: row.get(4)?,
        created_at: ts_column(row, 5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn seed(db: &Database) -> (i64, i64, i64) {
        let now = Utc::now();
        let owner = db.create_user("owner", "Owner", "o@example.com", "h", now).unwrap();
        let other = db.create_user("other", "Other", "x@example.com", "h", now).unwrap();
        let image = db.insert_image(owner, "Sunset", None, "sunset.png", now).unwrap();
        (owner, other, image)
    }

    #[test]
    fn test_toggle_reaction_alternates() {
        let db = Database::open_in_memory().unwrap();
        let (_, other, image) = seed(&db);
        let now = Utc::now();

        assert!(db.toggle_reaction(image, other, "👍", now).unwrap());
        assert_eq!(db.get_reactions_for_image(image).unwrap().len(), 1);
        assert!(!db.toggle_reaction(image, other, "👍", now).unwrap());
        assert!(db.get_reactions_for_image(image).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_view_keeps_single_row() {
        let db = Database::open_in_memory().unwrap();
        let (owner, _, image) = seed(&db);
        let t1 = Utc::now();
        let t2 = t1 + Duration::seconds(5);

        db.upsert_view(image, owner, t1).unwrap();
        db.upsert_view(image, owner, t2).unwrap();

        assert_eq!(db.count_views_for_image(image).unwrap(), 1);
        let stored = db.get_view(image, owner).unwrap().unwrap();
        assert_eq!(stored.timestamp_micros(), t2.timestamp_micros());
    }

    #[test]
    fn test_comments_after_is_strict_and_excludes_author() {
        let db = Database::open_in_memory().unwrap();
        let (owner, other, image) = seed(&db);
        let t0 = Utc::now();

        db.insert_comment(image, other, "at t0", t0).unwrap();
        db.insert_comment(image, owner, "self", t0 + Duration::seconds(1)).unwrap();
        db.insert_comment(image, other, "later", t0 + Duration::seconds(2)).unwrap();

        let rows = db.get_comments_after(image, t0, owner).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "later");
        assert_eq!(rows[0].nickname.as_deref(), Some("Other"));
        assert_eq!(db.count_comments_after(image, t0, owner).unwrap(), 1);
    }

    #[test]
    fn test_stale_comment_time_lands_after_watermark() {
        let db = Database::open_in_memory().unwrap();
        let (owner, other, image) = seed(&db);
        let viewed = Utc::now();
        let stale = viewed - Duration::seconds(2);

        let watermark = db.upsert_view(image, owner, viewed).unwrap();
        let (_, created_at) = db.insert_comment(image, other, "late", stale).unwrap();

        assert_eq!(created_at.timestamp_micros(), watermark.timestamp_micros() + 1);
        assert_eq!(db.count_comments_after(image, watermark, owner).unwrap(), 1);
    }

    #[test]
    fn test_stale_view_time_covers_committed_comments() {
        let db = Database::open_in_memory().unwrap();
        let (owner, other, image) = seed(&db);
        let commented = Utc::now();

        db.insert_comment(image, other, "seen", commented).unwrap();
        let watermark = db
            .upsert_view(image, owner, commented - Duration::seconds(2))
            .unwrap();

        assert_eq!(watermark.timestamp_micros(), commented.timestamp_micros());
        assert_eq!(db.count_comments_after(image, watermark, owner).unwrap(), 0);
    }

    #[test]
    fn test_delete_image_cascades() {
        let db = Database::open_in_memory().unwrap();
        let (owner, other, image) = seed(&db);
        let now = Utc::now();

        let (comment, _) = db.insert_comment(image, other, "nice", now).unwrap();
        db.toggle_reaction(image, other, "😍", now).unwrap();
        db.upsert_view(image, owner, now).unwrap();

        assert!(db.delete_image(image).unwrap());

        assert!(db.get_comment(comment).unwrap().is_none());
        assert!(db.get_reactions_for_image(image).unwrap().is_empty());
        assert_eq!(db.count_views_for_image(image).unwrap(), 0);
        assert!(!db.delete_image(image).unwrap());
    }

    #[test]
    fn test_comment_requires_existing_image() {
        let db = Database::open_in_memory().unwrap();
        let (_, other, _) = seed(&db);

        assert!(db.insert_comment(9999, other, "orphan", Utc::now()).is_err());
    }
}
