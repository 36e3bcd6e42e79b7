//! Database row types — these map directly to SQLite rows.
//! Distinct from pinboard-types models to keep the DB layer independent.

use chrono::{DateTime, Utc};

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

pub struct ImageRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_ref: String,
    pub user_id: i64,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct CommentRow {
    pub id: i64,
    pub image_id: i64,
    pub user_id: i64,
    /// NULL when the author row is gone (LEFT JOIN).
    pub nickname: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub struct ReactionRow {
    pub id: i64,
    pub emoji: String,
    pub image_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub fn to_micros(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

/// Read an INTEGER microsecond column as a UTC timestamp.
pub fn ts_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let micros: i64 = row.get(idx)?;
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {}", micros).into(),
        )
    })
}
