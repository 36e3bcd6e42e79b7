use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Timestamps are stored as INTEGER unix microseconds (UTC).
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                nickname    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  INTEGER NOT NULL
            );

            CREATE TABLE images (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                description TEXT,
                file_ref    TEXT NOT NULL,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                created_at  INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL
            );

            CREATE INDEX idx_images_user
                ON images(user_id, created_at);

            CREATE TABLE comments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                content     TEXT NOT NULL,
                image_id    INTEGER NOT NULL REFERENCES images(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                created_at  INTEGER NOT NULL
            );

            CREATE INDEX idx_comments_image
                ON comments(image_id, created_at);

            CREATE TABLE reactions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                emoji       TEXT NOT NULL,
                image_id    INTEGER NOT NULL REFERENCES images(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                created_at  INTEGER NOT NULL,
                UNIQUE(emoji, image_id, user_id)
            );

            CREATE INDEX idx_reactions_image
                ON reactions(image_id);

            CREATE TABLE image_views (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                image_id        INTEGER NOT NULL REFERENCES images(id) ON DELETE CASCADE,
                user_id         INTEGER NOT NULL REFERENCES users(id),
                last_viewed_at  INTEGER NOT NULL,
                UNIQUE(image_id, user_id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
