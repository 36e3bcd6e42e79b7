use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pinboard_db::Database;

use crate::{Board, ManualClock, Store};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

/// In-memory board on a frozen clock starting at [`t0`].
pub fn board() -> (Board<Database>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let db = Database::open_in_memory().unwrap();
    (Board::with_clock(db, clock.clone()), clock)
}

/// Insert a user directly, skipping password hashing.
pub fn user(board: &Board<Database>, name: &str) -> i64 {
    board
        .store()
        .insert_user(name, &name.to_uppercase(), &format!("{}@example.com", name), "x", t0())
        .unwrap()
}

pub fn image(board: &Board<Database>, owner: i64, title: &str) -> i64 {
    board
        .create_image(owner, title, None, &format!("{}.png", title))
        .unwrap()
        .id
}

pub fn tick(clock: &ManualClock) {
    clock.advance(Duration::seconds(1));
}
