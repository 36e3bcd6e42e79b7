//! Unread-comment notification engine for the image board.
//!
//! [`Board`] owns an explicit [`Store`] and [`Clock`]; each component adds its
//! operations to it in its own module.

pub mod accounts;
pub mod clock;
pub mod comments;
pub mod error;
pub mod feed;
pub mod images;
pub mod reactions;
pub mod store;
pub mod unread;
pub mod watermark;

#[cfg(test)]
mod testutil;

use std::sync::Arc;

use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use error::{CoreError, Result};
pub use store::Store;

pub struct Board<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: Store> Board<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
