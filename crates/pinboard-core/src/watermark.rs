use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{Board, CoreError, Result, Store};

impl<S: Store> Board<S> {
    /// Record that the owner has just looked at the comments on `image_id`.
    ///
    /// Creates the watermark on first call and moves it to "now" afterwards.
    /// The store upserts on the (image, user) key, so concurrent calls never
    /// produce a second row. Comments already committed are always covered,
    /// and comments committed later always land after it.
    pub fn mark_viewed(&self, image_id: i64, user_id: i64) -> Result<()> {
        let image = self.get_image(image_id)?.image;
        if image.owner_id != user_id {
            return Err(CoreError::Forbidden("only the owner can mark an image as viewed"));
        }

        let stored = self.store.upsert_watermark(image_id, user_id, self.now())?;
        debug!(image_id, user_id, %stored, "Watermark advanced");
        Ok(())
    }

    /// Last time `user_id` marked `image_id` as viewed, if ever.
    pub fn watermark(&self, image_id: i64, user_id: i64) -> Result<Option<DateTime<Utc>>> {
        Ok(self.store.watermark(image_id, user_id)?)
    }
}
