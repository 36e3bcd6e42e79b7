use tracing::info;

use pinboard_types::models::Image;

use crate::store::ImageWithOwner;
use crate::{Board, CoreError, Result, Store};

const MAX_TITLE_CHARS: usize = 200;

impl<S: Store> Board<S> {
    pub fn create_image(
        &self,
        owner_id: i64,
        title: &str,
        description: Option<&str>,
        file_ref: &str,
    ) -> Result<Image> {
        let title = title.trim();
        validate_title(title)?;
        if file_ref.trim().is_empty() {
            return Err(CoreError::invalid("file reference is required"));
        }
        let description = description.filter(|d| !d.trim().is_empty());

        let now = self.now();
        let id = self
            .store
            .insert_image(owner_id, title, description, file_ref, now)?;
        info!(image_id = id, owner_id, "Image created");

        Ok(Image {
            id,
            title: title.to_string(),
            description: description.map(str::to_string),
            file_ref: file_ref.to_string(),
            owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_image(&self, image_id: i64) -> Result<ImageWithOwner> {
        self.store.image(image_id)?.ok_or(CoreError::NotFound("image"))
    }

    /// The board front page, newest first.
    pub fn recent_images(&self, limit: u32) -> Result<Vec<ImageWithOwner>> {
        Ok(self.store.recent_images(limit)?)
    }

    /// Edit title and/or description. Absent or blank values keep the
    /// current field.
    pub fn update_image(
        &self,
        image_id: i64,
        requester_id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Image> {
        let mut image = self.owned_image(image_id, requester_id)?;

        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            validate_title(title)?;
            image.title = title.to_string();
        }
        if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
            image.description = Some(description.to_string());
        }

        let now = self.now();
        if !self
            .store
            .update_image(image_id, &image.title, image.description.as_deref(), now)?
        {
            return Err(CoreError::NotFound("image"));
        }
        image.updated_at = now;
        Ok(image)
    }

    /// Delete an image together with its comments, reactions and views.
    pub fn delete_image(&self, image_id: i64, requester_id: i64) -> Result<()> {
        self.owned_image(image_id, requester_id)?;

        if !self.store.delete_image(image_id)? {
            return Err(CoreError::NotFound("image"));
        }
        info!(image_id, requester_id, "Image deleted");
        Ok(())
    }

    /// Fetch an image and check that `requester_id` owns it.
    pub(crate) fn owned_image(&self, image_id: i64, requester_id: i64) -> Result<Image> {
        let image = self.get_image(image_id)?.image;
        if image.owner_id != requester_id {
            return Err(CoreError::Forbidden("only the owner may do this"));
        }
        Ok(image)
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(CoreError::invalid("title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(CoreError::invalid("title is too long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, tick};

    #[test]
    fn test_create_requires_title_and_file() {
        let (board, _) = testutil::board();
        let owner = testutil::user(&board, "owner");

        assert!(matches!(
            board.create_image(owner, "  ", None, "a.png"),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            board.create_image(owner, "Title", None, ""),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(board.recent_images(10).unwrap().is_empty());
    }

    #[test]
    fn test_update_by_owner_keeps_blank_fields() {
        let (board, clock) = testutil::board();
        let owner = testutil::user(&board, "owner");
        let image = board
            .create_image(owner, "Old", Some("desc"), "old.png")
            .unwrap();

        tick(&clock);
        let updated = board
            .update_image(image.id, owner, Some("New"), Some(""))
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description.as_deref(), Some("desc"));
        assert!(updated.updated_at > image.updated_at);

        let stored = board.get_image(image.id).unwrap();
        assert_eq!(stored.image.title, "New");
        assert_eq!(stored.owner_username.as_deref(), Some("owner"));
    }

    #[test]
    fn test_non_owner_cannot_update_or_delete() {
        let (board, _) = testutil::board();
        let owner = testutil::user(&board, "owner");
        let other = testutil::user(&board, "other");
        let image = testutil::image(&board, owner, "mine");

        assert!(matches!(
            board.update_image(image, other, Some("x"), None),
            Err(CoreError::Forbidden(_))
        ));
        assert!(matches!(
            board.delete_image(image, other),
            Err(CoreError::Forbidden(_))
        ));
        assert!(matches!(
            board.delete_image(42, owner),
            Err(CoreError::NotFound(_))
        ));
        assert!(board.get_image(image).is_ok());
    }

    #[test]
    fn test_delete_drops_comments_and_unread() {
        let (board, clock) = testutil::board();
        let owner = testutil::user(&board, "owner");
        let other = testutil::user(&board, "other");
        let image = testutil::image(&board, owner, "doomed");

        tick(&clock);
        let comment = board.create_comment(Some(image), other, "hello").unwrap();
        board.toggle_reaction(Some(image), other, "👍").unwrap();
        board.mark_viewed(image, owner).unwrap();
        assert_eq!(board.count_unread(owner).unwrap(), 0);

        board.delete_image(image, owner).unwrap();

        assert!(matches!(board.get_image(image), Err(CoreError::NotFound(_))));
        assert!(board.store().comment(comment.id).unwrap().is_none());
        assert!(board.store().watermark(image, owner).unwrap().is_none());
        assert_eq!(board.count_unread(owner).unwrap(), 0);
    }
}
