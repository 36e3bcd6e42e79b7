use tracing::info;

use pinboard_types::models::Comment;

use crate::store::CommentWithAuthor;
use crate::{Board, CoreError, Result, Store};

impl<S: Store> Board<S> {
    pub fn create_comment(
        &self,
        image_id: Option<i64>,
        author_id: i64,
        content: &str,
    ) -> Result<Comment> {
        let image_id = image_id.ok_or_else(|| CoreError::invalid("image id is required"))?;
        if content.trim().is_empty() {
            return Err(CoreError::invalid("comment content is required"));
        }
        self.get_image(image_id)?;

        let (id, created_at) = self
            .store
            .insert_comment(image_id, author_id, content, self.now())?;
        info!(comment_id = id, image_id, author_id, "Comment created");

        Ok(Comment {
            id,
            image_id,
            author_id,
            content: content.to_string(),
            created_at,
        })
    }

    /// Only the author may delete a comment.
    pub fn delete_comment(&self, comment_id: i64, requester_id: i64) -> Result<()> {
        let comment = self
            .store
            .comment(comment_id)?
            .ok_or(CoreError::NotFound("comment"))?;
        if comment.author_id != requester_id {
            return Err(CoreError::Forbidden("only the author can delete a comment"));
        }

        if !self.store.delete_comment(comment_id)? {
            return Err(CoreError::NotFound("comment"));
        }
        info!(comment_id, requester_id, "Comment deleted");
        Ok(())
    }

    /// Comments on an image, oldest first.
    pub fn comments_for_image(&self, image_id: i64) -> Result<Vec<CommentWithAuthor>> {
        self.get_image(image_id)?;
        Ok(self.store.comments_on(image_id)?)
    }
}
