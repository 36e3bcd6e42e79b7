use tracing::debug;

use pinboard_types::api::{ReactionGroup, ReactionUser};
use pinboard_types::models::{ReactionAction, UNKNOWN_NICKNAME};

use crate::{Board, CoreError, Result, Store};

const MAX_EMOJI_CHARS: usize = 10;

impl<S: Store> Board<S> {
    /// Add the (image, user, emoji) reaction if absent, remove it if present.
    pub fn toggle_reaction(
        &self,
        image_id: Option<i64>,
        user_id: i64,
        emoji: &str,
    ) -> Result<ReactionAction> {
        let image_id = image_id.ok_or_else(|| CoreError::invalid("image id is required"))?;
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(CoreError::invalid("emoji is required"));
        }
        if emoji.chars().count() > MAX_EMOJI_CHARS {
            return Err(CoreError::invalid("emoji is too long"));
        }
        self.get_image(image_id)?;

        let added = self
            .store
            .toggle_reaction(image_id, user_id, emoji, self.now())
            .map_err(|e| CoreError::from_write(e, "reaction changed concurrently"))?;

        let action = if added {
            ReactionAction::Added
        } else {
            ReactionAction::Removed
        };
        debug!(image_id, user_id, emoji, ?action, "Reaction toggled");
        Ok(action)
    }

    /// Reactions on an image grouped by emoji, in order of first use.
    pub fn reaction_summary(&self, image_id: i64) -> Result<Vec<ReactionGroup>> {
        self.get_image(image_id)?;

        let mut groups: Vec<ReactionGroup> = Vec::new();
        for reaction in self.store.reactions_on(image_id)? {
            let user = ReactionUser {
                user_id: reaction.user_id,
                username: reaction
                    .username
                    .unwrap_or_else(|| UNKNOWN_NICKNAME.to_string()),
            };
            match groups.iter_mut().find(|g| g.emoji == reaction.emoji) {
                Some(group) => group.users.push(user),
                None => groups.push(ReactionGroup {
                    emoji: reaction.emoji,
                    count: 0,
                    users: vec![user],
                }),
            }
        }
        for group in &mut groups {
            group.count = group.users.len();
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, tick};

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let (board, _) = testutil::board();
        let owner = testutil::user(&board, "owner");
        let a = testutil::user(&board, "alice");
        let image = testutil::image(&board, owner, "pic");

        assert_eq!(
            board.toggle_reaction(Some(image), a, "👍").unwrap(),
            ReactionAction::Added
        );
        assert_eq!(board.reaction_summary(image).unwrap().len(), 1);

        assert_eq!(
            board.toggle_reaction(Some(image), a, "👍").unwrap(),
            ReactionAction::Removed
        );
        assert!(board.reaction_summary(image).unwrap().is_empty());
    }

    #[test]
    fn test_summary_groups_by_emoji_in_first_use_order() {
        let (board, clock) = testutil::board();
        let owner = testutil::user(&board, "owner");
        let a = testutil::user(&board, "alice");
        let b = testutil::user(&board, "bob");
        let image = testutil::image(&board, owner, "pic");

        for (user, emoji) in [(a, "😂"), (b, "👍"), (b, "😂"), (owner, "😂")] {
            tick(&clock);
            board.toggle_reaction(Some(image), user, emoji).unwrap();
        }

        let summary = board.reaction_summary(image).unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].emoji, "😂");
        assert_eq!(summary[0].count, 3);
        assert_eq!(summary[0].users[0].username, "alice");
        assert_eq!(summary[1].emoji, "👍");
        assert_eq!(summary[1].count, 1);
    }

    #[test]
    fn test_rejects_bad_input_and_missing_image() {
        let (board, _) = testutil::board();
        let owner = testutil::user(&board, "owner");
        let image = testutil::image(&board, owner, "pic");

        assert!(matches!(
            board.toggle_reaction(None, owner, "👍"),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            board.toggle_reaction(Some(image), owner, ""),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            board.toggle_reaction(Some(image), owner, "this is not an emoji"),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            board.toggle_reaction(Some(777), owner, "👍"),
            Err(CoreError::NotFound("image"))
        ));
        assert!(board.reaction_summary(image).unwrap().is_empty());
    }

    #[test]
    fn test_reactions_do_not_affect_unread() {
        let (board, _) = testutil::board();
        let owner = testutil::user(&board, "owner");
        let a = testutil::user(&board, "alice");
        let image = testutil::image(&board, owner, "pic");

        board.toggle_reaction(Some(image), a, "😮").unwrap();
        assert_eq!(board.count_unread(owner).unwrap(), 0);
    }
}
