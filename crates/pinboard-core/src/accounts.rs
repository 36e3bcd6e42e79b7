use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::{info, warn};

use pinboard_types::models::User;

use crate::store::UserKey;
use crate::{Board, CoreError, Result, Store};

const MAX_NICKNAME_CHARS: usize = 20;

pub struct NewAccount<'a> {
    pub username: &'a str,
    pub nickname: Option<&'a str>,
    pub email: &'a str,
    pub password: &'a str,
}

impl<S: Store> Board<S> {
    pub fn register(&self, account: NewAccount<'_>) -> Result<User> {
        let username = account.username.trim();
        let email = account.email.trim();
        if username.is_empty() || email.is_empty() || account.password.is_empty() {
            return Err(CoreError::invalid("username, email and password are required"));
        }
        let username_len = username.chars().count();
        if !(3..=32).contains(&username_len) {
            return Err(CoreError::invalid("username must be 3 to 32 characters"));
        }
        if account.password.len() < 8 {
            return Err(CoreError::invalid("password must be at least 8 characters"));
        }
        if !email.contains('@') {
            return Err(CoreError::invalid("email is malformed"));
        }
        let nickname = match account.nickname.map(str::trim).filter(|n| !n.is_empty()) {
            Some(nickname) => validate_nickname(nickname)?,
            None => username,
        };

        if self.store.find_user(UserKey::Username(username))?.is_some() {
            return Err(CoreError::Conflict("username already taken".into()));
        }
        if self.store.find_user(UserKey::Email(email))?.is_some() {
            return Err(CoreError::Conflict("email already registered".into()));
        }
        if self.store.find_user(UserKey::Nickname(nickname))?.is_some() {
            return Err(CoreError::Conflict("nickname already taken".into()));
        }

        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(account.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
            .to_string();

        let now = self.now();
        let id = self
            .store
            .insert_user(username, nickname, email, &password_hash, now)
            .map_err(|e| CoreError::from_write(e, "account already exists"))?;
        info!(user_id = id, username, "User registered");

        Ok(User {
            id,
            username: username.to_string(),
            nickname: nickname.to_string(),
            email: email.to_string(),
            created_at: now,
        })
    }

    /// Check a username/password pair.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(CoreError::invalid("username and password are required"));
        }
        let stored = self
            .store
            .find_user(UserKey::Username(username.trim()))?
            .ok_or(CoreError::Unauthenticated)?;

        let parsed_hash = PasswordHash::new(&stored.password_hash)
            .map_err(|e| anyhow::anyhow!("corrupt password hash for user {}: {}", stored.user.id, e))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            warn!(username, "Failed login");
            return Err(CoreError::Unauthenticated);
        }
        Ok(stored.user)
    }

    /// The user and how many images they have posted.
    pub fn profile(&self, user_id: i64) -> Result<(User, u64)> {
        let user = self
            .store
            .find_user(UserKey::Id(user_id))?
            .ok_or(CoreError::NotFound("user"))?
            .user;
        let image_count = self.store.count_images_owned_by(user_id)?;
        Ok((user, image_count))
    }

    pub fn update_nickname(&self, user_id: i64, nickname: &str) -> Result<String> {
        let nickname = validate_nickname(nickname.trim())?;

        if let Some(holder) = self.store.find_user(UserKey::Nickname(nickname))? {
            if holder.user.id != user_id {
                return Err(CoreError::Conflict("nickname already taken".into()));
            }
        }

        let updated = self
            .store
            .set_nickname(user_id, nickname)
            .map_err(|e| CoreError::from_write(e, "nickname already taken"))?;
        if !updated {
            return Err(CoreError::NotFound("user"));
        }
        info!(user_id, nickname, "Nickname changed");
        Ok(nickname.to_string())
    }
}

fn validate_nickname(nickname: &str) -> Result<&str> {
    if nickname.is_empty() {
        return Err(CoreError::invalid("nickname is required"));
    }
    if nickname.chars().count() > MAX_NICKNAME_CHARS {
        return Err(CoreError::invalid("nickname must be at most 20 characters"));
    }
    Ok(nickname)
}
