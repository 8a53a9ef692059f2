//! User accounts and the level/XP progression.
//!
//! Users earn XP for actions such as liking posts. Every `level * 100` XP is
//! converted into one level and [`COINS_PER_LEVEL`] coins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

// ============================================================================
// Constants
// ============================================================================

/// XP needed per level, multiplied by the current level.
pub const XP_PER_LEVEL: i64 = 100;

/// Coins awarded for each level gained.
pub const COINS_PER_LEVEL: i64 = 50;

/// XP awarded to a user for liking a post.
pub const LIKE_XP_REWARD: u32 = 5;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID.
    pub id: UserId,

    /// Unique login name.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Display name.
    pub full_name: Option<String>,

    /// Free-form profile text.
    pub bio: Option<String>,

    /// Link to an avatar image.
    pub avatar_url: Option<String>,

    /// Free-form location.
    pub location: Option<String>,

    /// Current level, starting at 1.
    pub level: i64,

    /// XP accumulated towards the next level.
    pub xp: i64,

    /// Coins earned from leveling up.
    pub coins: i64,

    /// When the user registered.
    pub created_at: DateTime<Utc>,

    /// Last authenticated request.
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Create a new level-1 user with no XP or coins.
    #[must_use]
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            username,
            email,
            password_hash,
            full_name: None,
            bio: None,
            avatar_url: None,
            location: None,
            level: 1,
            xp: 0,
            coins: 0,
            created_at: now,
            last_seen: now,
        }
    }

    /// XP required to leave the current level.
    #[must_use]
    pub const fn xp_to_next_level(&self) -> i64 {
        self.level * XP_PER_LEVEL
    }

    /// Add XP, converting it into levels and coins.
    ///
    /// While `xp >= level * 100` the threshold is subtracted, the level goes up by
    /// one and [`COINS_PER_LEVEL`] coins are awarded.
    pub fn add_xp(&mut self, amount: u32) -> LevelProgress {
        let starting_level = self.level;
        self.xp += i64::from(amount);

        while self.xp >= self.xp_to_next_level() {
            self.xp -= self.xp_to_next_level();
            self.level += 1;
            self.coins += COINS_PER_LEVEL;
        }

        LevelProgress {
            xp_awarded: amount,
            levels_gained: self.level - starting_level,
            level: self.level,
            xp: self.xp,
            coins: self.coins,
        }
    }

    /// Apply a profile update. `None` fields are left untouched; empty strings clear.
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        fn merge(slot: &mut Option<String>, value: Option<String>) {
            if let Some(value) = value {
                let value = value.trim().to_string();
                *slot = if value.is_empty() { None } else { Some(value) };
            }
        }

        merge(&mut self.full_name, update.full_name);
        merge(&mut self.bio, update.bio);
        merge(&mut self.avatar_url, update.avatar_url);
        merge(&mut self.location, update.location);
    }
}

/// Result of an XP award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// XP that was added.
    pub xp_awarded: u32,
    /// Number of levels gained by this award.
    pub levels_gained: i64,
    /// Level after the award.
    pub level: i64,
    /// XP after the award.
    pub xp: i64,
    /// Coins after the award.
    pub coins: i64,
}

impl LevelProgress {
    /// Whether the award caused at least one level-up.
    #[must_use]
    pub const fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name.
    pub full_name: Option<String>,
    /// New profile text.
    pub bio: Option<String>,
    /// New avatar link.
    pub avatar_url: Option<String>,
    /// New location.
    pub location: Option<String>,
}
