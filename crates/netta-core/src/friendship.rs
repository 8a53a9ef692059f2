//! Friendships as directed edges with a small state machine.
//!
//! A single edge `user_id -> friend_id` exists per pair of users. `user_id` is
//! whoever sent the request (or, for blocks, whoever blocked). "Friends" is read
//! symmetrically: an accepted edge makes both ends friends.
//!
//! ```text
//!   (none) --request--> pending --accept--> accepted
//!                          |
//!                          +----reject--> rejected --request--> pending
//!
//!   any state --block--> blocked
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, SocialError, UserId};

/// State of a friendship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    /// Request sent, waiting for the addressee.
    Pending,
    /// Both users are friends.
    Accepted,
    /// The addressee declined.
    Rejected,
    /// `user_id` blocked `friend_id`.
    Blocked,
}

impl FriendshipStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Blocked => "blocked",
        }
    }

    /// Apply an action to the current state (`None` when no edge exists).
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for anything outside the state machine.
    pub fn apply(current: Option<Self>, action: FriendshipAction) -> Result<Self> {
        match (current, action) {
            (None | Some(Self::Rejected), FriendshipAction::Request) => Ok(Self::Pending),
            (Some(Self::Pending), FriendshipAction::Accept) => Ok(Self::Accepted),
            (Some(Self::Pending), FriendshipAction::Reject) => Ok(Self::Rejected),
            (_, FriendshipAction::Block) => Ok(Self::Blocked),
            (from, action) => Err(SocialError::InvalidTransition { from, action }),
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "blocked" => Ok(Self::Blocked),
            other => Err(format!("unknown friendship status: {other}")),
        }
    }
}

/// Something a user does to a friendship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipAction {
    /// Send (or re-send) a friend request.
    Request,
    /// Accept a pending request.
    Accept,
    /// Decline a pending request.
    Reject,
    /// Block the other user.
    Block,
}

/// A directed friendship edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    /// Requester, or blocker for blocked edges.
    pub user_id: UserId,
    /// Addressee, or blocked user.
    pub friend_id: UserId,
    /// Current state.
    pub status: FriendshipStatus,
    /// When the edge was first created.
    pub created_at: DateTime<Utc>,
    /// When the state last changed.
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Start a new pending request from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `SelfAction` when `from == to`.
    pub fn request(from: UserId, to: UserId) -> Result<Self> {
        if from == to {
            return Err(SocialError::SelfAction {
                action: "befriend",
            });
        }
        let status = FriendshipStatus::apply(None, FriendshipAction::Request)?;
        let now = Utc::now();
        Ok(Self {
            user_id: from,
            friend_id: to,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    /// Start a new block edge with no prior relationship.
    ///
    /// # Errors
    ///
    /// Returns `SelfAction` when `blocker == target`.
    pub fn block(blocker: UserId, target: UserId) -> Result<Self> {
        if blocker == target {
            return Err(SocialError::SelfAction { action: "block" });
        }
        let now = Utc::now();
        Ok(Self {
            user_id: blocker,
            friend_id: target,
            status: FriendshipStatus::apply(None, FriendshipAction::Block)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether `user` is one of the two ends of this edge.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.user_id == user || self.friend_id == user
    }

    /// The end of the edge that is not `user`.
    #[must_use]
    pub fn other(&self, user: UserId) -> UserId {
        if self.user_id == user {
            self.friend_id
        } else {
            self.user_id
        }
    }

    /// Apply `action` performed by `actor` to an existing edge.
    ///
    /// - Only the addressee may accept or reject.
    /// - A request from the addressee of a pending edge accepts it.
    /// - A re-request after rejection must come from the original requester.
    /// - Blocking rewrites the edge so that `actor` is `user_id`.
    /// - Only the blocker may act on a blocked edge.
    ///
    /// # Errors
    ///
    /// Returns `NotAllowed` for the wrong actor and `InvalidTransition` for
    /// transitions outside the state machine.
    pub fn transition(&mut self, actor: UserId, action: FriendshipAction) -> Result<()> {
        if !self.involves(actor) {
            return Err(SocialError::NotAllowed(
                "not part of this friendship".into(),
            ));
        }
        if self.status == FriendshipStatus::Blocked && actor != self.user_id {
            return Err(SocialError::NotAllowed("you have been blocked".into()));
        }

        let action = match action {
            FriendshipAction::Request
                if self.status == FriendshipStatus::Pending && actor == self.friend_id =>
            {
                FriendshipAction::Accept
            }
            FriendshipAction::Request if actor != self.user_id => {
                return Err(SocialError::InvalidTransition {
                    from: Some(self.status),
                    action,
                });
            }
            FriendshipAction::Accept | FriendshipAction::Reject if actor != self.friend_id => {
                return Err(SocialError::NotAllowed(
                    "only the addressee can respond to a request".into(),
                ));
            }
            other => other,
        };

        self.status = FriendshipStatus::apply(Some(self.status), action)?;
        if action == FriendshipAction::Block && self.user_id != actor {
            self.friend_id = self.user_id;
            self.user_id = actor;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check that `actor` may delete this edge.
    ///
    /// # Errors
    ///
    /// Returns `NotAllowed` if `actor` is not an end, or is the blocked side of a block.
    pub fn ensure_removable_by(&self, actor: UserId) -> Result<()> {
        if !self.involves(actor) {
            return Err(SocialError::NotAllowed(
                "not part of this friendship".into(),
            ));
        }
        if self.status == FriendshipStatus::Blocked && actor != self.user_id {
            return Err(SocialError::NotAllowed("you have been blocked".into()));
        }
        Ok(())
    }
}
