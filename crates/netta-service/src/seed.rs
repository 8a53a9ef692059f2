//! Demo data for a fresh database.

use netta_core::{Comment, FriendshipAction, Post, ProfileUpdate, User};
use netta_store::Store;

use crate::auth::hash_password;
use crate::error::ApiError;

/// Password shared by every demo account.
pub const DEMO_PASSWORD: &str = "netta123";

/// Usernames of the demo accounts.
pub const DEMO_USERS: [&str; 2] = ["alice", "bob"];

/// Populate an empty database with two befriended users and a few posts.
///
/// Does nothing when any user exists. Returns whether data was inserted.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub async fn seed_demo_data(store: &dyn Store) -> Result<bool, ApiError> {
    if store.count_users().await? > 0 {
        return Ok(false);
    }

    let password_hash = hash_password(DEMO_PASSWORD)?;
    let [alice, bob] = DEMO_USERS.map(|name| {
        User::new(
            name.to_string(),
            format!("{name}@netta.local"),
            password_hash.clone(),
        )
    });
    store.create_user(&alice).await?;
    store.create_user(&bob).await?;

    store
        .update_profile(
            &alice.id,
            ProfileUpdate {
                full_name: Some("Alice Example".into()),
                bio: Some("First user of Netta.".into()),
                ..ProfileUpdate::default()
            },
        )
        .await?;

    store
        .friendship_action(&alice.id, &bob.id, FriendshipAction::Request)
        .await?;
    store
        .friendship_action(&bob.id, &alice.id, FriendshipAction::Accept)
        .await?;

    let welcome = Post::new(alice.id, "Welcome to Netta!", None, false)?;
    let friends_only = Post::new(bob.id, "Only my friends can read this.", None, true)?;
    store.create_post(&welcome).await?;
    store.create_post(&friends_only).await?;

    store.toggle_like(&bob.id, &welcome.id).await?;
    store
        .add_comment(&Comment::new(welcome.id, bob.id, "Glad to be here.")?)
        .await?;

    tracing::info!(users = DEMO_USERS.len(), "Demo data seeded");
    Ok(true)
}
