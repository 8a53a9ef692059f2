//! Netta HTTP API Service.
//!
//! This crate provides the JSON HTTP API for the Netta social network:
//!
//! - Registration, login, and logout
//! - Posts, the feed, likes, comments, and shares
//! - Friendships, notifications, and direct messages
//! - Profiles with level, XP, and coins
//!
//! # Authentication
//!
//! `POST /login` returns an HS256 JWT naming a server-side session. Send it as
//! `Authorization: Bearer <token>`; `/logout` deletes the session and with it
//! every copy of the token.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod seed;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use seed::seed_demo_data;
pub use state::AppState;
