//! Userdeck - a client for browsing and bookmarking users from a paginated
//! random-user directory API.
//!
//! Build a [`services::Services`] graph (from [`config::AppConfig`]) and create
//! sessions from it:
//!
//! - [`session::UserListSession`] pages through the directory, with local search
//! - [`session::BookmarksSession`] mirrors the persisted bookmark set
//! - [`session::UserDetailSession`] presents one user and its portrait

pub mod adapters;
pub mod api;
pub mod bookmarks;
pub mod cli;
pub mod config;
pub mod error;
pub mod image_cache;
pub mod models;
pub mod reachability;
pub mod services;
pub mod session;
pub mod traits;
