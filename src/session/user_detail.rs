//! Detail screen for a single user.

use std::sync::Arc;

use chrono::DateTime;
use image::DynamicImage;
use tokio::sync::broadcast::error::RecvError;

use crate::bookmarks::{BookmarkStore, BookmarkSubscription};
use crate::image_cache::ImageCache;
use crate::models::UserRecord;

/// What the bookmark button would do if pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkAction {
    Add,
    Remove,
}

impl BookmarkAction {
    pub fn title(self) -> &'static str {
        match self {
            BookmarkAction::Add => "Add Bookmark",
            BookmarkAction::Remove => "Remove Bookmark",
        }
    }
}

/// One labelled value in an info section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRow {
    pub label: &'static str,
    pub value: String,
    /// Symbol name for the row's icon.
    pub icon: &'static str,
}

impl InfoRow {
    fn new(label: &'static str, value: impl Into<String>, icon: &'static str) -> Self {
        Self {
            label,
            value: value.into(),
            icon,
        }
    }
}

pub struct UserDetailSession {
    user: UserRecord,
    unique_id: String,
    bookmarks: Arc<BookmarkStore>,
    images: Arc<ImageCache>,
    subscription: BookmarkSubscription,
}

impl UserDetailSession {
    pub fn new(user: UserRecord, bookmarks: Arc<BookmarkStore>, images: Arc<ImageCache>) -> Self {
        let subscription = bookmarks.subscribe();
        Self {
            unique_id: user.unique_id(),
            user,
            bookmarks,
            images,
            subscription,
        }
    }

    pub fn user(&self) -> &UserRecord {
        &self.user
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmarks.is_bookmarked(&self.unique_id)
    }

    /// Returns the new membership.
    pub fn toggle_bookmark(&self) -> bool {
        self.bookmarks.toggle(&self.user)
    }

    /// Wait until this user's bookmark membership may have changed and return
    /// the current value. Events about other users are skipped.
    pub async fn bookmark_changed(&mut self) -> bool {
        loop {
            match self.subscription.recv().await {
                Ok(event) if event.concerns(&self.unique_id) => break,
                Ok(_) => continue,
                // The session holds the store, so the bus cannot close under it.
                Err(RecvError::Lagged(_)) | Err(RecvError::Closed) => break,
            }
        }
        self.is_bookmarked()
    }

    /// The large portrait, if it can be fetched and decoded.
    pub async fn load_profile_image(&self) -> Option<Arc<DynamicImage>> {
        self.images.load(&self.user.picture.large).await
    }

    pub fn display_name(&self) -> String {
        self.user.full_name()
    }

    pub fn age_location_text(&self) -> String {
        format!(
            "{} years old • {}, {}",
            self.user.age(),
            self.user.location.city,
            self.user.location.country
        )
    }

    pub fn bookmark_action(&self) -> BookmarkAction {
        if self.is_bookmarked() {
            BookmarkAction::Remove
        } else {
            BookmarkAction::Add
        }
    }

    pub fn placeholder_initials(&self) -> String {
        self.user.initials()
    }

    pub fn share_text(&self) -> String {
        format!(
            "Check out {} from {}, {}!",
            self.user.full_name(),
            self.user.location.city,
            self.user.location.country
        )
    }

    pub fn contact_info(&self) -> Vec<InfoRow> {
        vec![
            InfoRow::new("Email", &self.user.email, "envelope"),
            InfoRow::new("Phone", &self.user.phone, "phone"),
            InfoRow::new("Cell", &self.user.cell, "phone.fill"),
        ]
    }

    pub fn location_info(&self) -> Vec<InfoRow> {
        let loc = &self.user.location;
        vec![
            InfoRow::new("Address", self.user.full_address(), "location"),
            InfoRow::new("City", &loc.city, "building.2"),
            InfoRow::new("State", &loc.state, "map"),
            InfoRow::new("Country", &loc.country, "globe"),
            InfoRow::new("Postcode", loc.postcode.as_string(), "number"),
        ]
    }

    pub fn personal_info(&self) -> Vec<InfoRow> {
        vec![
            InfoRow::new("Gender", capitalize(&self.user.gender), "person"),
            InfoRow::new("Date of Birth", long_date(&self.user.dob.date), "calendar"),
            InfoRow::new("Age", format!("{} years old", self.user.age()), "clock"),
            InfoRow::new("Nationality", &self.user.nat, "flag"),
        ]
    }

    pub fn account_info(&self) -> Vec<InfoRow> {
        vec![
            InfoRow::new("Username", &self.user.login.username, "person.circle"),
            InfoRow::new("UUID", &self.user.login.uuid, "key"),
        ]
    }
}

impl std::fmt::Debug for UserDetailSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDetailSession")
            .field("unique_id", &self.unique_id)
            .finish_non_exhaustive()
    }
}

/// "1990-01-05T09:30:00.000Z" -> "January 5, 1990". Anything that is not
/// RFC 3339 comes back unchanged.
fn long_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
