use serde::{Deserialize, Serialize};

/// A user record as returned by the listing endpoint.
///
/// Records are immutable values. Identity is [`UserRecord::unique_id`]
/// (email + username), never the structural `id` field, which the API
/// frequently leaves empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub gender: String,
    pub name: Name,
    pub location: Location,
    pub email: String,
    pub login: Login,
    pub dob: DateOfBirth,
    pub registered: DateOfBirth,
    pub phone: String,
    pub cell: String,
    #[serde(default)]
    pub id: UserId,
    pub picture: Picture,
    pub nat: String,
}

impl UserRecord {
    /// Stable key used for equality, bookmarking and lookup.
    pub fn unique_id(&self) -> String {
        format!("{}_{}", self.email, self.login.username)
    }

    /// "title first last", e.g. "Mr Brad Gibson".
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.name.title, self.name.first, self.name.last)
    }

    /// "first last" without the title.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name.first, self.name.last)
    }

    /// "number street, city, state, country, postcode".
    pub fn full_address(&self) -> String {
        let loc = &self.location;
        format!(
            "{} {}, {}, {}, {}, {}",
            loc.street.number,
            loc.street.name,
            loc.city,
            loc.state,
            loc.country,
            loc.postcode.as_string()
        )
    }

    pub fn age(&self) -> u32 {
        self.dob.age
    }

    /// First letter of the first and last names.
    pub fn initials(&self) -> String {
        self.name
            .first
            .chars()
            .take(1)
            .chain(self.name.last.chars().take(1))
            .collect()
    }

    /// Case-insensitive substring match on full name, email, city or country.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.full_name().to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
            || self.location.city.to_lowercase().contains(needle)
            || self.location.country.to_lowercase().contains(needle)
    }
}

impl PartialEq for UserRecord {
    fn eq(&self, other: &Self) -> bool {
        self.unique_id() == other.unique_id()
    }
}

impl Eq for UserRecord {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Name {
    pub title: String,
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub street: Street,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postcode: Postcode,
    pub coordinates: Coordinates,
    pub timezone: Timezone,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Street {
    pub number: i64,
    pub name: String,
}

/// Postcodes arrive as strings for some nationalities and as bare integers
/// for others. The wire form is kept so re-encoding round-trips exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Postcode {
    Text(String),
    Number(i64),
}

impl Postcode {
    pub fn as_string(&self) -> String {
        match self {
            Postcode::Text(value) => value.clone(),
            Postcode::Number(value) => value.to_string(),
        }
    }
}

impl std::fmt::Display for Postcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Postcode::Text(value) => f.write_str(value),
            Postcode::Number(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timezone {
    pub offset: String,
    pub description: String,
}

/// Login block; the API exposes fake credential hashes which are kept only
/// so persisted bookmarks match the wire schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Login {
    pub uuid: String,
    pub username: String,
    pub password: String,
    pub salt: String,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

/// Shared shape of `dob` and `registered`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateOfBirth {
    pub date: String,
    pub age: u32,
}

/// National identifier; both halves are routinely null.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserId {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Picture {
    pub large: String,
    pub medium: String,
    pub thumbnail: String,
}

/// Row-level presentation data for a user list or bookmarks list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub full_name: String,
    pub email: String,
    pub location_text: String,
    pub avatar_url: String,
    pub initials: String,
    pub is_bookmarked: bool,
    pub unique_id: String,
}

impl UserSummary {
    pub fn new(user: &UserRecord, is_bookmarked: bool) -> Self {
        Self {
            full_name: user.display_name(),
            email: user.email.clone(),
            location_text: format!("{}, {}", user.location.city, user.location.country),
            avatar_url: user.picture.thumbnail.clone(),
            initials: user.initials(),
            is_bookmarked,
            unique_id: user.unique_id(),
        }
    }
}
