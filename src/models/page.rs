use serde::{Deserialize, Serialize};

use super::user::UserRecord;

/// Raw body of the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub results: Vec<UserRecord>,
    pub info: PageInfo,
}

/// `info` block of the listing response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    /// Pins the ordering of every page requested with it.
    pub seed: String,
    /// Number of results the server was asked for.
    pub results: u32,
    pub page: u32,
    pub version: String,
}

/// One decoded page of users.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub users: Vec<UserRecord>,
    pub seed: String,
    pub page_number: u32,
    pub requested_count: u32,
    pub version: String,
}

impl Page {
    /// True when the server returned fewer users than `page_size`, meaning
    /// no later page exists.
    pub fn is_last(&self, page_size: u32) -> bool {
        self.users.len() < page_size as usize
    }
}

impl From<ListResponse> for Page {
    fn from(response: ListResponse) -> Self {
        Self {
            users: response.results,
            seed: response.info.seed,
            page_number: response.info.page,
            requested_count: response.info.results,
            version: response.info.version,
        }
    }
}
