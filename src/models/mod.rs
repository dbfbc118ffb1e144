//! Wire and domain types for the user directory.

mod page;
mod user;

pub use page::{ListResponse, Page, PageInfo};
pub use user::{
    Coordinates, DateOfBirth, Location, Login, Name, Picture, Postcode, Street, Timezone,
    UserId, UserRecord, UserSummary,
};
