// Profiles: the résumé data a CV is generated from.

pub mod handlers;
pub mod store;

pub use store::{PgProfileStore, ProfileStore};
