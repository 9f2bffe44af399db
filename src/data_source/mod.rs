//! Read-only data sources
//!
//! Name lookups list the whole collection and match exactly; the API has no
//! filter-by-name endpoint.

pub mod check;
pub mod checks;
pub mod notification_channel;
pub mod regions;

pub use check::CheckDataSource;
pub use checks::ChecksDataSource;
pub use notification_channel::NotificationChannelDataSource;
pub use regions::RegionsDataSource;
