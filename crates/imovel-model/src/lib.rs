pub mod listing;
pub mod query;

pub use listing::{Listing, PropertyType, RawListing, TransactionType};
pub use query::SearchQuery;
