// Turning messy scraped text into typed listing fields.
//
// Every normalizer here is total: malformed input is logged at debug
// level and resolves to "no value", never an error. The completeness
// decision belongs to the validator, which runs once per record after
// normalization.

pub mod fields;
pub mod identity;
pub mod validate;

pub use identity::listing_id;
pub use validate::{check, RejectReason};
