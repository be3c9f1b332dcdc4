// Collection layer: one sequential session per site, polite delays,
// bounded retries, and per-site HTML extraction rules.

pub mod collector;
pub mod olx;
pub mod output;
pub mod session;
pub mod site;
pub mod vivareal;

pub use collector::{CollectConfig, Collector};
pub use output::OutputFormat;
pub use session::{FetchConfig, Session};
pub use site::{known_sites, site_by_name, Site};
