use imovel_model::{RawListing, SearchQuery};

/// Site-specific extraction rules, one implementation per classifieds
/// site. The collection loop itself is site-independent; implementations
/// only know how to build search URLs and pull raw records out of a
/// result page.
pub trait Site: Send + Sync {
    /// Short source name used for identifiers and file names ("olx").
    fn source_name(&self) -> &'static str;

    /// Build the search URL for one page of results.
    fn search_url(&self, query: &SearchQuery, page: u32) -> String;

    /// Extract raw listings from a result page. A card that cannot be
    /// read is skipped; its siblings are still processed.
    fn extract_listings(&self, html: &str) -> Vec<RawListing>;
}

/// Dispatch table from site name to implementation.
pub fn site_by_name(name: &str) -> Option<Box<dyn Site>> {
    match name {
        "olx" => Some(Box::new(crate::olx::Olx)),
        "vivareal" => Some(Box::new(crate::vivareal::VivaReal)),
        _ => None,
    }
}

/// Names accepted by [`site_by_name`], in default collection order.
pub fn known_sites() -> &'static [&'static str] {
    &["vivareal", "olx"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_table_covers_known_sites() {
        for name in known_sites() {
            let site = site_by_name(name).expect("known site must dispatch");
            assert_eq!(site.source_name(), *name);
        }
        assert!(site_by_name("zapimoveis").is_none());
    }
}
