use crate::listing::{PropertyType, TransactionType};

/// Parameters for one search a collector runs against a site.
///
/// Site implementations translate these into their own URL scheme;
/// the query itself is site-independent.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub property_type: PropertyType,
    pub transaction: TransactionType,
    pub city: String,
    pub state: String,
}

impl SearchQuery {
    pub fn new(property_type: PropertyType, transaction: TransactionType) -> Self {
        Self {
            property_type,
            transaction,
            city: "Araraquara".to_string(),
            state: "SP".to_string(),
        }
    }

    pub fn with_city(mut self, city: &str, state: &str) -> Self {
        self.city = city.to_string();
        self.state = state.to_string();
        self
    }

    /// City name formatted for URL paths ("São Carlos" -> "são-carlos").
    pub fn city_slug(&self) -> String {
        self.city.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
    }
}
