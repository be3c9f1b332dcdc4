use crate::session::{FetchConfig, Session};
use crate::site::Site;
use anyhow::Result;
use imovel_model::{Listing, RawListing, SearchQuery};
use imovel_normalize::{fields, identity, validate};

/// Settings for one collection run, constructed by the CLI and passed
/// in; there is no global configuration state.
#[derive(Debug, Clone)]
pub struct CollectConfig {
    pub city: String,
    pub state: String,
    /// Pages to walk per search before stopping.
    pub max_pages: u32,
    pub fetch: FetchConfig,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            city: "Araraquara".to_string(),
            state: "SP".to_string(),
            max_pages: 10,
            fetch: FetchConfig::default(),
        }
    }
}

/// Runs searches against one site, page by page, turning raw cards into
/// validated listings.
///
/// Collection is strictly sequential and fail-soft: a page that cannot
/// be fetched after retries ends the run early, and whatever was already
/// accepted is returned untouched.
pub struct Collector {
    site: Box<dyn Site>,
    session: Session,
    config: CollectConfig,
}

impl Collector {
    pub fn new(site: Box<dyn Site>, config: CollectConfig) -> Result<Self> {
        let session = Session::new(config.fetch.clone())?;
        Ok(Self { site, session, config })
    }

    pub fn source_name(&self) -> &'static str {
        self.site.source_name()
    }

    /// Walk result pages for one search query, accumulating accepted
    /// listings. Stops at `max_pages`, on an empty page, or on a page
    /// that failed all retries.
    pub async fn collect(&self, query: &SearchQuery) -> Vec<Listing> {
        tracing::info!(
            source = self.site.source_name(),
            property_type = %query.property_type,
            transaction = %query.transaction,
            "Starting collection"
        );

        let mut accepted = Vec::new();

        for page in 1..=self.config.max_pages {
            let url = self.site.search_url(query, page);

            let html = match self.session.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!(page, error = %e, "Page fetch failed, ending collection early");
                    break;
                }
            };

            let raws = self.site.extract_listings(&html);
            if raws.is_empty() {
                tracing::info!(page, "No listings on page, ending collection");
                break;
            }

            let extracted = raws.len();
            let mut page_accepted = 0usize;
            for raw in raws {
                if let Some(listing) = self.process(raw, query) {
                    accepted.push(listing);
                    page_accepted += 1;
                }
            }
            tracing::info!(page, extracted, accepted = page_accepted, "Processed page");
        }

        tracing::info!(
            source = self.site.source_name(),
            total = accepted.len(),
            "Collection finished"
        );
        accepted
    }

    /// Normalize, identify, and validate one raw record. Returns `None`
    /// for records that fail the completeness gate.
    fn process(&self, mut raw: RawListing, query: &SearchQuery) -> Option<Listing> {
        let source = self.site.source_name();

        // Stamp collection metadata before validation
        raw.source = Some(source.to_string());
        raw.city = Some(self.config.city.clone());
        raw.state = Some(self.config.state.clone());
        raw.collected_at = Some(now_timestamp());

        let price = raw.price.as_deref().and_then(fields::parse_price);

        if let Err(reason) = validate::check(&raw, price) {
            tracing::debug!(url = ?raw.url, %reason, "Rejected listing");
            return None;
        }

        let url = raw.url.clone().unwrap_or_default();
        let id = identity::listing_id(source, &url);

        Some(Listing {
            id,
            title: fields::clean_text(raw.title.as_deref().unwrap_or_default(), Some(200)),
            property_type: fields::classify_property_type(
                raw.property_type.as_deref().unwrap_or_default(),
            ),
            transaction: query.transaction,
            price,
            area: raw.area.as_deref().and_then(fields::parse_area),
            price_per_area: None,
            bedrooms: raw.bedrooms.as_deref().and_then(fields::extract_count),
            bathrooms: raw.bathrooms.as_deref().and_then(fields::extract_count),
            parking_spots: raw.parking_spots.as_deref().and_then(fields::extract_count),
            address: fields::clean_text(raw.address.as_deref().unwrap_or_default(), None),
            neighborhood: fields::normalize_neighborhood(
                raw.neighborhood.as_deref().unwrap_or_default(),
            ),
            city: self.config.city.clone(),
            state: self.config.state.clone(),
            description: raw
                .description
                .as_deref()
                .map(|d| fields::clean_text(d, Some(500))),
            url,
            source: source.to_string(),
            collected_at: raw.collected_at.unwrap_or_default(),
        })
    }
}

fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
