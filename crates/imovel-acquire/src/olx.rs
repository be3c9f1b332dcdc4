use crate::site::Site;
use imovel_model::{PropertyType, RawListing, SearchQuery, TransactionType};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const BASE_URL: &str = "https://sp.olx.com.br";
/// OLX groups city listings under a regional path segment.
const REGION: &str = "araraquara-e-regiao";

/// OLX classifieds. Cards carry most details as free text, so area and
/// room counts are fished out of the title + description downstream.
pub struct Olx;

impl Site for Olx {
    fn source_name(&self) -> &'static str {
        "olx"
    }

    fn search_url(&self, query: &SearchQuery, page: u32) -> String {
        // OLX categorizes by property type; transaction is a query filter
        let category = match query.property_type {
            PropertyType::Apartment => "apartamentos",
            PropertyType::House => "casas",
            PropertyType::Land => "terrenos-sitios-e-fazendas",
            PropertyType::Commercial => "comercial",
            _ => "imoveis",
        };

        let mut url = format!("{BASE_URL}/{REGION}/{}/{category}", query.city_slug());
        if page > 1 {
            url.push_str(&format!("?o={page}"));
        }
        if query.transaction == TransactionType::Rent {
            let separator = if url.contains('?') { '&' } else { '?' };
            // sf=1 is the rental filter
            url.push_str(&format!("{separator}sf=1"));
        }
        url
    }

    fn extract_listings(&self, html: &str) -> Vec<RawListing> {
        let document = Html::parse_document(html);

        let card_sel =
            Selector::parse(r#"li[data-ds-component="DS-AdCard"]"#).expect("valid selector");
        let mut cards: Vec<ElementRef> = document.select(&card_sel).collect();

        if cards.is_empty() {
            // Older markup renders cards as bare anchors
            let alt_sel = Selector::parse(r#"a[class*="olx-ad-card"]"#).expect("valid selector");
            cards = document.select(&alt_sel).collect();
        }

        tracing::info!(cards = cards.len(), "Found OLX ad cards");

        cards.into_iter().filter_map(extract_card).collect()
    }
}

fn extract_card(card: ElementRef) -> Option<RawListing> {
    let mut raw = RawListing::default();

    raw.title = select_text(card, &["h2", r#"span[class*="title"]"#]);

    if let Some(price) = select_text(card, &[r#"span[class*="price"]"#, r#"h3[class*="price"]"#]) {
        // "Grátis" marks giveaway ads, not priced listings
        if !price.to_lowercase().contains("grátis") {
            raw.price = Some(price);
        }
    }

    if let Some(location) = select_text(card, &[r#"span[class*="location"]"#]) {
        // Location text reads "Bairro, Cidade" on most cards
        if let Some((neighborhood, _)) = location.split_once(',') {
            raw.neighborhood = Some(neighborhood.trim().to_string());
        }
        raw.address = Some(location);
    }

    raw.url = card_url(card);
    raw.description = select_text(card, &[r#"p[class*="description"]"#]);

    // Details are embedded in free text rather than structured fields
    let haystack = format!(
        "{} {}",
        raw.title.as_deref().unwrap_or_default(),
        raw.description.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    raw.area = find_fragment(&haystack, r"\d+\s*m[²2]");
    raw.bedrooms = find_fragment(&haystack, r"\d+\s*quarto");
    raw.bathrooms = find_fragment(&haystack, r"\d+\s*banheiro");
    raw.parking_spots = find_fragment(&haystack, r"\d+\s*vaga");

    // OLX has no type field; the classifier reads it from the title
    raw.property_type = raw.title.clone();

    if raw.title.is_none() && raw.price.is_none() {
        tracing::debug!("Skipping unreadable ad card");
        return None;
    }
    Some(raw)
}

/// First non-empty text content among the given selectors.
fn select_text(card: ElementRef, selectors: &[&str]) -> Option<String> {
    for sel in selectors {
        let selector = Selector::parse(sel).expect("valid selector");
        if let Some(element) = card.select(&selector).next() {
            let text = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Ad URL: the card itself when it is an anchor, otherwise the first
/// descendant link. Relative paths are resolved against the base URL.
fn card_url(card: ElementRef) -> Option<String> {
    let href = if card.value().name() == "a" {
        card.value().attr("href").map(str::to_string)
    } else {
        let a_sel = Selector::parse("a[href]").expect("valid selector");
        card.select(&a_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    }?;

    if href.starts_with("http") {
        Some(href)
    } else {
        Some(format!("{BASE_URL}{href}"))
    }
}

fn find_fragment(text: &str, pattern: &str) -> Option<String> {
    Regex::new(pattern)
        .unwrap()
        .find(text)
        .map(|m| m.as_str().to_string())
}
