use crate::site::Site;
use imovel_model::{PropertyType, RawListing, SearchQuery, TransactionType};
use scraper::{ElementRef, Html, Selector};

const BASE_URL: &str = "https://www.vivareal.com.br";

/// VivaReal portal. Unlike OLX, cards expose structured detail fields
/// (area, rooms, baths, garages), so extraction is mostly direct
/// selector lookups.
pub struct VivaReal;

impl Site for VivaReal {
    fn source_name(&self) -> &'static str {
        "vivareal"
    }

    fn search_url(&self, query: &SearchQuery, page: u32) -> String {
        let transaction = match query.transaction {
            TransactionType::Sale => "venda",
            TransactionType::Rent => "aluguel",
        };
        let category = match query.property_type {
            PropertyType::Apartment => "apartamento_residencial",
            PropertyType::House => "casa_residencial",
            PropertyType::HouseInCondominium => "condominio_residencial",
            PropertyType::Land => "lote-terreno_residencial",
            PropertyType::Commercial => "imovel-comercial_comercial",
            _ => "imovel_residencial",
        };

        let mut url = format!(
            "{BASE_URL}/{transaction}/{}/{}/{category}/",
            query.state.to_lowercase(),
            query.city_slug()
        );
        if page > 1 {
            url.push_str(&format!("?pagina={page}"));
        }
        url
    }

    fn extract_listings(&self, html: &str) -> Vec<RawListing> {
        let document = Html::parse_document(html);

        let card_sel = Selector::parse(r#"article[data-type="property"]"#).expect("valid selector");
        let cards: Vec<ElementRef> = document.select(&card_sel).collect();

        tracing::info!(cards = cards.len(), "Found VivaReal property cards");

        cards.into_iter().filter_map(extract_card).collect()
    }
}

fn extract_card(card: ElementRef) -> Option<RawListing> {
    let mut raw = RawListing::default();

    raw.title = select_text(card, "span.property-card__title");
    raw.price = select_text(card, "div.property-card__price");
    raw.area = select_text(card, "span.property-card__detail-area");
    raw.bedrooms = detail_value(card, "li.property-card__detail-room");
    raw.bathrooms = detail_value(card, "li.property-card__detail-bathroom");
    raw.parking_spots = detail_value(card, "li.property-card__detail-garage");

    if let Some(address) = select_text(card, "span.property-card__address") {
        // Address reads "Rua X, Bairro, Cidade - SP"; the neighborhood
        // is the second comma-separated part when present
        let parts: Vec<&str> = address.split(',').map(str::trim).collect();
        if parts.len() >= 2 {
            raw.neighborhood = Some(parts[1].to_string());
        }
        raw.address = Some(address);
    }

    let link_sel = Selector::parse("a.property-card__content-link").expect("valid selector");
    raw.url = card
        .select(&link_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| {
            if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{BASE_URL}{href}")
            }
        });

    // The card title carries the type ("Apartamento com 2 Quartos...")
    raw.property_type = raw.title.clone();

    if raw.title.is_none() && raw.price.is_none() {
        tracing::debug!("Skipping unreadable property card");
        return None;
    }
    Some(raw)
}

fn select_text(card: ElementRef, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).expect("valid selector");
    let text = card
        .select(&sel)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Detail items wrap their number in a value span next to an icon.
fn detail_value(card: ElementRef, item_selector: &str) -> Option<String> {
    let item_sel = Selector::parse(item_selector).expect("valid selector");
    let value_sel = Selector::parse("span.property-card__detail-value").expect("valid selector");
    let item = card.select(&item_sel).next()?;
    let text = item
        .select(&value_sel)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_sale() {
        let query = SearchQuery::new(PropertyType::Apartment, TransactionType::Sale);
        assert_eq!(
            VivaReal.search_url(&query, 1),
            "https://www.vivareal.com.br/venda/sp/araraquara/apartamento_residencial/"
        );
    }

    #[test]
    fn test_search_url_rent_paginated() {
        let query = SearchQuery::new(PropertyType::House, TransactionType::Rent);
        assert_eq!(
            VivaReal.search_url(&query, 2),
            "https://www.vivareal.com.br/aluguel/sp/araraquara/casa_residencial/?pagina=2"
        );
    }

    #[test]
    fn test_extract_listings_from_cards() {
        let html = r#"
        <html><body>
        <article data-type="property">
            <a class="property-card__content-link" href="/imovel/apartamento-2-quartos-centro-12345/"></a>
            <span class="property-card__title">Apartamento com 2 Quartos à Venda, 65m²</span>
            <span class="property-card__address">Rua Itália, Centro, Araraquara - SP</span>
            <span class="property-card__detail-area">65 m²</span>
            <ul>
                <li class="property-card__detail-room">
                    <span class="property-card__detail-value">2</span> Quartos
                </li>
                <li class="property-card__detail-bathroom">
                    <span class="property-card__detail-value">1</span> Banheiro
                </li>
                <li class="property-card__detail-garage">
                    <span class="property-card__detail-value">1</span> Vaga
                </li>
            </ul>
            <div class="property-card__price">R$ 280.000</div>
        </article>
        </body></html>
        "#;

        let listings = VivaReal.extract_listings(html);
        assert_eq!(listings.len(), 1);

        let raw = &listings[0];
        assert_eq!(raw.price.as_deref(), Some("R$ 280.000"));
        assert_eq!(raw.area.as_deref(), Some("65 m²"));
        assert_eq!(raw.bedrooms.as_deref(), Some("2"));
        assert_eq!(raw.bathrooms.as_deref(), Some("1"));
        assert_eq!(raw.parking_spots.as_deref(), Some("1"));
        assert_eq!(raw.neighborhood.as_deref(), Some("Centro"));
        assert_eq!(
            raw.url.as_deref(),
            Some("https://www.vivareal.com.br/imovel/apartamento-2-quartos-centro-12345/")
        );
    }

    #[test]
    fn test_extract_listings_empty_page() {
        assert!(VivaReal.extract_listings("<html><body></body></html>").is_empty());
    }
}
