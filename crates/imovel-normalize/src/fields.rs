// Field normalizers: pure functions from raw site text to typed values.

use imovel_model::PropertyType;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Sentinel some sites show instead of a price.
const PRICE_ON_REQUEST: &str = "sob consulta";

/// Plausible area band in m². Values outside it are almost always unit
/// confusion (hectares, lot frontage in meters) rather than real areas.
const AREA_MIN: f64 = 10.0;
const AREA_MAX: f64 = 10_000.0;

/// Upper bound for a believable price per m², in R$.
const MAX_PRICE_PER_AREA: f64 = 100_000.0;

/// Parse a Brazilian-locale price string into a number.
///
/// Handles currency symbols, thousands separators, and both comma and
/// dot decimal markers: "R$ 1.500.000,00" -> 1500000.0. The
/// "Sob consulta" sentinel and unparseable text yield `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.to_lowercase() == PRICE_ON_REQUEST {
        return None;
    }

    let re = Regex::new(r"[^\d,.]").unwrap();
    let mut cleaned = re.replace_all(trimmed, "").into_owned();

    if cleaned.contains(',') && cleaned.contains('.') {
        // Brazilian format: dot as thousands separator, comma as decimal
        // marker (e.g., "1.500.000,00")
        cleaned = cleaned.replace('.', "").replace(',', ".");
    } else if cleaned.contains(',') {
        // Comma is the decimal marker (e.g., "1500,00")
        cleaned = cleaned.replace(',', ".");
    }

    match cleaned.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!(raw = %raw, "Unparseable price text");
            None
        }
    }
}

/// Parse an area string ("85 m²", "85m2", "120,5 m²") into m².
///
/// Only values in [10, 10000] are accepted; anything outside that band
/// is treated as absent.
pub fn parse_area(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Drop the unit suffix before stripping: the digit in "85m2" would
    // otherwise survive and read as 852
    let unit = Regex::new(r"(?i)m\s*[²2]\s*$").unwrap();
    let without_unit = unit.replace(trimmed, "");

    let re = Regex::new(r"[^\d,.]").unwrap();
    let cleaned = re.replace_all(&without_unit, "").replace(',', ".");

    match cleaned.parse::<f64>() {
        Ok(area) if (AREA_MIN..=AREA_MAX).contains(&area) => Some(area),
        Ok(area) => {
            tracing::debug!(raw = %raw, area, "Area outside plausible band");
            None
        }
        Err(_) => {
            tracing::debug!(raw = %raw, "Unparseable area text");
            None
        }
    }
}

/// Extract the first run of digits from free text as an integer
/// (bedroom/bathroom/parking counts: "2 quartos" -> 2).
pub fn extract_count(raw: &str) -> Option<u32> {
    let re = Regex::new(r"\d+").unwrap();
    re.find(raw)?.as_str().parse::<u32>().ok()
}

/// Standardize a neighborhood name: NFC-normalize, title-case every
/// word, and collapse whitespace runs. Empty input stays an empty
/// string rather than becoming absent.
pub fn normalize_neighborhood(raw: &str) -> String {
    let nfc: String = raw.nfc().collect();
    nfc.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Keyword table for the property type classifier, in precedence order.
/// The first category with any substring match wins.
const CATEGORY_KEYWORDS: &[(PropertyType, &[&str])] = &[
    (
        PropertyType::Apartment,
        &["apartamento", "apto", "ap", "flat", "studio", "kitnet"],
    ),
    (PropertyType::House, &["casa", "sobrado", "moradia"]),
    (
        PropertyType::HouseInCondominium,
        &["casa em condominio", "casa condominio", "condominio"],
    ),
    (PropertyType::Land, &["terreno", "lote", "area"]),
    (
        PropertyType::Commercial,
        &["comercial", "loja", "sala", "galpao", "predio"],
    ),
    (PropertyType::Rural, &["rural", "fazenda", "sitio", "chacara"]),
];

/// Map free-text property descriptions into the closed category set.
///
/// Lowercases the input and substring-matches against an ordered keyword
/// table; the first matching category wins, `Other` if none match.
pub fn classify_property_type(raw: &str) -> PropertyType {
    let text = raw.to_lowercase();
    let text = text.trim();
    if text.is_empty() {
        return PropertyType::Other;
    }

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return *category;
        }
    }
    PropertyType::Other
}

/// Price per m², rounded to 2 decimal places.
///
/// Defined only when the area is nonzero and the ratio is plausible
/// (strictly between 0 and 100000 R$/m²).
pub fn price_per_area(price: f64, area: f64) -> Option<f64> {
    if area == 0.0 {
        return None;
    }
    let ratio = price / area;
    if ratio > 0.0 && ratio < MAX_PRICE_PER_AREA {
        Some((ratio * 100.0).round() / 100.0)
    } else {
        None
    }
}

/// Clean free text: NFC-normalize, collapse whitespace, optionally
/// truncate to `max_len` characters with an ellipsis. Used for titles
/// and descriptions.
pub fn clean_text(raw: &str, max_len: Option<usize>) -> String {
    let nfc: String = raw.nfc().collect();
    let collapsed = nfc.split_whitespace().collect::<Vec<_>>().join(" ");

    match max_len {
        Some(max) if collapsed.chars().count() > max => {
            let truncated: String = collapsed.chars().take(max).collect();
            format!("{truncated}...")
        }
        _ => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_brazilian_format() {
        assert_eq!(parse_price("R$ 1.500.000,00"), Some(1500000.0));
        assert_eq!(parse_price("1500,00"), Some(1500.0));
        // Dot without comma reads as a decimal marker
        assert_eq!(parse_price("R$ 450.000"), Some(450.0));
        assert_eq!(parse_price("R$ 2.300,50"), Some(2300.5));
    }

    #[test]
    fn test_parse_price_on_request_sentinel() {
        assert_eq!(parse_price("Sob consulta"), None);
        assert_eq!(parse_price("sob consulta"), None);
    }

    #[test]
    fn test_parse_price_malformed() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("grátis"), None);
        assert_eq!(parse_price("R$ ..,"), None);
    }

    #[test]
    fn test_parse_area() {
        assert_eq!(parse_area("85 m²"), Some(85.0));
        assert_eq!(parse_area("120,5 m²"), Some(120.5));
        assert_eq!(parse_area("85"), Some(85.0));
    }

    #[test]
    fn test_parse_area_unspaced_unit() {
        // The unit's own digit must not leak into the number
        assert_eq!(parse_area("85m2"), Some(85.0));
        assert_eq!(parse_area("65M2"), Some(65.0));
        assert_eq!(parse_area("300 m 2"), Some(300.0));
    }

    #[test]
    fn test_parse_area_plausibility_band() {
        // Below 10 m² or above 10000 m² is unit confusion, not an area
        assert_eq!(parse_area("5 m²"), None);
        assert_eq!(parse_area("50000 m²"), None);
        assert_eq!(parse_area("10 m²"), Some(10.0));
        assert_eq!(parse_area("10000 m²"), Some(10000.0));
    }

    #[test]
    fn test_extract_count() {
        assert_eq!(extract_count("2 quartos"), Some(2));
        assert_eq!(extract_count("Suíte + 3 dormitórios"), Some(3));
        assert_eq!(extract_count("sem vaga"), None);
    }

    #[test]
    fn test_normalize_neighborhood() {
        assert_eq!(normalize_neighborhood("jardim   américa"), "Jardim América");
        assert_eq!(normalize_neighborhood("  VILA XAVIER "), "Vila Xavier");
        assert_eq!(normalize_neighborhood(""), "");
    }

    #[test]
    fn test_classify_property_type() {
        assert_eq!(classify_property_type("Apartamento 2 quartos"), PropertyType::Apartment);
        assert_eq!(classify_property_type("Kitnet mobiliada"), PropertyType::Apartment);
        assert_eq!(classify_property_type("Sobrado novo"), PropertyType::House);
        assert_eq!(classify_property_type("Lote 300m"), PropertyType::Land);
        assert_eq!(classify_property_type("Galpao industrial"), PropertyType::Commercial);
        assert_eq!(classify_property_type("Chacara com pomar"), PropertyType::Rural);
        assert_eq!(classify_property_type("Cobertura duplex"), PropertyType::Other);
        assert_eq!(classify_property_type(""), PropertyType::Other);
    }

    #[test]
    fn test_classify_precedence_is_ordered() {
        // "casa em condominio" contains "casa", and house precedes
        // house-in-condominium in the table, so house wins
        assert_eq!(classify_property_type("casa em condominio"), PropertyType::House);
        // A bare "condominio" only matches the condominium category
        assert_eq!(classify_property_type("condominio fechado"), PropertyType::HouseInCondominium);
    }

    #[test]
    fn test_price_per_area() {
        assert_eq!(price_per_area(450000.0, 85.0), Some(5294.12));
        assert_eq!(price_per_area(450000.0, 0.0), None);
        assert_eq!(price_per_area(0.0, 85.0), None);
        // Ratio above the plausible ceiling
        assert_eq!(price_per_area(5_000_000.0, 10.0), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  muito   espaço \n aqui ", None), "muito espaço aqui");
        assert_eq!(clean_text("abcdef", Some(3)), "abc...");
        assert_eq!(clean_text("abc", Some(3)), "abc");
    }
}
