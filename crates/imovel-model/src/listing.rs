use serde::{Deserialize, Serialize};

/// A raw listing as extracted from one advertisement card, before any
/// normalization. Every field is text exactly as it appeared on the site
/// (prices with currency symbols, areas with units, counts embedded in
/// free text). Collectors stamp `source`, `city`, `state` and
/// `collected_at` before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    pub title: Option<String>,
    /// Site-locale formatted price text (e.g., "R$ 450.000").
    pub price: Option<String>,
    /// Free-text property type (e.g., "Apartamento", "casa em condomínio").
    pub property_type: Option<String>,
    /// Area text with unit (e.g., "85 m²").
    pub area: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub parking_spots: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub collected_at: Option<String>,
}

/// A normalized listing, one row of a dataset.
///
/// `price` and `area` are numeric or absent, never malformed text.
/// `price_per_area` is derived during cleaning and present only when both
/// inputs are valid and the ratio is plausible. The `id` is a stable
/// digest of `(source, url)` used for deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub property_type: PropertyType,
    pub transaction: TransactionType,
    pub price: Option<f64>,
    pub area: Option<f64>,
    pub price_per_area: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub parking_spots: Option<u32>,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub description: Option<String>,
    pub url: String,
    pub source: String,
    /// Local timestamp of the collection run ("%Y-%m-%d %H:%M:%S").
    pub collected_at: String,
}

/// Closed category set for property types. Free text is mapped into this
/// set by the classifier in imovel-normalize; anything unrecognized
/// becomes `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "apartamento")]
    Apartment,
    #[serde(rename = "casa")]
    House,
    #[serde(rename = "casa_condominio")]
    HouseInCondominium,
    #[serde(rename = "terreno")]
    Land,
    #[serde(rename = "comercial")]
    Commercial,
    #[serde(rename = "rural")]
    Rural,
    #[serde(rename = "outro")]
    Other,
}

impl PropertyType {
    /// Canonical slug used in CSV columns and search URLs.
    pub fn slug(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartamento",
            PropertyType::House => "casa",
            PropertyType::HouseInCondominium => "casa_condominio",
            PropertyType::Land => "terreno",
            PropertyType::Commercial => "comercial",
            PropertyType::Rural => "rural",
            PropertyType::Other => "outro",
        }
    }

    /// Exact match on a canonical slug. Returns `None` for free text,
    /// which should go through the classifier instead.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim() {
            "apartamento" => Some(PropertyType::Apartment),
            "casa" => Some(PropertyType::House),
            "casa_condominio" | "casa-em-condominio" => Some(PropertyType::HouseInCondominium),
            "terreno" => Some(PropertyType::Land),
            "comercial" => Some(PropertyType::Commercial),
            "rural" => Some(PropertyType::Rural),
            "outro" => Some(PropertyType::Other),
            _ => None,
        }
    }

    /// All categories, in classifier precedence order.
    pub fn all() -> &'static [PropertyType] {
        &[
            PropertyType::Apartment,
            PropertyType::House,
            PropertyType::HouseInCondominium,
            PropertyType::Land,
            PropertyType::Commercial,
            PropertyType::Rural,
            PropertyType::Other,
        ]
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Whether the listing offers the property for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "venda")]
    Sale,
    #[serde(rename = "aluguel")]
    Rent,
}

impl TransactionType {
    pub fn slug(&self) -> &'static str {
        match self {
            TransactionType::Sale => "venda",
            TransactionType::Rent => "aluguel",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim() {
            "venda" => Some(TransactionType::Sale),
            "aluguel" => Some(TransactionType::Rent),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}
