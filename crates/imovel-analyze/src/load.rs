use anyhow::{Context, Result};
use imovel_model::{Listing, PropertyType, TransactionType};
use imovel_normalize::fields;
use imovel_normalize::listing_id;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One CSV row, read permissively. Datasets written by the collector have
/// numeric columns and canonical slugs, but hand-assembled files carry
/// locale-formatted text ("R$ 450.000", "85 m²"); every field comes in as
/// text and is coerced afterwards.
#[derive(Debug, Default, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    property_type: Option<String>,
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    price_per_area: Option<String>,
    #[serde(default)]
    bedrooms: Option<String>,
    #[serde(default)]
    bathrooms: Option<String>,
    #[serde(default)]
    parking_spots: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    neighborhood: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    collected_at: Option<String>,
}

impl CsvRow {
    fn into_listing(self) -> Listing {
        let source = non_blank(self.source).unwrap_or_default();
        let url = non_blank(self.url).unwrap_or_default();

        // Rows from the collector carry a digest already; rows assembled
        // by hand get one derived from the same identity rule.
        let id = non_blank(self.id).unwrap_or_else(|| listing_id(&source, &url));

        let property_type = self
            .property_type
            .as_deref()
            .map(|text| {
                PropertyType::from_slug(text).unwrap_or_else(|| fields::classify_property_type(text))
            })
            .unwrap_or(PropertyType::Other);
        let transaction = self
            .transaction
            .as_deref()
            .and_then(TransactionType::from_slug)
            .unwrap_or(TransactionType::Sale);

        Listing {
            id,
            title: non_blank(self.title).unwrap_or_default(),
            property_type,
            transaction,
            price: coerce_f64(self.price.as_deref(), fields::parse_price),
            area: coerce_f64(self.area.as_deref(), fields::parse_area),
            price_per_area: self
                .price_per_area
                .as_deref()
                .and_then(|text| text.trim().parse::<f64>().ok()),
            bedrooms: coerce_count(self.bedrooms.as_deref()),
            bathrooms: coerce_count(self.bathrooms.as_deref()),
            parking_spots: coerce_count(self.parking_spots.as_deref()),
            address: non_blank(self.address).unwrap_or_default(),
            neighborhood: non_blank(self.neighborhood).unwrap_or_default(),
            city: non_blank(self.city).unwrap_or_default(),
            state: non_blank(self.state).unwrap_or_default(),
            description: non_blank(self.description),
            url,
            source,
            collected_at: non_blank(self.collected_at).unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Plain numeric text passes through; anything else goes to the locale
/// parser. The dot-only ambiguity ("450.000") only arises for text that
/// failed the plain parse, so round-tripping our own files is lossless.
fn coerce_f64(text: Option<&str>, parser: fn(&str) -> Option<f64>) -> Option<f64> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().or_else(|| parser(text))
}

fn coerce_count(text: Option<&str>) -> Option<u32> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<u32>().ok().or_else(|| fields::extract_count(text))
}

/// Read a dataset CSV into normalized listings.
pub fn read_csv(path: &Path) -> Result<Vec<Listing>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut listings = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.with_context(|| {
            format!("Malformed record {} in {}", index + 1, path.display())
        })?;
        listings.push(row.into_listing());
    }

    tracing::info!(path = %path.display(), records = listings.len(), "Loaded dataset");
    Ok(listings)
}

/// Most recently modified `.csv` under `dir`. Collection runs stamp their
/// filenames, so this is the natural "analyze the latest run" default.
pub fn most_recent_csv(dir: &Path) -> Result<PathBuf> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().map_or(true, |(when, _)| modified > *when) {
            newest = Some((modified, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .with_context(|| format!("No CSV datasets found in {}", dir.display()))
}
