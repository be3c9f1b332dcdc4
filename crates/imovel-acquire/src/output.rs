use anyhow::{Context, Result};
use imovel_model::Listing;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File format(s) for a collected dataset. Requesting an unknown format
/// is a configuration error and aborts the run immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Both,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "both" => Ok(OutputFormat::Both),
            other => anyhow::bail!("invalid output format '{other}' (expected csv, json, or both)"),
        }
    }
}

/// Write one collection run's dataset to the raw-data directory.
///
/// Files are named `{source}_{city}_{timestamp}` so consecutive runs
/// never clobber each other. Returns the paths written.
pub fn write_dataset(
    listings: &[Listing],
    format: OutputFormat,
    output_dir: &Path,
    source: &str,
    city: &str,
) -> Result<Vec<PathBuf>> {
    if listings.is_empty() {
        tracing::warn!(source = %source, "No records to save");
        return Ok(Vec::new());
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let city_slug = city.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-");
    let stem = format!("{source}_{city_slug}_{timestamp}");

    let mut written = Vec::new();

    if matches!(format, OutputFormat::Csv | OutputFormat::Both) {
        let path = output_dir.join(format!("{stem}.csv"));
        write_csv(listings, &path)?;
        written.push(path);
    }
    if matches!(format, OutputFormat::Json | OutputFormat::Both) {
        let path = output_dir.join(format!("{stem}.json"));
        write_json(listings, &path)?;
        written.push(path);
    }

    Ok(written)
}

pub fn write_csv(listings: &[Listing], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for listing in listings {
        writer.serialize(listing)?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), records = listings.len(), "Wrote CSV dataset");
    Ok(())
}

pub fn write_json(listings: &[Listing], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(listings)?;
    fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), records = listings.len(), "Wrote JSON dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imovel_model::{PropertyType, TransactionType};

    fn sample_listing() -> Listing {
        Listing {
            id: "abc".to_string(),
            title: "Casa no Centro".to_string(),
            property_type: PropertyType::House,
            transaction: TransactionType::Sale,
            price: Some(300000.0),
            area: Some(120.0),
            price_per_area: None,
            bedrooms: Some(3),
            bathrooms: None,
            parking_spots: Some(2),
            address: "Rua A, Centro".to_string(),
            neighborhood: "Centro".to_string(),
            city: "Araraquara".to_string(),
            state: "SP".to_string(),
            description: None,
            url: "https://example.com/1".to_string(),
            source: "olx".to_string(),
            collected_at: "2026-08-30 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("both".parse::<OutputFormat>().unwrap(), OutputFormat::Both);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_write_dataset_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let listings = vec![sample_listing()];

        let written = write_dataset(
            &listings,
            OutputFormat::Both,
            dir.path(),
            "olx",
            "Araraquara",
        )
        .unwrap();

        assert_eq!(written.len(), 2);
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names[0].starts_with("olx_araraquara_") && names[0].ends_with(".csv"));
        assert!(names[1].ends_with(".json"));

        let csv_text = std::fs::read_to_string(&written[0]).unwrap();
        assert!(csv_text.contains("casa"));
        assert!(csv_text.contains("300000"));
    }

    #[test]
    fn test_write_dataset_empty_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let written =
            write_dataset(&[], OutputFormat::Csv, dir.path(), "olx", "Araraquara").unwrap();
        assert!(written.is_empty());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
