use crate::stats;
use anyhow::{Context, Result};
use imovel_model::Listing;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Price aggregates for one neighborhood. All monetary values are
/// rounded to 2 decimal places.
#[derive(Debug, Clone, Serialize)]
pub struct NeighborhoodStats {
    pub neighborhood: String,
    pub listings: usize,
    pub mean_price: f64,
    pub median_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// max / min price ratio; absent when the minimum is zero.
    pub price_amplitude: Option<f64>,
    pub mean_area: Option<f64>,
    pub mean_price_per_area: Option<f64>,
}

/// Dataset-wide aggregates reported after cleaning.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub std_dev_price: Option<f64>,
    pub mean_area: Option<f64>,
    pub mean_price_per_area: Option<f64>,
    /// Listing counts per property type slug.
    pub by_property_type: BTreeMap<String, usize>,
}

/// Aggregate per-neighborhood price statistics.
///
/// Records without a neighborhood are left out of the grouping; the
/// result is ordered by listing count descending, then by name so ties
/// are stable.
pub fn neighborhood_stats(listings: &[Listing]) -> Vec<NeighborhoodStats> {
    let mut groups: BTreeMap<&str, Vec<&Listing>> = BTreeMap::new();
    for listing in listings {
        let name = listing.neighborhood.trim();
        if name.is_empty() {
            continue;
        }
        groups.entry(name).or_default().push(listing);
    }

    let mut rows: Vec<NeighborhoodStats> = groups
        .into_iter()
        .filter_map(|(name, group)| {
            let prices: Vec<f64> = group.iter().filter_map(|l| l.price).collect();
            if prices.is_empty() {
                return None;
            }
            let areas: Vec<f64> = group.iter().filter_map(|l| l.area).collect();
            let ratios: Vec<f64> = group.iter().filter_map(|l| l.price_per_area).collect();

            let min_price = stats::min(&prices)?;
            let max_price = stats::max(&prices)?;
            let price_amplitude = if min_price > 0.0 {
                Some(stats::round2(max_price / min_price))
            } else {
                None
            };

            Some(NeighborhoodStats {
                neighborhood: name.to_string(),
                listings: group.len(),
                mean_price: stats::round2(stats::mean(&prices)?),
                median_price: stats::round2(stats::median(&prices)?),
                min_price,
                max_price,
                price_amplitude,
                mean_area: stats::mean(&areas).map(stats::round2),
                mean_price_per_area: stats::mean(&ratios).map(stats::round2),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.listings
            .cmp(&a.listings)
            .then_with(|| a.neighborhood.cmp(&b.neighborhood))
    });
    rows
}

/// Write the neighborhood aggregate table as CSV.
pub fn write_neighborhood_csv(rows: &[NeighborhoodStats], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), neighborhoods = rows.len(), "Wrote neighborhood aggregates");
    Ok(())
}

/// Summarize a cleaned dataset and log the headline numbers.
pub fn summarize(listings: &[Listing]) -> Summary {
    let prices: Vec<f64> = listings.iter().filter_map(|l| l.price).collect();
    let areas: Vec<f64> = listings.iter().filter_map(|l| l.area).collect();
    let ratios: Vec<f64> = listings.iter().filter_map(|l| l.price_per_area).collect();

    let mut by_property_type = BTreeMap::new();
    for listing in listings {
        *by_property_type
            .entry(listing.property_type.slug().to_string())
            .or_insert(0) += 1;
    }

    let summary = Summary {
        total: listings.len(),
        mean_price: stats::mean(&prices).map(stats::round2),
        median_price: stats::median(&prices).map(stats::round2),
        min_price: stats::min(&prices),
        max_price: stats::max(&prices),
        std_dev_price: stats::std_dev(&prices).map(stats::round2),
        mean_area: stats::mean(&areas).map(stats::round2),
        mean_price_per_area: stats::mean(&ratios).map(stats::round2),
        by_property_type,
    };

    tracing::info!(
        total = summary.total,
        mean_price = ?summary.mean_price,
        median_price = ?summary.median_price,
        "Dataset summary"
    );
    summary
}
