// Chart rendering for a cleaned dataset. Each function writes one PNG;
// `render_all` is the entry point the CLI uses.

use anyhow::{Context, Result};
use imovel_model::{Listing, PropertyType};
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CHART_SIZE: (u32, u32) = (900, 600);
const HISTOGRAM_BINS: usize = 20;
/// Busiest neighborhoods shown in the per-neighborhood box plot.
const NEIGHBORHOOD_BOX_LIMIT: usize = 10;

/// Render the full chart set into `out_dir`. Returns the paths written;
/// charts whose input column is entirely absent are skipped with a
/// warning rather than failing the run.
pub fn render_all(listings: &[Listing], out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();
    let charts: [(&str, fn(&[Listing], &Path) -> Result<bool>); 5] = [
        ("price_histogram.png", price_histogram),
        ("price_by_type.png", price_boxplot_by_type),
        ("price_by_neighborhood.png", price_boxplot_by_neighborhood),
        ("listings_by_type.png", count_by_type),
        ("mean_price_by_type.png", mean_price_by_type),
    ];

    for (name, render) in charts {
        let path = out_dir.join(name);
        if render(listings, &path)? {
            tracing::info!(path = %path.display(), "Wrote chart");
            written.push(path);
        } else {
            tracing::warn!(chart = name, "No data for chart, skipped");
        }
    }
    Ok(written)
}

/// Distribution of listing prices. Returns false when no record has a
/// price.
pub fn price_histogram(listings: &[Listing], path: &Path) -> Result<bool> {
    let prices: Vec<f64> = listings.iter().filter_map(|l| l.price).collect();
    let (Some(min), Some(max)) = (
        prices.iter().copied().reduce(f64::min),
        prices.iter().copied().reduce(f64::max),
    ) else {
        return Ok(false);
    };

    // Degenerate single-value distribution still gets one visible bar
    let span = if max > min { max - min } else { 1.0 };
    let bin_width = span / HISTOGRAM_BINS as f64;
    let mut bins = vec![0u32; HISTOGRAM_BINS];
    for price in &prices {
        let index = (((price - min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        bins[index] += 1;
    }
    let tallest = bins.iter().copied().max().unwrap_or(1).max(1);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Distribuição de preços", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(min..min + span, 0u32..tallest + 1)?;
    chart
        .configure_mesh()
        .x_desc("Preço (R$)")
        .y_desc("Anúncios")
        .draw()?;

    chart.draw_series(bins.iter().enumerate().map(|(i, count)| {
        let x0 = min + bin_width * i as f64;
        let x1 = min + bin_width * (i + 1) as f64;
        Rectangle::new([(x0, 0), (x1, *count)], BLUE.mix(0.6).filled())
    }))?;

    root.present()?;
    Ok(true)
}

/// Box plot of prices per property type. Types with fewer than two
/// priced listings are left out.
pub fn price_boxplot_by_type(listings: &[Listing], path: &Path) -> Result<bool> {
    let mut groups: BTreeMap<&'static str, Vec<f64>> = BTreeMap::new();
    for listing in listings {
        if let Some(price) = listing.price {
            groups.entry(listing.property_type.slug()).or_default().push(price);
        }
    }
    groups.retain(|_, prices| prices.len() >= 2);
    if groups.is_empty() {
        return Ok(false);
    }

    let labels: Vec<String> = groups.keys().map(|s| s.to_string()).collect();
    let quartiles: Vec<Quartiles> = groups.values().map(|p| Quartiles::new(p)).collect();
    draw_boxplots(&labels, &quartiles, path, "Preço por tipo de imóvel", "Tipo")
}

/// Box plot of prices across the busiest neighborhoods, ranked by
/// listing count so the axis stays readable on a dense dataset.
/// Neighborhoods with fewer than two priced listings are left out.
pub fn price_boxplot_by_neighborhood(listings: &[Listing], path: &Path) -> Result<bool> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for listing in listings {
        let name = listing.neighborhood.trim();
        if name.is_empty() {
            continue;
        }
        if let Some(price) = listing.price {
            groups.entry(name).or_default().push(price);
        }
    }
    groups.retain(|_, prices| prices.len() >= 2);

    let mut ranked: Vec<(&str, Vec<f64>)> = groups.into_iter().collect();
    ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(NEIGHBORHOOD_BOX_LIMIT);
    if ranked.is_empty() {
        return Ok(false);
    }

    let labels: Vec<String> = ranked.iter().map(|(name, _)| name.to_string()).collect();
    let quartiles: Vec<Quartiles> = ranked.iter().map(|(_, p)| Quartiles::new(p)).collect();
    draw_boxplots(&labels, &quartiles, path, "Preço por bairro", "Bairro")
}

// Quartiles works in f32, so the Y axis must too.
fn draw_boxplots(
    labels: &[String],
    quartiles: &[Quartiles],
    path: &Path,
    caption: &str,
    x_desc: &str,
) -> Result<bool> {
    // Whisker ends can extend past the data maximum, so size the axis
    // from the quartile values actually drawn
    let top = quartiles
        .iter()
        .map(|q| q.values()[4])
        .fold(1f32, f32::max);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(labels.into_segmented(), 0f32..top * 1.05)?;
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Preço (R$)")
        .draw()?;

    chart.draw_series(
        labels
            .iter()
            .zip(quartiles.iter())
            .map(|(label, quartiles)| {
                Boxplot::new_vertical(SegmentValue::CenterOf(label), quartiles)
            }),
    )?;

    root.present()?;
    Ok(true)
}

/// Bar chart of listing counts per property type.
pub fn count_by_type(listings: &[Listing], path: &Path) -> Result<bool> {
    let rows = per_type(listings, |group| Some(group.len() as f64));
    draw_type_bars(
        &rows,
        path,
        "Anúncios por tipo de imóvel",
        "Anúncios",
        &GREEN.mix(0.6),
    )
}

/// Bar chart of mean price per property type.
pub fn mean_price_by_type(listings: &[Listing], path: &Path) -> Result<bool> {
    let rows = per_type(listings, |group| {
        let prices: Vec<f64> = group.iter().filter_map(|l| l.price).collect();
        crate::stats::mean(&prices)
    });
    draw_type_bars(
        &rows,
        path,
        "Preço médio por tipo de imóvel",
        "Preço médio (R$)",
        &BLUE.mix(0.6),
    )
}

fn per_type(
    listings: &[Listing],
    value: impl Fn(&[&Listing]) -> Option<f64>,
) -> Vec<(PropertyType, f64)> {
    let mut groups: BTreeMap<&'static str, Vec<&Listing>> = BTreeMap::new();
    for listing in listings {
        groups.entry(listing.property_type.slug()).or_default().push(listing);
    }

    PropertyType::all()
        .iter()
        .filter_map(|ty| {
            let group = groups.get(ty.slug())?;
            Some((*ty, value(group)?))
        })
        .collect()
}

fn draw_type_bars(
    rows: &[(PropertyType, f64)],
    path: &Path,
    caption: &str,
    y_desc: &str,
    color: &impl Color,
) -> Result<bool> {
    if rows.is_empty() {
        return Ok(false);
    }
    let top = rows
        .iter()
        .map(|(_, v)| *v)
        .reduce(f64::max)
        .unwrap_or(1.0)
        .max(1.0);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..rows.len() as f64, 0.0..top * 1.1)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len())
        .x_label_formatter(&|x| {
            rows.get(x.floor() as usize)
                .map(|(ty, _)| ty.slug().to_string())
                .unwrap_or_default()
        })
        .x_desc("Tipo")
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(rows.iter().enumerate().map(|(i, (_, value))| {
        Rectangle::new(
            [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, *value)],
            color.to_rgba().filled(),
        )
    }))?;

    root.present()?;
    Ok(true)
}
