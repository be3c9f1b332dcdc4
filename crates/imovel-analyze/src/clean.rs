use crate::stats;
use imovel_model::Listing;
use imovel_normalize::fields;
use serde::Serialize;
use std::collections::HashSet;

/// Per-stage accounting for one cleaning pass. The final count always
/// equals `initial - duplicates_removed - missing_price_removed -
/// outliers_removed`.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub initial: usize,
    pub duplicates_removed: usize,
    pub missing_price_removed: usize,
    pub outliers_removed: usize,
    pub final_count: usize,
    /// 1st percentile of the pre-clip price distribution.
    pub price_low: Option<f64>,
    /// 99th percentile of the pre-clip price distribution.
    pub price_high: Option<f64>,
}

/// Clean a collected dataset in four fixed stages:
///
/// 1. deduplicate by listing id, keeping the first occurrence;
/// 2. drop records with no price;
/// 3. recompute the derived price-per-area column;
/// 4. clip prices to the inclusive [P1, P99] band of the remaining
///    distribution.
///
/// The stages never reorder surviving records, and the caller's data is
/// consumed rather than mutated in place.
pub fn clean(records: Vec<Listing>) -> (Vec<Listing>, CleanReport) {
    let initial = records.len();

    // Stage 1: deduplicate by id, first occurrence wins
    let mut seen = HashSet::new();
    let mut kept: Vec<Listing> = records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    let duplicates_removed = initial - kept.len();
    tracing::info!(removed = duplicates_removed, "Deduplicated");

    // Stage 2: a record without a price cannot be analyzed
    let before = kept.len();
    kept.retain(|r| r.price.is_some());
    let missing_price_removed = before - kept.len();
    tracing::info!(removed = missing_price_removed, "Dropped records without price");

    // Stage 3: derive price per area from the coerced columns
    for record in &mut kept {
        record.price_per_area = match (record.price, record.area) {
            (Some(price), Some(area)) => fields::price_per_area(price, area),
            _ => None,
        };
    }

    // Stage 4: clip price outliers to the [P1, P99] band, inclusive
    let prices: Vec<f64> = kept.iter().filter_map(|r| r.price).collect();
    let price_low = stats::percentile(&prices, 1.0);
    let price_high = stats::percentile(&prices, 99.0);

    let before = kept.len();
    if let (Some(low), Some(high)) = (price_low, price_high) {
        kept.retain(|r| {
            // Every survivor of stage 2 has a price
            let price = r.price.unwrap_or_default();
            price >= low && price <= high
        });
    }
    let outliers_removed = before - kept.len();
    tracing::info!(
        removed = outliers_removed,
        low = ?price_low,
        high = ?price_high,
        "Clipped price outliers"
    );

    let report = CleanReport {
        initial,
        duplicates_removed,
        missing_price_removed,
        outliers_removed,
        final_count: kept.len(),
        price_low,
        price_high,
    };
    tracing::info!(
        initial = report.initial,
        final_count = report.final_count,
        "Cleaning finished"
    );

    (kept, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imovel_model::{PropertyType, TransactionType};

    fn listing(id: &str, price: Option<f64>, area: Option<f64>) -> Listing {
        Listing {
            id: id.to_string(),
            title: format!("Imóvel {id}"),
            property_type: PropertyType::House,
            transaction: TransactionType::Sale,
            price,
            area,
            price_per_area: None,
            bedrooms: None,
            bathrooms: None,
            parking_spots: None,
            address: String::new(),
            neighborhood: "Centro".to_string(),
            city: "Araraquara".to_string(),
            state: "SP".to_string(),
            description: None,
            url: format!("https://example.com/{id}"),
            source: "olx".to_string(),
            collected_at: "2026-08-30 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_deduplicate_keeps_first_occurrence() {
        // Tied prices so the clipping stage is a no-op here
        let records = vec![
            listing("a", Some(100000.0), None),
            listing("a", Some(200000.0), None),
            listing("b", Some(100000.0), None),
        ];
        let (cleaned, report) = clean(records);

        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(cleaned.len(), 2);
        let a = cleaned.iter().find(|r| r.id == "a").unwrap();
        assert_eq!(a.price, Some(100000.0));
    }

    #[test]
    fn test_missing_price_dropped() {
        let records = vec![
            listing("a", Some(100000.0), None),
            listing("b", None, Some(80.0)),
            listing("c", Some(100000.0), None),
        ];
        let (cleaned, report) = clean(records);

        assert_eq!(report.missing_price_removed, 1);
        assert_eq!(cleaned.len(), 2);
        assert!(cleaned.iter().all(|r| r.price.is_some()));
    }

    #[test]
    fn test_price_per_area_derived() {
        let records = vec![
            listing("a", Some(450000.0), Some(85.0)),
            listing("b", Some(450000.0), None),
        ];
        let (cleaned, _) = clean(records);

        assert_eq!(cleaned[0].price_per_area, Some(5294.12));
        assert_eq!(cleaned[1].price_per_area, None);
    }

    #[test]
    fn test_outlier_clipping_band_is_inclusive() {
        // Prices 0..=100: P1 = 1, P99 = 99 under linear interpolation.
        // The records sitting exactly on the boundary must survive.
        let records: Vec<Listing> = (0..=100)
            .map(|i| listing(&format!("r{i}"), Some(i as f64), None))
            .collect();
        let (cleaned, report) = clean(records);

        assert_eq!(report.price_low, Some(1.0));
        assert_eq!(report.price_high, Some(99.0));
        assert_eq!(report.outliers_removed, 2);
        let prices: Vec<f64> = cleaned.iter().filter_map(|r| r.price).collect();
        assert_eq!(stats::min(&prices), Some(1.0));
        assert_eq!(stats::max(&prices), Some(99.0));
        assert!(prices.iter().all(|p| (1.0..=99.0).contains(p)));
    }

    #[test]
    fn test_end_to_end_counts() {
        // 100 records: 5 duplicate ids, 3 without price, and a price
        // distribution built so that exactly the two extremes fall
        // outside [P1, P99] after the earlier stages. 100 - 5 - 3 - 2 = 90.
        let mut records = Vec::new();

        // 90 unique records in a tight price band
        for i in 0..90 {
            records.push(listing(
                &format!("u{i}"),
                Some(200_000.0 + (i as f64) * 1_000.0),
                None,
            ));
        }
        // One extreme low and one extreme high
        records.push(listing("low", Some(100.0), None));
        records.push(listing("high", Some(9_000_000.0), None));
        // 3 records without a price
        for i in 0..3 {
            records.push(listing(&format!("np{i}"), None, None));
        }
        // 5 duplicates of existing ids
        for i in 0..5 {
            records.push(listing(&format!("u{i}"), Some(999_999.0), None));
        }
        assert_eq!(records.len(), 100);

        let (cleaned, report) = clean(records);

        assert_eq!(report.initial, 100);
        assert_eq!(report.duplicates_removed, 5);
        assert_eq!(report.missing_price_removed, 3);
        assert_eq!(report.outliers_removed, 2);
        assert_eq!(report.final_count, 90);
        assert_eq!(cleaned.len(), 90);
        assert_eq!(
            report.final_count,
            report.initial
                - report.duplicates_removed
                - report.missing_price_removed
                - report.outliers_removed
        );
    }

    #[test]
    fn test_empty_dataset() {
        let (cleaned, report) = clean(Vec::new());
        assert!(cleaned.is_empty());
        assert_eq!(report.final_count, 0);
        assert_eq!(report.price_low, None);
    }
}
