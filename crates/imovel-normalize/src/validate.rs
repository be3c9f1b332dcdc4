use imovel_model::RawListing;
use thiserror::Error;

/// Why a scraped record was refused entry into the dataset.
///
/// Rejection is an expected filtering outcome, not a failure: callers log
/// it at debug level and move on to the next record.
#[derive(Debug, Error, PartialEq)]
pub enum RejectReason {
    #[error("missing or unparseable price")]
    MissingPrice,

    #[error("missing property type")]
    MissingPropertyType,

    #[error("missing city")]
    MissingCity,

    #[error("non-positive price: {0}")]
    NonPositivePrice(f64),
}

/// Minimum completeness gate, run per record right after extraction and
/// normalization and before accumulation.
///
/// `price` is the already-normalized value for the record's price text.
/// The record must carry a positive price, a property type, and a city.
pub fn check(raw: &RawListing, price: Option<f64>) -> Result<(), RejectReason> {
    let price = price.ok_or(RejectReason::MissingPrice)?;

    if is_blank(&raw.property_type) {
        return Err(RejectReason::MissingPropertyType);
    }
    if is_blank(&raw.city) {
        return Err(RejectReason::MissingCity);
    }
    if price <= 0.0 {
        return Err(RejectReason::NonPositivePrice(price));
    }

    Ok(())
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> RawListing {
        RawListing {
            title: Some("Casa no Centro".to_string()),
            price: Some("R$ 300.000,00".to_string()),
            property_type: Some("casa".to_string()),
            city: Some("Araraquara".to_string()),
            url: Some("https://example.com/1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_record_passes() {
        let raw = sample_raw();
        assert_eq!(check(&raw, Some(300000.0)), Ok(()));
    }

    #[test]
    fn test_missing_price_rejected() {
        let raw = sample_raw();
        assert_eq!(check(&raw, None), Err(RejectReason::MissingPrice));
    }

    #[test]
    fn test_missing_property_type_rejected() {
        let mut raw = sample_raw();
        raw.property_type = Some("  ".to_string());
        assert_eq!(check(&raw, Some(300000.0)), Err(RejectReason::MissingPropertyType));
    }

    #[test]
    fn test_missing_city_rejected() {
        let mut raw = sample_raw();
        raw.city = None;
        assert_eq!(check(&raw, Some(300000.0)), Err(RejectReason::MissingCity));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let raw = sample_raw();
        assert_eq!(check(&raw, Some(0.0)), Err(RejectReason::NonPositivePrice(0.0)));
        assert_eq!(check(&raw, Some(-1.0)), Err(RejectReason::NonPositivePrice(-1.0)));
    }
}
