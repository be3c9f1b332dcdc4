// Small descriptive statistics over price columns. Nothing here is
// clever; what matters is that the percentile definition stays fixed so
// cleaning is reproducible across runs.

/// Percentile (0..=100) with linear interpolation between order
/// statistics. Returns `None` for an empty slice.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    if low == high {
        return Some(sorted[low]);
    }

    let fraction = rank - low as f64;
    Some(sorted[low] + (sorted[high] - sorted[low]) * fraction)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Round to 2 decimal places, the precision used in reports.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates_linearly() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        assert_eq!(percentile(&values, 1.0), Some(1.0));
        assert_eq!(percentile(&values, 50.0), Some(50.0));
        assert_eq!(percentile(&values, 99.0), Some(99.0));

        // Four points: P25 falls between the first two order statistics
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 25.0), Some(1.75));
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(4.0));
    }

    #[test]
    fn test_percentile_unordered_input() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(percentile(&values, 50.0), Some(2.0));
    }

    #[test]
    fn test_percentile_empty() {
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }

    #[test]
    fn test_mean_min_max() {
        let values = [2.0, 4.0, 6.0];
        assert_eq!(mean(&values), Some(4.0));
        assert_eq!(min(&values), Some(2.0));
        assert_eq!(max(&values), Some(6.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sd = std_dev(&values).unwrap();
        assert!((sd - 2.138).abs() < 0.001);
        assert_eq!(std_dev(&[5.0]), Some(0.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(5294.117647), 5294.12);
        assert_eq!(round2(3.14159), 3.14);
    }
}
