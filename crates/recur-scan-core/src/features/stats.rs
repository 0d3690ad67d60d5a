/// Sums in ascending order so the result does not depend on the order the
/// values arrived in.
fn ordered_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut sorted = values.collect::<Vec<f64>>();
    sorted.sort_by(f64::total_cmp);
    sorted.into_iter().sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    ordered_sum(values.iter().copied()) / (values.len() as f64)
}

/// Population standard deviation around a precomputed mean.
pub fn population_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = ordered_sum(values.iter().map(|value| (value - mean).powi(2)))
        / (values.len() as f64);
    variance.sqrt()
}

/// `numerator / denominator`, or 0 when the denominator is zero or the result
/// is not finite.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() { value } else { 0.0 }
}

pub fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64) / (total as f64)
}
