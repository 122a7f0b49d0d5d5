/// Nearest-rank percentile, `percent` in `0.0..=1.0`.
pub fn percentile(data: &[f64], percent: f64) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    let mut data_sorted = data.to_vec();
    data_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let index = (data_sorted.len() as f64 * percent - 1.0).ceil().max(0.0) as usize;

    data_sorted.get(index.min(data_sorted.len() - 1)).cloned()
}
