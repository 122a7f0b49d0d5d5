use std::cmp::Ordering;

use crate::percentile::percentile;
use crate::result::ParseResult;

#[derive(PartialEq, Debug, Clone)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentile90: f64,
    /// Coefficient of variation in percent.
    pub cv: f64,
}

/// Descriptive statistics of a series; `None` for an empty one.
pub fn describe(values: &[f64]) -> Option<Statistics> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    // Sample standard deviation, the jitter of the series
    let std_dev = if count > 1 {
        let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
        (squares / (count - 1) as f64).sqrt()
    } else {
        0.0
    };

    let cv = if count > 1 && mean > 0.0 {
        std_dev / mean * 100.0
    } else {
        0.0
    };

    Some(Statistics {
        count,
        mean,
        median,
        std_dev,
        min: sorted[0],
        max: sorted[count - 1],
        percentile90: percentile(&sorted, 0.9).unwrap_or(sorted[count - 1]),
        cv,
    })
}

#[derive(PartialEq, Debug, Clone)]
pub struct RequestTypeStats {
    pub request_type: String,
    pub timing: Statistics,
}

/// One row per request type, slowest average first.
pub fn analyze(result: &ParseResult) -> Vec<RequestTypeStats> {
    let mut rows: Vec<RequestTypeStats> = result
        .response_times()
        .iter()
        .filter_map(|(request_type, samples)| {
            describe(samples).map(|timing| RequestTypeStats {
                request_type: request_type.to_string(),
                timing,
            })
        })
        .collect();

    // Stable sort, ties stay in order of first appearance
    rows.sort_by(|a, b| {
        b.timing
            .mean
            .partial_cmp(&a.timing.mean)
            .unwrap_or(Ordering::Equal)
    });

    rows
}

#[cfg(test)]
mod tests {
    use crate::error_analyzer::ErrorRecord;
    use crate::result::ResponseTimes;
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "{} is not close to {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_describe() {
        let result = describe(&[1.0, 10.0, 100.0]).unwrap();

        assert_eq!(result.count, 3);
        assert_close(result.mean, 37.0);
        assert_close(result.median, 10.0);
        assert_close(result.min, 1.0);
        assert_close(result.max, 100.0);
        assert_close(result.percentile90, 100.0);
        assert_close(result.std_dev, 54.74486277268398);
        assert_close(result.cv, 54.74486277268398 / 37.0 * 100.0);
    }

    #[test]
    fn test_describe_even_count_median() {
        let result = describe(&[4.0, 1.0, 3.0, 2.0]).unwrap();

        assert_close(result.median, 2.5);
        assert_close(result.mean, 2.5);
    }

    #[test]
    fn test_describe_single_value() {
        let result = describe(&[0.089]).unwrap();

        assert_close(result.std_dev, 0.0);
        assert_close(result.cv, 0.0);
        assert_close(result.min, 0.089);
        assert_close(result.max, 0.089);
    }

    #[test]
    fn test_describe_zero_mean_has_no_cv() {
        let result = describe(&[0.0, 0.0]).unwrap();

        assert_close(result.cv, 0.0);
    }

    #[test]
    fn test_describe_empty() {
        assert_eq!(describe(&[]), None);
    }

    #[test]
    fn test_analyze_sorts_by_mean_descending() {
        let mut response_times = ResponseTimes::new();
        response_times.push("GET /", 10.0);
        response_times.push("GET /login", 120.0);
        response_times.push("POST /cart", 10.0);
        response_times.push("GET /login", 80.0);

        let result = ParseResult::new(response_times, ErrorRecord::new());

        let rows = analyze(&result);
        let order: Vec<&str> = rows.iter().map(|row| row.request_type.as_str()).collect();

        assert_eq!(order, vec!["GET /login", "GET /", "POST /cart"]);
        assert_eq!(rows[0].timing.count, 2);
        assert_close(rows[0].timing.mean, 100.0);
    }

    #[test]
    fn test_analyze_empty() {
        let result = ParseResult::new(ResponseTimes::new(), ErrorRecord::new());

        assert!(analyze(&result).is_empty());
    }
}
