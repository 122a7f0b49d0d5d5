use chrono::{DateTime, Local};

use crate::error::AnalyzerError;
use crate::timing_analyzer::{self, Statistics};

/// Three aligned series of measurements in seconds, one entry per request.
#[derive(PartialEq, Debug, Clone)]
pub struct Measurements {
    pub total: Vec<f64>,
    pub connect: Vec<f64>,
    pub transfer: Vec<f64>,
}

/// Parses `0.089,0.078, 0.085`; blank items are skipped.
pub fn parse_timings(values: &str) -> Result<Vec<f64>, AnalyzerError> {
    values
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value.parse().map_err(|_| AnalyzerError::InvalidTiming {
                value: value.to_string(),
            })
        })
        .collect()
}

impl Measurements {
    pub fn parse(total: &str, connect: &str, transfer: &str) -> Result<Measurements, AnalyzerError> {
        let measurements = Measurements {
            total: parse_timings(total)?,
            connect: parse_timings(connect)?,
            transfer: parse_timings(transfer)?,
        };

        if measurements.total.is_empty() {
            return Err(AnalyzerError::NoTimings { series: "total" });
        }

        let expected = measurements.total.len();
        for &(series, values) in &[
            ("connect", &measurements.connect),
            ("transfer", &measurements.transfer),
        ] {
            if values.len() != expected {
                return Err(AnalyzerError::MismatchedTimings {
                    series,
                    expected,
                    actual: values.len(),
                });
            }
        }

        Ok(measurements)
    }

    pub fn len(&self) -> usize {
        self.total.len()
    }
}

struct SeriesStats {
    total: Statistics,
    connect: Statistics,
    transfer: Statistics,
}

impl SeriesStats {
    fn new(measurements: &Measurements) -> Option<SeriesStats> {
        Some(SeriesStats {
            total: timing_analyzer::describe(&measurements.total)?,
            connect: timing_analyzer::describe(&measurements.connect)?,
            transfer: timing_analyzer::describe(&measurements.transfer)?,
        })
    }
}

fn ms(seconds: f64) -> f64 {
    seconds * 1000.0
}

pub fn console_summary(measurements: &Measurements) -> String {
    let stats = match SeriesStats::new(measurements) {
        Some(stats) => stats,
        None => return String::from("No measurements to analyze."),
    };

    let lines = vec![
        String::from("Response time analysis completed!"),
        format!(
            "  Average total response time: {:.2} ms (±{:.2} ms jitter)",
            ms(stats.total.mean),
            ms(stats.total.std_dev)
        ),
        format!(
            "  Average TCP connection time: {:.2} ms (±{:.2} ms jitter)",
            ms(stats.connect.mean),
            ms(stats.connect.std_dev)
        ),
        format!("  Connection consistency: {:.1}% CV", stats.connect.cv),
    ];

    lines.join("\n")
}

/// The detailed report written with `--file`.
pub fn generate_report(
    endpoint: &str,
    measurements: &Measurements,
    measured_at: DateTime<Local>,
) -> String {
    let stats = match SeriesStats::new(measurements) {
        Some(stats) => stats,
        None => return String::from("No measurements to analyze."),
    };
    let rows = [
        ("Total Response Time:", &stats.total),
        ("TCP Connection Time:", &stats.connect),
        ("Time to First Byte:", &stats.transfer),
    ];

    let mut report = vec![
        String::from("=== TeaStore Status Endpoint Response Time Analysis ==="),
        format!(
            "Measurement Date: {}",
            measured_at.format("%a %b %d %H:%M:%S %Z %Y")
        ),
        format!("Endpoint: {}", endpoint),
        format!("Number of measurements: {}", measurements.len()),
        String::new(),
        String::from("Average Response Times:"),
    ];

    for (name, stats) in &rows {
        report.push(format!(
            "  {:<24}{:.6} seconds ({:.2} ms)",
            name,
            stats.mean,
            ms(stats.mean)
        ));
    }

    report.push(String::new());
    report.push(String::from("Response Time Variations (Jitter):"));
    for (name, stats) in &rows {
        report.push(format!(
            "  {:<24}±{:.6} seconds (±{:.2} ms)",
            name,
            stats.std_dev,
            ms(stats.std_dev)
        ));
    }

    report.push(String::new());
    report.push(String::from("Min/Max Response Times:"));
    for (name, stats) in &rows {
        report.push(format!(
            "  {:<24}{:.6}s - {:.6}s ({:.2}ms - {:.2}ms)",
            name,
            stats.min,
            stats.max,
            ms(stats.min),
            ms(stats.max)
        ));
    }

    report.push(String::new());
    report.push(String::from("Individual Measurements:"));
    report.push(String::from(
        "  Measurement | Total (s) | Connect (s) | Transfer (s) | Total (ms) | Connect (ms) | Transfer (ms)",
    ));
    report.push(String::from(
        "  ------------|-----------|-------------|-------------|------------|--------------|-------------",
    ));
    for index in 0..measurements.len() {
        let total = measurements.total[index];
        let connect = measurements.connect[index];
        let transfer = measurements.transfer[index];
        report.push(format!(
            "  {:>11} | {:>9.6} | {:>11.6} | {:>11.6} | {:>10.2} | {:>12.2} | {:>11.2}",
            index + 1,
            total,
            connect,
            transfer,
            ms(total),
            ms(connect),
            ms(transfer)
        ));
    }

    report.push(String::new());
    report.push(String::from("Statistical Analysis:"));
    report.push(String::from(
        "  - Coefficient of Variation (CV) indicates consistency: lower values = more consistent",
    ));
    report.push(format!("  - Total Response CV:     {:.1}%", stats.total.cv));
    report.push(format!("  - TCP Connection CV:     {:.1}%", stats.connect.cv));
    report.push(format!("  - Transfer CV:           {:.1}%", stats.transfer.cv));

    report.push(String::new());
    report.push(String::from("Notes:"));
    report.push(String::from(
        "  - Total Response Time: Complete round-trip time including all network and HTTP processing",
    ));
    report.push(String::from(
        "  - TCP Connection Time: Pure network delay (TCP handshake time)",
    ));
    report.push(String::from(
        "  - Time to First Byte: Time until first response byte received (includes HTTP processing)",
    ));
    report.push(String::from(
        "  - Standard Deviation (±): Measures jitter/variation in response times",
    ));
    report.push(String::from(
        "  - Coefficient of Variation (CV): Standard deviation as percentage of mean (lower = more consistent)",
    ));

    report.join("\n")
}
