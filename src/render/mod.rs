use failure::Error;

use crate::error_analyzer::ErrorRecord;
use crate::result::FileResult;
use crate::timing_analyzer::{self, RequestTypeStats};

pub mod chart;
pub mod terminal;

/// Everything the renderers need to know about one analyzed log.
#[derive(PartialEq, Debug, Clone)]
pub struct FileReport {
    pub label: String,
    pub source: String,
    pub stats: Vec<RequestTypeStats>,
    pub errors: ErrorRecord,
}

impl FileReport {
    pub fn new(file: &FileResult) -> FileReport {
        FileReport {
            label: file.label.clone(),
            source: file.source.clone(),
            stats: timing_analyzer::analyze(&file.result),
            errors: *file.result.errors(),
        }
    }

    pub fn total_requests(&self) -> usize {
        self.stats.iter().map(|row| row.timing.count).sum()
    }

    pub fn successful_requests(&self) -> usize {
        self.total_requests()
            .saturating_sub(self.errors.total_errors())
    }

    pub fn success_rate(&self) -> f64 {
        success_rate(self.total_requests(), self.errors.total_errors())
    }

    /// Mean over all samples of the file, regardless of request type.
    pub fn mean_response_time(&self) -> Option<f64> {
        let total = self.total_requests();
        if total == 0 {
            return None;
        }

        let sum: f64 = self
            .stats
            .iter()
            .map(|row| row.timing.mean * row.timing.count as f64)
            .sum();

        Some(sum / total as f64)
    }
}

/// Percentage of requests not matched by an error, `0.0` without requests.
pub fn success_rate(total_requests: usize, total_errors: usize) -> f64 {
    if total_requests == 0 {
        return 0.0;
    }

    total_requests.saturating_sub(total_errors) as f64 / total_requests as f64 * 100.0
}

#[derive(PartialEq, Debug, Clone)]
pub struct Report {
    pub files: Vec<FileReport>,
}

impl Report {
    pub fn new(files: &[FileResult]) -> Report {
        Report {
            files: files.iter().map(FileReport::new).collect(),
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.files.len() > 1
    }

    pub fn total_requests(&self) -> usize {
        self.files.iter().map(FileReport::total_requests).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.files
            .iter()
            .map(|file| file.errors.total_errors())
            .sum()
    }

    pub fn success_rate(&self) -> f64 {
        success_rate(self.total_requests(), self.total_errors())
    }
}

pub trait Renderer {
    fn render(&mut self, report: &Report) -> Result<(), Error>;
}

#[cfg(test)]
pub mod tests {
    use crate::error_analyzer::ErrorCategory;
    use crate::log_parser;
    use super::*;

    pub fn get_file_result_fixture(label: &str) -> FileResult {
        let lines = vec![
            "loadgen/INFO/root: Warm-Up finished. Regular load profile starts",
            "loadgen/INFO/root: (GET /login) Response time 120 ms",
            "loadgen/INFO/root: (POST /cartAction) Response time 40 ms",
            "loadgen/INFO/root: (GET /login) Response time 80 ms",
            "loadgen/INFO/root: (POST /cartAction) Response time 20 ms",
            "loadgen/ERROR/root: user1: Connection refused",
        ];

        FileResult {
            source: format!("results/{}/run-1/locust.log", label),
            label: label.to_string(),
            result: log_parser::classify(lines),
        }
    }

    #[test]
    fn test_file_report() {
        let report = FileReport::new(&get_file_result_fixture("baseline"));

        assert_eq!(report.label, "baseline");
        assert_eq!(report.stats[0].request_type, "GET /login");
        assert_eq!(report.total_requests(), 4);
        assert_eq!(report.successful_requests(), 3);
        assert_eq!(report.success_rate(), 75.0);
        assert_eq!(report.mean_response_time(), Some(65.0));
        assert_eq!(report.errors.count(ErrorCategory::Connection), 1);
    }

    #[test]
    fn test_success_rate_without_requests() {
        assert_eq!(success_rate(0, 3), 0.0);
        assert_eq!(success_rate(2, 3), 0.0);
        assert_eq!(success_rate(4, 0), 100.0);
    }

    #[test]
    fn test_report_totals_across_files() {
        let report = Report::new(&[
            get_file_result_fixture("baseline"),
            get_file_result_fixture("scaling"),
        ]);

        assert!(report.is_comparison());
        assert_eq!(report.total_requests(), 8);
        assert_eq!(report.total_errors(), 2);
        assert_eq!(report.success_rate(), 75.0);
    }
}
