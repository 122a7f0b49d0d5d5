use std::io::prelude::*;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, TableComponent};
use failure::Error;

use crate::error_analyzer::{ErrorCategory, ErrorGroup};
use crate::render::{FileReport, Renderer, Report};

const RULER: &str = "============================================================";

pub struct TerminalRenderer<'a> {
    stream: &'a mut dyn Write,
}

impl<'a> TerminalRenderer<'a> {
    pub fn new(stream: &'a mut dyn Write) -> TerminalRenderer<'a> {
        TerminalRenderer { stream }
    }

    fn render_file(&mut self, file: &FileReport) -> Result<(), Error> {
        writeln!(self.stream)?;
        writeln!(self.stream, "{}", RULER)?;
        writeln!(self.stream, "LOCUST LOG ANALYSIS SUMMARY: {}", file.label)?;
        writeln!(self.stream, "{}", RULER)?;

        let total_requests = file.total_requests();

        if file.stats.is_empty() {
            writeln!(self.stream, "\nNo response time data found in the log file.")?;
        } else {
            writeln!(
                self.stream,
                "\nFound {} different request types:",
                file.stats.len()
            )?;
            writeln!(
                self.stream,
                "Total Requests Processed: {}",
                thousands(total_requests)
            )?;
            writeln!(self.stream, "\nResponse Time Statistics:")?;
            self.render_stats_table(file)?;

            writeln!(self.stream, "\nTop 3 slowest request types:")?;
            for (index, row) in file.stats.iter().take(3).enumerate() {
                writeln!(
                    self.stream,
                    "  {}. {}: {:.2}ms (Count: {})",
                    index + 1,
                    row.request_type,
                    row.timing.mean,
                    row.timing.count
                )?;
            }
        }

        let total_errors = file.errors.total_errors();

        writeln!(self.stream, "\nRequest Completion Statistics:")?;
        if !file.stats.is_empty() {
            writeln!(self.stream, "  Total Requests: {}", thousands(total_requests))?;
            writeln!(
                self.stream,
                "  Successful Requests: {} ({:.1}%)",
                thousands(file.successful_requests()),
                file.success_rate()
            )?;
        }
        writeln!(self.stream, "  Total Errors: {}", total_errors)?;

        if total_errors == 0 {
            writeln!(self.stream, "\nNo errors found in the log file.")?;
            return Ok(());
        }

        for &(group, title) in &[
            (ErrorGroup::HttpStatus, "HTTP Status Code Errors"),
            (ErrorGroup::Functional, "Functional Errors"),
            (ErrorGroup::Other, "Other Errors"),
        ] {
            let group_total = file.errors.total_in_group(group);
            if group_total == 0 {
                continue;
            }

            writeln!(
                self.stream,
                "\n  {}: {} ({:.1}%)",
                title,
                group_total,
                group_total as f64 / total_errors as f64 * 100.0
            )?;

            for (category, count) in file.errors.non_zero() {
                if category.group() == group {
                    writeln!(self.stream, "    - {}: {}", category.label(), count)?;
                }
            }
        }

        writeln!(
            self.stream,
            "\nThere were errors during the load test. Check the error messages above."
        )?;

        Ok(())
    }

    fn render_stats_table(&mut self, file: &FileReport) -> Result<(), Error> {
        let mut table = new_table(&[
            "Request Type",
            "Avg (ms)",
            "Median",
            "Min",
            "Max",
            "Std Dev",
            "P90",
            "Count",
        ]);

        for row in &file.stats {
            let timing = &row.timing;
            table.add_row(vec![
                Cell::new(&row.request_type),
                number(format!("{:.2}", timing.mean)),
                number(format!("{:.2}", timing.median)),
                number(format!("{:.2}", timing.min)),
                number(format!("{:.2}", timing.max)),
                number(format!("{:.2}", timing.std_dev)),
                number(format!("{:.2}", timing.percentile90)),
                number(timing.count.to_string()),
            ]);
        }

        writeln!(self.stream, "{}", table)?;

        Ok(())
    }

    fn render_comparison(&mut self, report: &Report) -> Result<(), Error> {
        writeln!(self.stream)?;
        writeln!(self.stream, "{}", RULER)?;
        writeln!(self.stream, "COMPARISON ACROSS {} LOG FILES", report.files.len())?;
        writeln!(self.stream, "{}", RULER)?;

        let mut table = new_table(&["Label", "Requests", "Errors", "Success", "Avg Time (ms)"]);

        for file in &report.files {
            let mean = match file.mean_response_time() {
                Some(mean) => format!("{:.2}", mean),
                None => String::from("-"),
            };

            table.add_row(vec![
                Cell::new(&file.label),
                number(thousands(file.total_requests())),
                number(file.errors.total_errors().to_string()),
                number(format!("{:.1}%", file.success_rate())),
                number(mean),
            ]);
        }

        table.add_row(vec![
            Cell::new("Combined"),
            number(thousands(report.total_requests())),
            number(report.total_errors().to_string()),
            number(format!("{:.1}%", report.success_rate())),
            Cell::new(""),
        ]);

        writeln!(self.stream, "{}", table)?;

        let mut categories: Vec<ErrorCategory> = Vec::new();
        for file in &report.files {
            for (category, _) in file.errors.non_zero() {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }

        if categories.is_empty() {
            return Ok(());
        }

        writeln!(self.stream, "\nErrors by type:")?;
        for category in ErrorCategory::REPORT_ORDER.iter() {
            if !categories.contains(category) {
                continue;
            }

            let counts: Vec<String> = report
                .files
                .iter()
                .map(|file| format!("{}={}", file.label, file.errors.count(*category)))
                .collect();
            writeln!(self.stream, "  {}: {}", category.label(), counts.join(", "))?;
        }

        Ok(())
    }
}

impl<'a> Renderer for TerminalRenderer<'a> {
    fn render(&mut self, report: &Report) -> Result<(), Error> {
        for file in &report.files {
            self.render_file(file)?;
        }

        if report.is_comparison() {
            self.render_comparison(report)?;
        }

        Ok(())
    }
}

/// Compact bordered table without row separators.
fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();

    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Disabled)
        .remove_style(TableComponent::HorizontalLines)
        .remove_style(TableComponent::LeftBorderIntersections)
        .remove_style(TableComponent::RightBorderIntersections)
        .remove_style(TableComponent::MiddleIntersections)
        .set_header(header.iter().map(|title| Cell::new(title)));

    table
}

fn number(value: String) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// `1234567` becomes `1,234,567`.
fn thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::new();

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::str;

    use crate::render::tests::get_file_result_fixture;
    use super::*;

    struct MockWrite {
        write_calls: Vec<String>,
    }

    impl Write for MockWrite {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.write_calls
                .push(str::from_utf8(buf).unwrap().to_string());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl MockWrite {
        fn output(&self) -> String {
            self.write_calls.concat()
        }
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_terminal_renderer() {
        let mut mock_write = MockWrite {
            write_calls: vec![],
        };

        {
            let mut renderer = TerminalRenderer::new(&mut mock_write);
            let report = Report::new(&[get_file_result_fixture("baseline")]);
            renderer.render(&report).unwrap();
        }

        let output = mock_write.output();
        assert!(output.contains("LOCUST LOG ANALYSIS SUMMARY: baseline\n"));
        assert!(output.contains("Found 2 different request types:\n"));
        assert!(output.contains("Total Requests Processed: 4\n"));
        assert!(output.contains("  1. GET /login: 100.00ms (Count: 2)\n"));
        assert!(output.contains("  2. POST /cartAction: 30.00ms (Count: 2)\n"));
        assert!(output.contains("  Successful Requests: 3 (75.0%)\n"));
        assert!(output.contains("  Total Errors: 1\n"));
        assert!(output.contains("\n  Other Errors: 1 (100.0%)\n"));
        assert!(output.contains("    - Connection Errors: 1\n"));
        assert!(!output.contains("HTTP Status Code Errors"));
        assert!(!output.contains("COMPARISON"));
    }

    fn table_lines(output: &str) -> Vec<&str> {
        output
            .lines()
            .filter(|line| line.starts_with(|c| "╭│╞╰".contains(c)))
            .collect()
    }

    fn cells(line: &str) -> Vec<&str> {
        line.trim_matches('│').split('┆').map(str::trim).collect()
    }

    #[test]
    fn test_terminal_renderer_stats_table() {
        let mut mock_write = MockWrite {
            write_calls: vec![],
        };

        {
            let mut renderer = TerminalRenderer::new(&mut mock_write);
            let report = Report::new(&[get_file_result_fixture("baseline")]);
            renderer.render(&report).unwrap();
        }

        let output = mock_write.output();
        let rows: Vec<Vec<&str>> = table_lines(&output)
            .into_iter()
            .filter(|line| line.starts_with('│'))
            .map(cells)
            .collect();

        assert_eq!(
            rows,
            vec![
                vec!["Request Type", "Avg (ms)", "Median", "Min", "Max", "Std Dev", "P90", "Count"],
                vec!["GET /login", "100.00", "100.00", "80.00", "120.00", "28.28", "120.00", "2"],
                vec!["POST /cartAction", "30.00", "30.00", "20.00", "40.00", "14.14", "40.00", "2"],
            ]
        );
    }

    #[test]
    fn test_terminal_renderer_aligns_non_ascii_request_types() {
        let mut mock_write = MockWrite {
            write_calls: vec![],
        };

        {
            let mut renderer = TerminalRenderer::new(&mut mock_write);
            let report = Report::new(&[crate::result::FileResult {
                source: String::from("käse.log"),
                label: String::from("käse"),
                result: crate::log_parser::classify(vec![
                    "loadgen/INFO/root: Warm-Up finished. Regular load profile starts",
                    "loadgen/INFO/root: (GET /käse/größe) Response time 12 ms",
                    "loadgen/INFO/root: (GET /a) Response time 3 ms",
                ]),
            }]);
            renderer.render(&report).unwrap();
        }

        let output = mock_write.output();
        let lines = table_lines(&output);

        assert_eq!(lines.len(), 6);
        assert!(lines.iter().any(|line| line.contains("GET /käse/größe")));
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|line| line.chars().count() == width));
    }

    #[test]
    fn test_terminal_renderer_no_lines() {
        let mut mock_write = MockWrite {
            write_calls: vec![],
        };

        {
            let mut renderer = TerminalRenderer::new(&mut mock_write);
            let report = Report::new(&[crate::result::FileResult {
                source: String::from("empty.log"),
                label: String::from("empty"),
                result: crate::log_parser::classify(Vec::<String>::new()),
            }]);
            renderer.render(&report).unwrap();
        }

        let output = mock_write.output();
        assert!(output.contains("No response time data found in the log file."));
        assert!(output.contains("  Total Errors: 0\n"));
        assert!(output.contains("No errors found in the log file."));
        assert!(!output.contains("Successful Requests"));
    }

    #[test]
    fn test_terminal_renderer_comparison() {
        let mut mock_write = MockWrite {
            write_calls: vec![],
        };

        {
            let mut renderer = TerminalRenderer::new(&mut mock_write);
            let report = Report::new(&[
                get_file_result_fixture("baseline"),
                get_file_result_fixture("scaling"),
            ]);
            renderer.render(&report).unwrap();
        }

        let output = mock_write.output();
        assert!(output.contains("COMPARISON ACROSS 2 LOG FILES"));
        assert!(output.find("SUMMARY: baseline").unwrap() < output.find("SUMMARY: scaling").unwrap());
        let combined = output
            .lines()
            .find(|line| line.contains("Combined"))
            .unwrap();
        let cells: Vec<&str> = combined
            .trim_matches('│')
            .split('┆')
            .map(str::trim)
            .collect();
        assert_eq!(cells, vec!["Combined", "8", "2", "75.0%", ""]);
        assert!(output.contains("  Connection Errors: baseline=1, scaling=1\n"));
    }
}
