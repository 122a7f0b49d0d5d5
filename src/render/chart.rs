use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};

use failure::Error;

use crate::error_analyzer::ErrorCategory;
use crate::multi_file::experiment_directory;
use crate::render::{Renderer, Report};

const WIDTH: f64 = 1200.0;
const PANEL_HEIGHT: f64 = 420.0;
const LEGEND_HEIGHT: f64 = 40.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 130.0;
const TICKS: usize = 5;

const RESPONSE_TIME_COLOR: &str = "#87ceeb";
const PALETTE: [&str; 8] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#f9ca24", "#f0932b", "#eb4d4b", "#6c5ce7", "#a29bfe",
];

/// Writes the response time and error breakdown charts as one SVG file.
pub struct SvgChartRenderer {
    output_dir: PathBuf,
    pub written: Option<PathBuf>,
}

impl SvgChartRenderer {
    pub fn new(output_dir: &Path) -> SvgChartRenderer {
        SvgChartRenderer {
            output_dir: output_dir.to_path_buf(),
            written: None,
        }
    }

    /// A single log's chart is prefixed with its experiment type,
    /// independent of the display label.
    pub fn file_name(report: &Report) -> String {
        let file = match report.files.as_slice() {
            [file] => file,
            _ => return String::from("locust_comparison_results.svg"),
        };

        match experiment_directory(&file.source) {
            Some(experiment) => format!("{}_locust_analysis_results.svg", experiment),
            None => {
                warn!("Could not determine experiment type from {}", file.source);
                String::from("locust_analysis_results.svg")
            }
        }
    }
}

impl Renderer for SvgChartRenderer {
    fn render(&mut self, report: &Report) -> Result<(), Error> {
        let path = self.output_dir.join(SvgChartRenderer::file_name(report));

        fs::write(&path, chart_svg(report))?;
        info!("Chart saved to: {}", path.display());

        self.written = Some(path);
        Ok(())
    }
}

struct Series<'a> {
    name: &'a str,
    colors: Vec<&'static str>,
    values: Vec<Option<f64>>,
    annotations: Vec<Option<String>>,
}

struct Panel<'a> {
    title: String,
    y_label: &'static str,
    empty_message: &'static str,
    categories: Vec<String>,
    series: Vec<Series<'a>>,
    format_value: fn(f64) -> String,
}

fn format_milliseconds(value: f64) -> String {
    format!("{:.1}ms", value)
}

fn format_count(value: f64) -> String {
    format!("{}", value as usize)
}

pub fn chart_svg(report: &Report) -> String {
    let comparison = report.is_comparison();

    let panels = [response_time_panel(report), error_panel(report)];
    let height = PANEL_HEIGHT * panels.len() as f64 + if comparison { LEGEND_HEIGHT } else { 0.0 };

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = WIDTH,
        h = height
    );
    let _ = writeln!(
        svg,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="white"/>"#,
        WIDTH, height
    );

    for (index, panel) in panels.iter().enumerate() {
        draw_panel(&mut svg, panel, index as f64 * PANEL_HEIGHT);
    }

    if comparison {
        draw_legend(&mut svg, report, PANEL_HEIGHT * panels.len() as f64);
    }

    svg.push_str("</svg>\n");
    svg
}

fn series_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn response_time_panel(report: &Report) -> Panel {
    let mut categories: Vec<String> = Vec::new();
    for file in &report.files {
        for row in &file.stats {
            if !categories.contains(&row.request_type) {
                categories.push(row.request_type.clone());
            }
        }
    }

    let comparison = report.is_comparison();
    let series = report
        .files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let color = if comparison {
                series_color(index)
            } else {
                RESPONSE_TIME_COLOR
            };
            let rows: Vec<_> = categories
                .iter()
                .map(|request_type| {
                    file.stats
                        .iter()
                        .find(|row| &row.request_type == request_type)
                })
                .collect();

            Series {
                name: &file.label,
                colors: vec![color; categories.len()],
                values: rows.iter().map(|row| row.map(|row| row.timing.mean)).collect(),
                annotations: rows
                    .iter()
                    .map(|row| row.map(|row| format!("{} reqs", row.timing.count)))
                    .collect(),
            }
        })
        .collect();

    Panel {
        title: format!(
            "Average Response Times per Request Type (Total Requests: {})",
            report.total_requests()
        ),
        y_label: "Average Response Time (ms)",
        empty_message: "No response time data found",
        categories,
        series,
        format_value: format_milliseconds,
    }
}

fn error_panel(report: &Report) -> Panel {
    let categories: Vec<ErrorCategory> = ErrorCategory::REPORT_ORDER
        .iter()
        .cloned()
        .filter(|category| report.files.iter().any(|file| file.errors.count(*category) > 0))
        .collect();

    let comparison = report.is_comparison();
    let series = report
        .files
        .iter()
        .enumerate()
        .map(|(index, file)| Series {
            name: &file.label,
            colors: (0..categories.len())
                .map(|category_index| {
                    if comparison {
                        series_color(index)
                    } else {
                        series_color(category_index)
                    }
                })
                .collect(),
            values: categories
                .iter()
                .map(|category| Some(file.errors.count(*category) as f64))
                .collect(),
            annotations: vec![None; categories.len()],
        })
        .collect();

    Panel {
        title: format!("Error Breakdown by Type (Total: {})", report.total_errors()),
        y_label: "Error Count",
        empty_message: "No errors found",
        categories: categories
            .iter()
            .map(|category| category.label().to_string())
            .collect(),
        series,
        format_value: format_count,
    }
}

/// Rounds up to 1, 2 or 5 times a power of ten.
fn axis_maximum(value: f64) -> f64 {
    if value <= 0.0 {
        return 1.0;
    }

    let magnitude = 10f64.powi(value.log10().floor() as i32);
    for step in &[1.0, 2.0, 5.0, 10.0] {
        if value <= step * magnitude {
            return step * magnitude;
        }
    }
    10.0 * magnitude
}

fn draw_panel(svg: &mut String, panel: &Panel, top: f64) {
    let left = MARGIN_LEFT;
    let right = WIDTH - MARGIN_RIGHT;
    let plot_top = top + MARGIN_TOP;
    let plot_bottom = top + PANEL_HEIGHT - MARGIN_BOTTOM;
    let plot_height = plot_bottom - plot_top;

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        top + 28.0,
        escape(&panel.title)
    );

    let maximum = panel
        .series
        .iter()
        .flat_map(|series| series.values.iter().filter_map(|value| *value))
        .fold(None, |max: Option<f64>, value| {
            Some(max.map_or(value, |max| max.max(value)))
        });

    let maximum = match maximum {
        Some(maximum) if !panel.categories.is_empty() => maximum,
        _ => {
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">{}</text>"#,
                WIDTH / 2.0,
                top + PANEL_HEIGHT / 2.0,
                panel.empty_message
            );
            return;
        }
    };

    let axis_max = axis_maximum(maximum * 1.1);
    let scale = |value: f64| value / axis_max * plot_height;

    for tick in 0..=TICKS {
        let value = axis_max * tick as f64 / TICKS as f64;
        let y = plot_bottom - scale(value);
        let _ = writeln!(
            svg,
            r##"<line x1="{}" y1="{y:.1}" x2="{}" y2="{y:.1}" stroke="#dddddd"/>"##,
            left,
            right,
            y = y
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="10">{}</text>"#,
            left - 6.0,
            y + 3.0,
            value
        );
    }

    let _ = writeln!(
        svg,
        r#"<text transform="translate({},{:.1}) rotate(-90)" text-anchor="middle" font-size="12">{}</text>"#,
        left - 55.0,
        plot_top + plot_height / 2.0,
        panel.y_label
    );

    let group_width = (right - left) / panel.categories.len() as f64;
    let bar_width = group_width * 0.8 / panel.series.len() as f64;

    for (category_index, category) in panel.categories.iter().enumerate() {
        let group_left = left + category_index as f64 * group_width;

        for (series_index, series) in panel.series.iter().enumerate() {
            let value = match series.values[category_index] {
                Some(value) => value,
                None => continue,
            };
            let x = group_left + group_width * 0.1 + series_index as f64 * bar_width;
            let height = scale(value);
            let y = plot_bottom - height;

            let _ = writeln!(
                svg,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="0.8"><title>{}</title></rect>"#,
                x,
                y,
                bar_width,
                height,
                series.colors[category_index],
                escape(series.name)
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="9">{}</text>"#,
                x + bar_width / 2.0,
                y - 4.0,
                (panel.format_value)(value)
            );
            if let Some(ref annotation) = series.annotations[category_index] {
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="9" font-weight="bold">{}</text>"#,
                    x + bar_width / 2.0,
                    plot_bottom - height / 2.0,
                    escape(annotation)
                );
            }
        }

        let label_x = group_left + group_width / 2.0;
        let _ = writeln!(
            svg,
            r#"<text transform="translate({:.1},{:.1}) rotate(-45)" text-anchor="end" font-size="10">{}</text>"#,
            label_x,
            plot_bottom + 14.0,
            escape(category)
        );
    }

    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black"/>"#,
        left, plot_bottom, right, plot_bottom
    );
}

fn draw_legend(svg: &mut String, report: &Report, top: f64) {
    let mut x = MARGIN_LEFT;

    for (index, file) in report.files.iter().enumerate() {
        let _ = writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="12" height="12" fill="{}"/>"#,
            x,
            top + 10.0,
            series_color(index)
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" font-size="12">{}</text>"#,
            x + 18.0,
            top + 20.0,
            escape(&file.label)
        );
        x += 30.0 + file.label.chars().count() as f64 * 7.0;
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
