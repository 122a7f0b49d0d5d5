#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use chrono::Local;
use failure::Error;

mod args;
mod error;
mod error_analyzer;
mod log_parser;
mod multi_file;
mod percentile;
mod render;
mod response_stats;
mod result;
mod status_check;
mod timing_analyzer;

use crate::args::{AnalyzeArgs, CheckStatusArgs, Command, ResponseStatsArgs};
use crate::error::AnalyzerError;
use crate::multi_file::Source;
use crate::render::chart::SvgChartRenderer;
use crate::render::terminal::TerminalRenderer;
use crate::render::{Renderer, Report};
use crate::response_stats::Measurements;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let command = match args::parse_args(env::args()) {
        Ok(command) => command,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    let outcome = match command {
        Command::Analyze(args) => run_analyze(&args).map(|_| true),
        Command::ResponseStats(args) => run_response_stats(&args).map(|_| true),
        Command::CheckStatus(args) => Ok(run_check_status(&args)),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    }
}

/// The chart lands next to the first log unless told otherwise.
fn output_dir(args: &AnalyzeArgs) -> PathBuf {
    if let Some(ref output_dir) = args.output_dir {
        return PathBuf::from(output_dir);
    }

    args.filenames
        .first()
        .filter(|filename| *filename != "-")
        .and_then(|filename| Path::new(filename).parent())
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn run_analyze(args: &AnalyzeArgs) -> Result<(), Error> {
    let sources: Vec<Source> = args
        .filenames
        .iter()
        .map(|filename| {
            if args.label_from_dir {
                Source::with_directory_hint(filename)
            } else {
                Source::new(filename)
            }
        })
        .collect();

    for source in &sources {
        info!("Analyzing log file: {}", source.filename);
    }

    let file_results = multi_file::analyze_files(&sources)?;

    for file in &file_results {
        if file.result.has_no_data() {
            return Err(AnalyzerError::NoData {
                label: file.label.clone(),
            }
            .into());
        }
        if file.result.response_times().is_empty() {
            warn!("No response time data found for '{}'", file.label);
        }
    }

    let report = Report::new(&file_results);

    if !args.quiet {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        TerminalRenderer::new(&mut handle).render(&report)?;
    }

    if !args.no_chart {
        let output_dir = output_dir(args);
        fs::create_dir_all(&output_dir)?;
        SvgChartRenderer::new(&output_dir).render(&report)?;
    }

    Ok(())
}

fn run_response_stats(args: &ResponseStatsArgs) -> Result<(), Error> {
    let measurements = Measurements::parse(
        &args.total_times,
        &args.connect_times,
        &args.transfer_times,
    )?;

    println!("{}", response_stats::console_summary(&measurements));

    if let Some(ref report_file) = args.report_file {
        let report = response_stats::generate_report(&args.endpoint, &measurements, Local::now());

        match fs::write(report_file, report) {
            Ok(()) => println!("  Detailed report saved to: {}", report_file),
            Err(err) => warn!("Could not write report to {}: {}", report_file, err),
        }
    }

    Ok(())
}

fn run_check_status(args: &CheckStatusArgs) -> bool {
    let html = status_check::read_input(&args.input);
    let report = status_check::check_status(&html);

    println!("{}", report.message);

    if report.success {
        println!("\n✓ All TeaStore services are ready!");
    } else {
        println!("\n✗ TeaStore services are not all ready");
    }

    report.success
}
