use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use failure::{err_msg, Error};

#[derive(PartialEq, Debug)]
pub struct AnalyzeArgs {
    pub filenames: Vec<String>,
    pub output_dir: Option<String>,
    pub label_from_dir: bool,
    pub no_chart: bool,
    pub quiet: bool,
}

#[derive(PartialEq, Debug)]
pub struct ResponseStatsArgs {
    pub total_times: String,
    pub connect_times: String,
    pub transfer_times: String,
    pub endpoint: String,
    pub report_file: Option<String>,
}

#[derive(PartialEq, Debug)]
pub struct CheckStatusArgs {
    pub input: String,
}

#[derive(PartialEq, Debug)]
pub enum Command {
    Analyze(AnalyzeArgs),
    ResponseStats(ResponseStatsArgs),
    CheckStatus(CheckStatusArgs),
}

fn build_app<'a, 'b>() -> App<'a, 'b> {
    App::new("Locust Log Analyzer")
        .author(crate_authors!())
        .version(crate_version!())
        .after_help(crate_description!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("analyze")
                .about("Response time statistics and error categories of Locust logs")
                .arg(
                    Arg::with_name("filename")
                        .index(1)
                        .value_name("FILE")
                        .required(false)
                        .multiple(true)
                        .help("Log files to analyze, defaults to stdin")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("output-dir")
                        .value_name("DIR")
                        .short("o")
                        .long("output-dir")
                        .help("Where to write the chart, defaults to the directory of the first log")
                        .takes_value(true),
                )
                .arg(Arg::with_name("label-from-dir").long("label-from-dir").help(
                    "Label each log after its experiment directory (<experiment>/<run>/locust.log)",
                ))
                .arg(
                    Arg::with_name("no-chart")
                        .long("no-chart")
                        .help("Don't write the SVG chart"),
                )
                .arg(
                    Arg::with_name("quiet")
                        .short("q")
                        .long("quiet")
                        .help("Don't output results to stdout"),
                ),
        )
        .subcommand(
            SubCommand::with_name("response-stats")
                .about("Mean, jitter and CV of measured response times")
                .arg(
                    Arg::with_name("total_times")
                        .index(1)
                        .value_name("TOTAL_TIMES")
                        .required(true)
                        .help("Comma separated total response times in seconds, e.g. '0.089,0.078'"),
                )
                .arg(
                    Arg::with_name("connect_times")
                        .index(2)
                        .value_name("CONNECT_TIMES")
                        .required(true)
                        .help("Comma separated TCP connection times in seconds"),
                )
                .arg(
                    Arg::with_name("transfer_times")
                        .index(3)
                        .value_name("TRANSFER_TIMES")
                        .required(true)
                        .help("Comma separated times to first byte in seconds"),
                )
                .arg(
                    Arg::with_name("endpoint")
                        .index(4)
                        .value_name("ENDPOINT_URL")
                        .required(true)
                        .help("The measured endpoint, e.g. 'http://1.2.3.4/status'"),
                )
                .arg(
                    Arg::with_name("file")
                        .value_name("REPORT_FILE")
                        .long("file")
                        .help("Write a detailed report to this file")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("check-status")
                .about("Checks that all TeaStore services report OK")
                .arg(
                    Arg::with_name("input")
                        .index(1)
                        .value_name("HTML_CONTENT_OR_FILE")
                        .required(true)
                        .help("Status page HTML, or a file containing it"),
                ),
        )
}

fn analyze_args(matches: &ArgMatches) -> Result<AnalyzeArgs, Error> {
    let filenames: Vec<String> = match matches.values_of("filename") {
        Some(values) => values.map(|value| value.to_string()).collect(),
        None => vec![String::from("-")],
    };

    if filenames.len() > 1 && filenames.iter().any(|filename| filename == "-") {
        return Err(err_msg("stdin (-) cannot be combined with other log files"));
    }

    Ok(AnalyzeArgs {
        filenames,
        output_dir: matches.value_of("output-dir").map(String::from),
        label_from_dir: matches.is_present("label-from-dir"),
        no_chart: matches.is_present("no-chart"),
        quiet: matches.is_present("quiet"),
    })
}

fn required(matches: &ArgMatches, name: &str) -> Result<String, Error> {
    match matches.value_of(name) {
        Some(value) => Ok(value.to_string()),
        None => Err(err_msg(format!("{} is required", name))),
    }
}

pub fn parse_args<T>(args: T) -> Result<Command, Error>
where
    T: IntoIterator<Item = String>,
{
    let app = build_app().get_matches_from(args);

    match app.subcommand() {
        ("analyze", Some(matches)) => Ok(Command::Analyze(analyze_args(matches)?)),
        ("response-stats", Some(matches)) => Ok(Command::ResponseStats(ResponseStatsArgs {
            total_times: required(matches, "total_times")?,
            connect_times: required(matches, "connect_times")?,
            transfer_times: required(matches, "transfer_times")?,
            endpoint: required(matches, "endpoint")?,
            report_file: matches.value_of("file").map(String::from),
        })),
        ("check-status", Some(matches)) => Ok(Command::CheckStatus(CheckStatusArgs {
            input: required(matches, "input")?,
        })),
        (name, _) => Err(err_msg(format!("Unknown subcommand '{}'", name))),
    }
}
