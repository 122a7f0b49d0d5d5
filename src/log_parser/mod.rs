use std::fs::{self, File};
use std::io::{self, BufRead};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::AnalyzerError;
use crate::error_analyzer::{self, ErrorRecord};
use crate::result::{ParseResult, ResponseTimes};

pub mod log_events;
use self::log_events::*;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
enum State {
    BeforeWarmup,
    Collecting,
}

/// Single pass line classifier. Everything before the warm-up marker is
/// discarded; afterwards each line is a response time sample, a categorized
/// error, or noise.
pub struct Classifier {
    state: State,
    response_times: ResponseTimes,
    errors: ErrorRecord,
}

impl Classifier {
    pub fn new() -> Classifier {
        Classifier {
            state: State::BeforeWarmup,
            response_times: ResponseTimes::new(),
            errors: ErrorRecord::new(),
        }
    }

    pub fn add(&mut self, log_line: &str) {
        if self.state == State::BeforeWarmup {
            if is_warmup_finished(log_line) {
                debug!("Warm-up finished, collecting from here on");
                self.state = State::Collecting;
            }
            return;
        }

        match LogEvent::new_from_log_line(log_line) {
            Some(LogEvent::ResponseTime {
                request_type,
                milliseconds,
            }) => self.response_times.push(request_type, milliseconds),
            Some(LogEvent::Error { user, message }) => {
                let category = error_analyzer::categorize(message);
                trace!("{:?} error for {}: {}", category, user, message);
                self.errors.add(category);
            }
            None => trace!("Skipped a line: {}", log_line),
        }
    }

    pub fn result(self) -> ParseResult {
        if self.state == State::BeforeWarmup {
            warn!("No warm-up marker found, all lines were discarded");
        }

        ParseResult::new(self.response_times, self.errors)
    }
}

pub fn classify<I, S>(lines: I) -> ParseResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut classifier = Classifier::new();

    for line in lines {
        classifier.add(line.as_ref());
    }

    classifier.result()
}

/// Fails on the first line that cannot be read or decoded, without a
/// partial result.
pub fn parse(reader: &mut dyn io::Read) -> Result<ParseResult, io::Error> {
    let input = io::BufReader::new(reader);
    let mut classifier = Classifier::new();

    for line in input.lines() {
        classifier.add(&line?);
    }

    Ok(classifier.result())
}

/// Opens a log file for reading; `-` is stdin, `.gz` files are decompressed
/// on the fly.
pub fn open_logfile(filename: &str) -> Result<Box<dyn io::Read>, AnalyzerError> {
    if filename == "-" {
        return Ok(Box::new(io::stdin()));
    }

    let metadata = match fs::metadata(filename) {
        Ok(metadata) => metadata,
        Err(ref err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(AnalyzerError::FileNotFound {
                path: filename.to_string(),
            })
        }
        Err(err) => return Err(AnalyzerError::unreadable(filename, err)),
    };

    if !metadata.is_file() {
        return Err(AnalyzerError::NotAFile {
            path: filename.to_string(),
        });
    }

    let file = File::open(filename).map_err(|err| AnalyzerError::unreadable(filename, err))?;

    let is_gzip = Path::new(filename)
        .extension()
        .map_or(false, |extension| extension == "gz");

    if is_gzip {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

pub fn parse_file(filename: &str) -> Result<ParseResult, AnalyzerError> {
    let mut input = open_logfile(filename)?;

    parse(&mut input).map_err(|err| AnalyzerError::unreadable(filename, err))
}
