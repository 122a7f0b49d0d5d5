use std::io;

/// Fatal conditions that abort a run.
#[derive(Debug, Fail)]
pub enum AnalyzerError {
    #[fail(display = "Log file '{}' does not exist.", path)]
    FileNotFound { path: String },

    #[fail(display = "'{}' is not a file.", path)]
    NotAFile { path: String },

    #[fail(display = "Error reading file '{}': {}", path, cause)]
    Unreadable {
        path: String,
        #[cause]
        cause: io::Error,
    },

    #[fail(
        display = "No response time data and no errors found for '{}'. Please check the log file format.",
        label
    )]
    NoData { label: String },

    #[fail(display = "Error parsing timing values: '{}' is not a number", value)]
    InvalidTiming { value: String },

    #[fail(display = "Error parsing timing values: no {} values given", series)]
    NoTimings { series: &'static str },

    #[fail(
        display = "Error parsing timing values: expected {} measurements per series, got {} {} values",
        expected, actual, series
    )]
    MismatchedTimings {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl AnalyzerError {
    pub fn unreadable(path: &str, cause: io::Error) -> AnalyzerError {
        AnalyzerError::Unreadable {
            path: path.to_string(),
            cause,
        }
    }
}
