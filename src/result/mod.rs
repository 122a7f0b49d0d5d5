use std::collections::HashMap;

use crate::error_analyzer::ErrorRecord;

/// Response time samples per request type. Request types keep the order in
/// which they first appeared, samples keep their arrival order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ResponseTimes {
    entries: Vec<(String, Vec<f64>)>,
    positions: HashMap<String, usize>,
}

impl ResponseTimes {
    pub fn new() -> ResponseTimes {
        ResponseTimes::default()
    }

    pub fn push(&mut self, request_type: &str, milliseconds: f64) {
        match self.positions.get(request_type) {
            Some(&position) => self.entries[position].1.push(milliseconds),
            None => {
                self.positions
                    .insert(request_type.to_string(), self.entries.len());
                self.entries
                    .push((request_type.to_string(), vec![milliseconds]));
            }
        }
    }

    pub fn get(&self, request_type: &str) -> Option<&[f64]> {
        self.positions
            .get(request_type)
            .map(|&position| self.entries[position].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entries
            .iter()
            .map(|(label, samples)| (label.as_str(), samples.as_slice()))
    }

    pub fn request_types(&self) -> usize {
        self.entries.len()
    }

    pub fn sample_count(&self) -> usize {
        self.entries.iter().map(|(_, samples)| samples.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of classifying one input stream.
#[derive(PartialEq, Debug, Clone)]
pub struct ParseResult {
    response_times: ResponseTimes,
    errors: ErrorRecord,
}

impl ParseResult {
    pub fn new(response_times: ResponseTimes, errors: ErrorRecord) -> ParseResult {
        ParseResult {
            response_times,
            errors,
        }
    }

    pub fn response_times(&self) -> &ResponseTimes {
        &self.response_times
    }

    pub fn errors(&self) -> &ErrorRecord {
        &self.errors
    }

    pub fn total_requests(&self) -> usize {
        self.response_times.sample_count()
    }

    /// Nothing usable in the stream: neither samples nor errors.
    pub fn has_no_data(&self) -> bool {
        self.response_times.is_empty() && self.errors.total_errors() == 0
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct FileResult {
    pub source: String,
    pub label: String,
    pub result: ParseResult,
}
