use once_cell::sync::Lazy;
use regex::Regex;

static WARMUP_FINISHED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Warm-Up finished.*Regular load profile starts")
        .expect("Failed to compile warm-up marker regex")
});

// e.g. "[2024-05-02 10:00:01,123] host/INFO/root: (GET /login) Response time 120 ms"
static RESPONSE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/INFO/root:\s+\(([A-Z]+\s+[\w/.\-]+)\)\s+Response\s+time\s+(\d+)\s+ms")
        .expect("Failed to compile response time regex")
});

// e.g. "[2024-05-02 10:00:01,123] host/ERROR/root: user12: Connection refused"
static ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ERROR/root: (user\d+): (.*)$").expect("Failed to compile error line regex")
});

pub fn is_warmup_finished(log_line: &str) -> bool {
    WARMUP_FINISHED.is_match(log_line)
}

/// One of the two line shapes we care about once the warm-up is over.
#[derive(PartialEq, Clone, Debug)]
pub enum LogEvent<'a> {
    ResponseTime {
        request_type: &'a str,
        milliseconds: f64,
    },
    Error { user: &'a str, message: &'a str },
}

impl<'a> LogEvent<'a> {
    /// Response time lines take precedence over error lines.
    pub fn new_from_log_line(log_line: &'a str) -> Option<LogEvent<'a>> {
        if let Some(captures) = RESPONSE_TIME.captures(log_line) {
            let request_type = captures.get(1)?.as_str();
            // A run of ASCII digits always parses as f64, possibly as infinity
            let milliseconds: f64 = captures.get(2)?.as_str().parse().ok()?;

            return Some(LogEvent::ResponseTime {
                request_type,
                milliseconds,
            });
        }

        let captures = ERROR.captures(log_line)?;

        Some(LogEvent::Error {
            user: captures.get(1)?.as_str(),
            message: captures.get(2)?.as_str().trim(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_marker_is_case_insensitive() {
        assert!(is_warmup_finished(
            "[2024-05-02 10:00:00,000] locust/INFO/root: Warm-Up finished. Regular load profile starts now"
        ));
        assert!(is_warmup_finished("WARM-UP FINISHED - regular LOAD PROFILE STARTS"));
        assert!(!is_warmup_finished("Warm-Up started"));
    }

    #[test]
    fn test_parse_response_time_line() {
        let line = "[2024-05-02 10:00:01,123] locust/INFO/root: (GET /login) Response time 120 ms";

        let expected = LogEvent::ResponseTime {
            request_type: "GET /login",
            milliseconds: 120.0,
        };

        assert_eq!(LogEvent::new_from_log_line(line), Some(expected));
    }

    #[test]
    fn test_parse_response_time_line_plain_word_endpoint() {
        let line = "locust/INFO/root: (POST  cartAction) Response time 7 ms";

        let expected = LogEvent::ResponseTime {
            request_type: "POST  cartAction",
            milliseconds: 7.0,
        };

        assert_eq!(LogEvent::new_from_log_line(line), Some(expected));
    }

    #[test]
    fn test_parse_error_line() {
        let line = "[2024-05-02 10:00:01,123] locust/ERROR/root: user42:   Connection refused  ";

        let expected = LogEvent::Error {
            user: "user42",
            message: "Connection refused",
        };

        assert_eq!(LogEvent::new_from_log_line(line), Some(expected));
    }

    #[test]
    fn test_parse_error_line_empty_message() {
        let line = "locust/ERROR/root: user2: ";

        let expected = LogEvent::Error {
            user: "user2",
            message: "",
        };

        assert_eq!(LogEvent::new_from_log_line(line), Some(expected));
    }

    #[test]
    fn test_error_line_needs_user_id_and_single_spaces() {
        for line in &[
            "x/ERROR/root: Exception: boom",
            "x/ERROR/root: Traceback: most recent call last",
            "x/ERROR/root: user1:no space after colon",
            "x/ERROR/root:  user1: two spaces before the id",
            "x/ERROR/root: userA: not a numbered user",
        ] {
            assert_eq!(LogEvent::new_from_log_line(line), None, "line: {:?}", line);
        }
    }

    #[test]
    fn test_ignore_unrelated_lines() {
        assert_eq!(LogEvent::new_from_log_line("Starting Locust 2.20.0"), None);
        assert_eq!(
            LogEvent::new_from_log_line("locust/INFO/root: (GET /login) Response time slow ms"),
            None
        );
        assert_eq!(
            LogEvent::new_from_log_line("locust/WARNING/root: user1: retrying"),
            None
        );
    }
}
