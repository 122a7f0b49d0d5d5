use std::fs;
use std::mem;

use once_cell::sync::Lazy;
use regex::Regex;

/// Services a healthy TeaStore deployment registers.
pub const EXPECTED_SERVICES: [&str; 5] = ["WebUI", "Auth", "Persistence", "Recommender", "Image"];

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid comment regex"));

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("Invalid tag regex")
});

/// One row of the status table: Service, #, Host(s), Status.
#[derive(PartialEq, Debug, Clone)]
pub struct ServiceStatus {
    pub name: String,
    pub count: String,
    pub hosts: String,
    pub status: String,
}

impl ServiceStatus {
    pub fn is_ok(&self) -> bool {
        self.status.contains("OK")
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct StatusReport {
    pub success: bool,
    pub services: Vec<ServiceStatus>,
    pub message: String,
}

/// Collects the four-cell rows of all tables in the page.
#[derive(Default)]
struct TableScanner {
    in_table: bool,
    in_row: bool,
    in_cell: bool,
    row: Vec<String>,
    cell: String,
    services: Vec<ServiceStatus>,
}

impl TableScanner {
    fn start_tag(&mut self, tag: &str) {
        match tag {
            "table" => self.in_table = true,
            "tr" if self.in_table => {
                self.in_row = true;
                self.row.clear();
            }
            "td" if self.in_row => {
                self.in_cell = true;
                self.cell.clear();
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: &str) {
        match tag {
            "table" => self.in_table = false,
            "tr" if self.in_row => {
                self.in_row = false;
                self.finish_row();
            }
            "td" if self.in_cell => {
                self.in_cell = false;
                let cell = mem::replace(&mut self.cell, String::new());
                self.row.push(cell);
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_cell {
            self.cell.push_str(&decode_entities(text));
        }
    }

    fn finish_row(&mut self) {
        if self.row.len() != 4 {
            trace!("Skipped a table row with {} cells", self.row.len());
            return;
        }

        let name = self.row[0].trim();
        if name.is_empty() || name == "Service" {
            return;
        }

        self.services.push(ServiceStatus {
            name: name.to_string(),
            count: self.row[1].trim().to_string(),
            hosts: self.row[2].trim().to_string(),
            status: self.row[3].trim().to_string(),
        });
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Extracts the service rows from the HTML of the status page.
pub fn parse_services(html: &str) -> Vec<ServiceStatus> {
    let html = COMMENT.replace_all(html, "");
    let mut scanner = TableScanner::default();
    let mut position = 0;

    for captures in TAG.captures_iter(&html) {
        let whole = match captures.get(0) {
            Some(whole) => whole,
            None => continue,
        };
        let closing = &captures[1] == "/";
        let name = captures[2].to_ascii_lowercase();

        scanner.text(&html[position..whole.start()]);
        position = whole.end();

        if closing {
            scanner.end_tag(&name);
        } else {
            scanner.start_tag(&name);
        }
    }
    scanner.text(&html[position..]);

    scanner.services
}

pub fn check_status(html: &str) -> StatusReport {
    let services = parse_services(html);

    if services.is_empty() {
        return StatusReport {
            success: false,
            services,
            message: String::from("No services found in status page"),
        };
    }

    let (ok, failed): (Vec<&ServiceStatus>, Vec<&ServiceStatus>) =
        services.iter().partition(|service| service.is_ok());

    let mut message = vec![format!(
        "Found {} services, {} with OK status",
        services.len(),
        ok.len()
    )];

    if !ok.is_empty() {
        message.push(String::from("✓ Services OK:"));
        for service in &ok {
            message.push(format!("  - {}: {}", service.name, service.status));
        }
    }

    if !failed.is_empty() {
        message.push(String::from("✗ Services not OK:"));
        for service in &failed {
            message.push(format!("  - {}: {}", service.name, service.status));
        }
    }

    let missing: Vec<&str> = EXPECTED_SERVICES
        .iter()
        .filter(|expected| !services.iter().any(|service| service.name == **expected))
        .cloned()
        .collect();
    if !missing.is_empty() {
        debug!("Expected services not registered: {}", missing.join(", "));
    }

    let success = failed.is_empty() && ok.len() >= EXPECTED_SERVICES.len() && missing.is_empty();

    StatusReport {
        success,
        message: message.join("\n"),
        services,
    }
}

/// The argument is read as a file if possible, otherwise it is the HTML.
pub fn read_input(input: &str) -> String {
    match fs::read_to_string(input) {
        Ok(content) => content,
        Err(err) => {
            debug!("Treating the argument as HTML content ({})", err);
            input.to_string()
        }
    }
}
