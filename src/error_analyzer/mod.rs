#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorCategory {
    Unknown,
    Timeout,
    Connection,
    Http500,
    Http502,
    Http503,
    Login,
    Logout,
    Profile,
    ProductCart,
    Category,
    PageLoad,
    Other,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorGroup {
    HttpStatus,
    Functional,
    Other,
}

impl ErrorCategory {
    /// Order in which categories are reported and charted.
    pub const REPORT_ORDER: [ErrorCategory; 13] = [
        ErrorCategory::Http503,
        ErrorCategory::Http502,
        ErrorCategory::Http500,
        ErrorCategory::Login,
        ErrorCategory::Logout,
        ErrorCategory::Profile,
        ErrorCategory::ProductCart,
        ErrorCategory::Category,
        ErrorCategory::PageLoad,
        ErrorCategory::Timeout,
        ErrorCategory::Unknown,
        ErrorCategory::Connection,
        ErrorCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Http503 => "HTTP 503 (Service Unavailable)",
            ErrorCategory::Http502 => "HTTP 502 (Bad Gateway)",
            ErrorCategory::Http500 => "HTTP 500 (Internal Server Error)",
            ErrorCategory::Login => "Login Errors",
            ErrorCategory::Logout => "Logout Errors",
            ErrorCategory::Profile => "Profile Access Errors",
            ErrorCategory::ProductCart => "Product/Cart Errors",
            ErrorCategory::Category => "Category Browse Errors",
            ErrorCategory::PageLoad => "Page Load Errors",
            ErrorCategory::Timeout => "Timeout Errors",
            ErrorCategory::Unknown => "Unknown/Empty Errors",
            ErrorCategory::Connection => "Connection Errors",
            ErrorCategory::Other => "Other Errors",
        }
    }

    pub fn group(self) -> ErrorGroup {
        match self {
            ErrorCategory::Http500 | ErrorCategory::Http502 | ErrorCategory::Http503 => {
                ErrorGroup::HttpStatus
            }
            ErrorCategory::Login
            | ErrorCategory::Logout
            | ErrorCategory::Profile
            | ErrorCategory::ProductCart
            | ErrorCategory::Category
            | ErrorCategory::PageLoad => ErrorGroup::Functional,
            ErrorCategory::Timeout
            | ErrorCategory::Unknown
            | ErrorCategory::Connection
            | ErrorCategory::Other => ErrorGroup::Other,
        }
    }
}

struct Message<'a> {
    original: &'a str,
    lowercase: String,
}

impl<'a> Message<'a> {
    fn new(original: &'a str) -> Message<'a> {
        Message {
            original,
            lowercase: original.to_lowercase(),
        }
    }

    fn mentions(&self, term: &str) -> bool {
        self.lowercase.contains(term)
    }

    fn mentions_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|term| self.mentions(term))
    }

    fn has_status(&self, code: &str) -> bool {
        self.original.contains(&format!("status {}", code))
            || self.original.contains(&format!("status: {}", code))
    }
}

fn is_empty(message: &Message) -> bool {
    message.original.is_empty()
}

fn is_timeout(message: &Message) -> bool {
    message.mentions("timed out")
}

fn is_connection(message: &Message) -> bool {
    message.mentions_any(&["connection", "connect", "refused", "reset", "closed"])
}

fn is_http_500(message: &Message) -> bool {
    message.has_status("500")
}

fn is_http_502(message: &Message) -> bool {
    message.has_status("502")
}

fn is_http_503(message: &Message) -> bool {
    message.has_status("503")
}

fn is_login(message: &Message) -> bool {
    message.mentions("login") && message.mentions("username")
}

fn is_logout(message: &Message) -> bool {
    message.mentions_any(&["log out", "logout"])
}

fn is_profile(message: &Message) -> bool {
    message.mentions("profile")
}

fn is_product_or_cart(message: &Message) -> bool {
    message.mentions_any(&["product", "cart"])
}

fn is_category(message: &Message) -> bool {
    message.mentions("category")
}

fn is_page_load(message: &Message) -> bool {
    message.mentions("load") && message.mentions_any(&["page", "landing"])
}

/// Evaluated top to bottom, the first matching rule decides. Anything left
/// over is `Other`.
const RULES: [(fn(&Message) -> bool, ErrorCategory); 12] = [
    (is_empty, ErrorCategory::Unknown),
    (is_timeout, ErrorCategory::Timeout),
    (is_connection, ErrorCategory::Connection),
    (is_http_500, ErrorCategory::Http500),
    (is_http_502, ErrorCategory::Http502),
    (is_http_503, ErrorCategory::Http503),
    (is_login, ErrorCategory::Login),
    (is_logout, ErrorCategory::Logout),
    (is_profile, ErrorCategory::Profile),
    (is_product_or_cart, ErrorCategory::ProductCart),
    (is_category, ErrorCategory::Category),
    (is_page_load, ErrorCategory::PageLoad),
];

pub fn categorize(error_message: &str) -> ErrorCategory {
    let message = Message::new(error_message.trim());

    RULES
        .iter()
        .find(|(matches, _)| matches(&message))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Other)
}

/// Tally of error lines per category. Counters only ever go up.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct ErrorRecord {
    http_500_errors: usize,
    http_502_errors: usize,
    http_503_errors: usize,
    login_errors: usize,
    logout_errors: usize,
    profile_errors: usize,
    product_errors: usize,
    category_errors: usize,
    page_load_errors: usize,
    timeout_errors: usize,
    unknown_errors: usize,
    connection_errors: usize,
    other_errors: usize,
}

impl ErrorRecord {
    pub fn new() -> ErrorRecord {
        ErrorRecord::default()
    }

    pub fn add(&mut self, category: ErrorCategory) {
        *self.counter_mut(category) += 1;
    }

    pub fn count(&self, category: ErrorCategory) -> usize {
        match category {
            ErrorCategory::Http500 => self.http_500_errors,
            ErrorCategory::Http502 => self.http_502_errors,
            ErrorCategory::Http503 => self.http_503_errors,
            ErrorCategory::Login => self.login_errors,
            ErrorCategory::Logout => self.logout_errors,
            ErrorCategory::Profile => self.profile_errors,
            ErrorCategory::ProductCart => self.product_errors,
            ErrorCategory::Category => self.category_errors,
            ErrorCategory::PageLoad => self.page_load_errors,
            ErrorCategory::Timeout => self.timeout_errors,
            ErrorCategory::Unknown => self.unknown_errors,
            ErrorCategory::Connection => self.connection_errors,
            ErrorCategory::Other => self.other_errors,
        }
    }

    fn counter_mut(&mut self, category: ErrorCategory) -> &mut usize {
        match category {
            ErrorCategory::Http500 => &mut self.http_500_errors,
            ErrorCategory::Http502 => &mut self.http_502_errors,
            ErrorCategory::Http503 => &mut self.http_503_errors,
            ErrorCategory::Login => &mut self.login_errors,
            ErrorCategory::Logout => &mut self.logout_errors,
            ErrorCategory::Profile => &mut self.profile_errors,
            ErrorCategory::ProductCart => &mut self.product_errors,
            ErrorCategory::Category => &mut self.category_errors,
            ErrorCategory::PageLoad => &mut self.page_load_errors,
            ErrorCategory::Timeout => &mut self.timeout_errors,
            ErrorCategory::Unknown => &mut self.unknown_errors,
            ErrorCategory::Connection => &mut self.connection_errors,
            ErrorCategory::Other => &mut self.other_errors,
        }
    }

    pub fn total_errors(&self) -> usize {
        ErrorCategory::REPORT_ORDER
            .iter()
            .map(|category| self.count(*category))
            .sum()
    }

    pub fn total_in_group(&self, group: ErrorGroup) -> usize {
        ErrorCategory::REPORT_ORDER
            .iter()
            .filter(|category| category.group() == group)
            .map(|category| self.count(*category))
            .sum()
    }

    pub fn total_http_errors(&self) -> usize {
        self.total_in_group(ErrorGroup::HttpStatus)
    }

    pub fn total_functional_errors(&self) -> usize {
        self.total_in_group(ErrorGroup::Functional)
    }

    pub fn total_other_errors(&self) -> usize {
        self.total_in_group(ErrorGroup::Other)
    }

    /// Categories with at least one error, in report order.
    pub fn non_zero(&self) -> Vec<(ErrorCategory, usize)> {
        ErrorCategory::REPORT_ORDER
            .iter()
            .map(|category| (*category, self.count(*category)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}
