use std::fmt;

/// A forwarding rule: mail for `source` is delivered to `destination`.
///
/// The source may have an empty local part (`@example.org`), which makes it
/// a catch-all for the whole domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub id: i64,
    pub domain_id: i64,
    pub domain_fqdn: String,
    pub source: String,
    pub destination: String,
    pub active: bool,
}

impl Alias {
    /// Normalize an alias source or destination for storage and lookup.
    pub fn normalize_address(address: &str) -> String {
        address.to_lowercase()
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} > {}", self.domain_fqdn, self.source, self.destination)
    }
}
