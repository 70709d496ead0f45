use std::fmt;

/// A hosted mail domain.
///
/// The fully-qualified domain name is stored lowercase; the store enforces
/// case-insensitive uniqueness over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub id: i64,
    pub fqdn: String,
    pub created_at: String,
}

impl Domain {
    /// Normalize a raw fully-qualified name for storage and lookup.
    pub fn normalize(fqdn: &str) -> String {
        fqdn.to_lowercase()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqdn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(Domain::normalize("MyExampleDomain.org"), "myexampledomain.org");
        assert_eq!(Domain::normalize("example.org"), "example.org");
    }

    #[test]
    fn test_display() {
        let domain = Domain {
            id: 1,
            fqdn: "example.org".to_string(),
            created_at: "2026-01-01 00:00:00".to_string(),
        };
        assert_eq!(domain.to_string(), "example.org");
    }
}
