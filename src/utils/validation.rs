//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for one segment of a field path
static FIELD_SEGMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

/// Regex for role names attached to an actor snapshot
static ROLE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9 _-]*$").unwrap());

/// Validate a field path such as `population` or `location.latitude`
pub fn validate_field_name(path: &str) -> bool {
    if path.is_empty() || path.len() > 255 {
        return false;
    }

    path.split('.').all(|part| FIELD_SEGMENT_REGEX.is_match(part))
}

/// Validate a textual IPv4 or IPv6 address
pub fn validate_ip_address(addr: &str) -> bool {
    addr.parse::<std::net::IpAddr>().is_ok()
}

/// Validate a role name
pub fn validate_role_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 100 && ROLE_NAME_REGEX.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_field_name_valid() {
        assert!(validate_field_name("status"));
        assert!(validate_field_name("location.latitude"));
        assert!(validate_field_name("observer_count"));
        assert!(validate_field_name("habitat-type"));
    }

    #[test]
    fn test_validate_field_name_invalid() {
        assert!(!validate_field_name(""));
        assert!(!validate_field_name(".invalid"));
        assert!(!validate_field_name("invalid."));
        assert!(!validate_field_name("has spaces"));
        assert!(!validate_field_name("9lives"));
    }

    #[test]
    fn test_validate_ip_address() {
        assert!(validate_ip_address("192.168.1.100"));
        assert!(validate_ip_address("::1"));
        assert!(!validate_ip_address("not-an-ip"));
        assert!(!validate_ip_address("300.1.1.1"));
    }

    #[test]
    fn test_validate_role_name() {
        assert!(validate_role_name("Field Researcher"));
        assert!(validate_role_name("admin"));
        assert!(!validate_role_name(""));
        assert!(!validate_role_name("-lead"));
    }
}
