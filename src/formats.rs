//! Format-keyword predicates consulted by the structural validator:
//! IPv4/IPv6/IDN hostname/hostname-in-uri/datetime.
//!
//! Each format is a `lazy_static!`-backed regex and a plain
//! `fn(&str) -> bool` predicate, plus the two formats the ICANN
//! profile needs that the generic JSON Schema draft does not define —
//! `idn-hostname` and `hostname-in-uri`.
use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;
use std::net::IpAddr;
use std::str::FromStr;

lazy_static! {
    static ref HOSTNAME_RE: Regex =
        Regex::new(r"^(?i)(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)*[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\z").unwrap();
}

pub fn datetime(instance: &str) -> bool {
    DateTime::parse_from_rfc3339(instance).is_ok()
}

pub fn ipv4(instance: &str) -> bool {
    matches!(IpAddr::from_str(instance), Ok(IpAddr::V4(_)))
}

pub fn ipv6(instance: &str) -> bool {
    matches!(IpAddr::from_str(instance), Ok(IpAddr::V6(_)))
}

pub fn hostname(instance: &str) -> bool {
    !instance.is_empty() && instance.chars().count() <= 255 && HOSTNAME_RE.is_match(instance)
}

/// `idn-hostname`: the label may be a Unicode (U-label) or ASCII
/// (A-label, `xn--...`) domain name; `idna::domain_to_ascii` accepts
/// both and rejects anything that cannot round-trip through IDNA.
pub fn idn_hostname(instance: &str) -> bool {
    idna::domain_to_ascii(instance).is_ok()
}

/// `hostname-in-uri`: the authority component of a URI string must be
/// a valid hostname once stripped of scheme/path/credentials.
pub fn hostname_in_uri(instance: &str) -> bool {
    match url::Url::parse(instance) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| hostname(host) || idn_hostname(host))
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("example.com" => true)]
    #[test_case("-bad.example" => false)]
    #[test_case("" => false)]
    fn hostname_cases(input: &str) -> bool {
        hostname(input)
    }

    #[test_case("192.0.2.1" => true)]
    #[test_case("2001:db8::1" => false)]
    fn ipv4_cases(input: &str) -> bool {
        ipv4(input)
    }

    #[test_case("2001:db8::1" => true)]
    #[test_case("192.0.2.1" => false)]
    fn ipv6_cases(input: &str) -> bool {
        ipv6(input)
    }

    #[test]
    fn idn_hostname_accepts_a_label() {
        assert!(idn_hostname("xn--viagnie-eya.example"));
    }

    #[test]
    fn datetime_rejects_non_rfc3339() {
        assert!(!datetime("not-a-date"));
        assert!(datetime("2024-01-01T00:00:00Z"));
    }
}
