//! HTTP context consumed by profile checks such as CORS: headers and
//! the redirect chain for one already-fetched RDAP response.
//! Performing the actual HTTP request is an external collaborator's
//! job — this module models only what the fetcher hands back.
use std::collections::BTreeMap;
use std::fmt;

/// One response in a redirect chain.
#[derive(Clone, Debug, Default)]
pub struct HttpResponseSnapshot {
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

impl HttpResponseSnapshot {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for HttpResponseSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.headers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// The full redirect chain for a single RDAP query, oldest first.
#[derive(Clone, Debug, Default)]
pub struct HttpContext {
    pub chain: Vec<HttpResponseSnapshot>,
}

impl HttpContext {
    pub fn single(response: HttpResponseSnapshot) -> Self {
        HttpContext {
            chain: vec![response],
        }
    }

    pub fn final_response(&self) -> Option<&HttpResponseSnapshot> {
        self.chain.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        let response = HttpResponseSnapshot {
            url: "https://example/".into(),
            status: 200,
            headers,
        };
        assert_eq!(
            response.header("access-control-allow-origin"),
            Some("*")
        );
    }
}
