//! Configuration value object consumed by the engine: the query URI
//! and the query type derived from it.
//!
//! Loading configuration from a file or the environment is an external
//! collaborator's job; this module only models the already-resolved
//! value the engine receives.
use url::Url;

/// The kind of RDAP query a response is being validated against. Gates
/// which profile checks apply.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    Help,
    Domain,
    Nameserver,
    Nameservers,
    Entity,
}

impl QueryType {
    /// Derive the query type from the path shape of an RDAP query URI,
    /// following the RDAP query-path conventions of RFC 7482
    /// (`/domain/`, `/nameserver/`, `/nameservers?`, `/entity/`,
    /// `/help`).
    pub fn from_query_uri(uri: &Url) -> Option<Self> {
        let mut segments = uri.path_segments()?.peekable();
        let first = segments.next()?;
        match first {
            "domain" => Some(QueryType::Domain),
            "nameserver" => Some(QueryType::Nameserver),
            "nameservers" => Some(QueryType::Nameservers),
            "entity" => Some(QueryType::Entity),
            "help" => Some(QueryType::Help),
            // A bare "/example.com"-shaped path with no recognized
            // leading keyword: some captured RDAP responses are stored
            // keyed by domain name alone rather than the full query
            // path, so a single dotted segment still classifies as a
            // domain query.
            label if segments.peek().is_none() && label.contains('.') => Some(QueryType::Domain),
            _ => None,
        }
    }
}

/// The per-run configuration consumed by the engine and its profile
/// checks.
#[derive(Clone, Debug)]
pub struct QueryConfig {
    pub query_uri: Url,
    pub query_type: QueryType,
}

impl QueryConfig {
    pub fn new(query_uri: Url) -> Option<Self> {
        let query_type = QueryType::from_query_uri(&query_uri)?;
        Some(QueryConfig {
            query_uri,
            query_type,
        })
    }

    /// The registrable label of the query URI's last path segment,
    /// i.e. the domain name being queried, used by the label
    /// consistency check.
    pub fn query_label(&self) -> Option<&str> {
        self.query_uri.path_segments()?.last()
    }
}
