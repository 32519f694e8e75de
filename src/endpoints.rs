use thiserror::Error;

#[derive(Debug, Error)]
pub enum EndpointError {
    /// Raised when a dot-addressed key has no entry in the endpoint table.
    /// Misconfiguration, not user input: callers should fail fast, not retry.
    #[error("unknown endpoint key: {0}")]
    UnknownKey(String),
}

/// The backend routes the feed talks to. The table is fixed at compile time;
/// there is deliberately no way to add or rewrite an entry at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    PoolBaseInfo,
    PoolDataInfo,
}

impl Endpoint {
    /// Path suffix appended to the selected base URL. Always starts with `/`.
    pub fn suffix(self) -> &'static str {
        match self {
            Endpoint::PoolBaseInfo => "/poolBaseInfo",
            Endpoint::PoolDataInfo => "/poolDataInfo",
        }
    }

    /// Looks up a dot-addressed key, e.g. `info.poolBaseInfo`.
    pub fn from_key(key: &str) -> Result<Self, EndpointError> {
        match key {
            "info.poolBaseInfo" => Ok(Endpoint::PoolBaseInfo),
            "info.poolDataInfo" => Ok(Endpoint::PoolDataInfo),
            other => Err(EndpointError::UnknownKey(other.to_string())),
        }
    }
}

/// Deployment targets the feed can be pointed at. `V21`/`V22` are the two
/// backend revisions hostname matching selects between; `Development` and
/// `Production` are only reachable through `Config::profile_override`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostProfile {
    Development,
    Production,
    V21,
    V22,
}

impl HostProfile {
    /// Base URLs carry no trailing slash; suffixes supply the separator.
    pub fn base_url(self) -> &'static str {
        match self {
            HostProfile::Development => "https://pledge.rcc-tec.xyz",
            HostProfile::Production => "https://pro.test.com/api",
            HostProfile::V21 => "https://127.0.0.1/api/v22",
            HostProfile::V22 => "https://v2-backend.pledger.finance/api/v22",
        }
    }

    /// Selects the backend for the host the page is served from. Checks run
    /// in priority order, first match wins; anything unrecognized falls back
    /// to `V21` rather than erroring.
    pub fn for_hostname(hostname: &str) -> Self {
        if hostname.contains("127.0.0.1") || hostname.contains("localhost") {
            return HostProfile::V21;
        }
        if hostname.contains("dev-v2-pledger") {
            return HostProfile::V21;
        }
        if hostname.contains("v2-pldeger") {
            return HostProfile::V22;
        }
        HostProfile::V21
    }

    pub fn url_for(self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url(), endpoint.suffix())
    }
}

/// Fully-qualified request URL for `endpoint` as seen from `hostname`.
/// Pure; usable before any network stack exists.
pub fn resolve(endpoint: Endpoint, hostname: &str) -> String {
    HostProfile::for_hostname(hostname).url_for(endpoint)
}

/// String-keyed variant of `resolve` for callers holding a symbolic key.
pub fn resolve_key(key: &str, hostname: &str) -> Result<String, EndpointError> {
    Ok(resolve(Endpoint::from_key(key)?, hostname))
}
