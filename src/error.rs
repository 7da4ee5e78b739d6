//! Error types.

use crate::probs::{ProblemDetails, ProblemKind};
use crate::resolver::LookupError;
use axum::extract::rejection::JsonRejection;
use std::net::IpAddr;
use std::time::Duration;
use trust_dns_resolver::error::ResolveError;

/// Error enumerates the possible validation authority error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a lookup made through the [`Resolver`][crate::resolver::Resolver] fails.
    /// Renders as the lookup error itself.
    #[error(transparent)]
    DNSError(#[from] LookupError),

    /// Returned when a host lookup succeeds but yields no addresses.
    #[error("No valid IP addresses found for {0}")]
    NoAddresses(String),

    /// Returned when clients `POST` invalid JSON.
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Returned when the [`Config::api_bind_addr`][`crate::config::Config::api_bind_addr`] is
    /// not a loopback address, or an address within a private network space.
    #[error("API bind address ({0}) must be a loopback or private IP")]
    InsecureAPIBind(IpAddr),

    /// Returned when [`Config::resolver_timeout`][crate::config::Config::resolver_timeout]
    /// times the number of attempts doesn't leave room within
    /// [`Config::lookup_timeout`][crate::config::Config::lookup_timeout].
    #[error(
        "resolver_timeout ({resolver_timeout:?}) x {attempts} attempts must be shorter than lookup_timeout ({lookup_timeout:?})"
    )]
    ResolverTimeout {
        resolver_timeout: Duration,
        attempts: usize,
        lookup_timeout: Duration,
    },

    /// Returned when the [`TrustDnsResolver`][crate::resolver::TrustDnsResolver] can't be
    /// constructed.
    #[error("failed to construct resolver: {0}")]
    Resolver(#[from] ResolveError),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g.
    /// [trying to load a `Config`][crate::config::Config::try_from_file]) fails due to invalid
    /// JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}

impl Error {
    /// The kind of problem this error is reported as.
    #[must_use]
    pub fn problem_kind(&self) -> ProblemKind {
        match self {
            Error::DNSError(_) | Error::NoAddresses(_) => ProblemKind::Dns,
            Error::JsonExtractorRejection(_) => ProblemKind::Malformed,
            _ => ProblemKind::ServerInternal,
        }
    }
}

impl From<&Error> for ProblemDetails {
    fn from(err: &Error) -> Self {
        match err.problem_kind() {
            // Don't leak details of internal failures to clients.
            ProblemKind::ServerInternal => ProblemDetails::server_internal("internal error"),
            kind => ProblemDetails::new(kind, err.to_string()),
        }
    }
}
