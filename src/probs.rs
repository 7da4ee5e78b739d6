//! ACME problem details.
//!
//! Every failed validation produces exactly one [`ProblemDetails`]. Its `detail` is safe to log
//! and to return to the requester verbatim: anything taken from DNS answers has already been
//! size-bounded and sanitized by the time it lands here.
use serde::{Serialize, Serializer};
use std::fmt;

const ERROR_NS: &str = "urn:ietf:params:acme:error:";

/// The machine-readable kind of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::module_name_repetitions)]
pub enum ProblemKind {
    /// The request was malformed, e.g. an identifier of the wrong type.
    Malformed,
    /// The requester didn't prove control of the identifier.
    Unauthorized,
    /// A DNS lookup failed.
    Dns,
    /// Something went wrong on our side.
    ServerInternal,
}

impl ProblemKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemKind::Malformed => "malformed",
            ProblemKind::Unauthorized => "unauthorized",
            ProblemKind::Dns => "dns",
            ProblemKind::ServerInternal => "serverInternal",
        }
    }

    /// The HTTP status a problem of this kind is served with.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            ProblemKind::Malformed | ProblemKind::Dns => 400,
            ProblemKind::Unauthorized => 403,
            ProblemKind::ServerInternal => 500,
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ERROR_NS}{}", self.as_str())
    }
}

impl Serialize for ProblemKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Why a DNS-01 validation was unauthorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Reason {
    /// No TXT record was published at the challenge name.
    NoTxtRecord,
    /// TXT records were published but none held the expected value.
    IncorrectTxtRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: ProblemKind,
    pub detail: String,
    /// The HTTP status. This is [`ProblemKind::http_status`] unless refined within the same
    /// class with [`ProblemDetails::with_status`].
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
}

impl ProblemDetails {
    #[must_use]
    pub fn new(kind: ProblemKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            status: kind.http_status(),
            reason: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: Reason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Refine the HTTP status, e.g. 415 rather than 400 for a malformed request. A status of a
    /// different class than the kind's own (4xx vs 5xx) is ignored.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        if status / 100 == self.kind.http_status() / 100 {
            self.status = status;
        }
        self
    }

    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Malformed, detail)
    }

    #[must_use]
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Unauthorized, detail)
    }

    #[must_use]
    pub fn dns(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Dns, detail)
    }

    #[must_use]
    pub fn server_internal(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::ServerInternal, detail)
    }
}

impl fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :: {}", self.kind, self.detail)
    }
}

impl std::error::Error for ProblemDetails {}
