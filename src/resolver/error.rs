//! Resolution error types.
//!
//! A [`ResolutionError`] tags a failed lookup with the query that was made. When it carries an
//! [`Underlying`] cause the failure happened while talking to the resolver (a timeout, a network
//! error, a cancelled lookup). Without one, the resolver answered and the answer was negative or
//! erroneous (NXDOMAIN, SERVFAIL, ...).
use std::fmt;
use std::sync::Arc;
use trust_dns_proto::op::ResponseCode;
use trust_dns_proto::rr::RecordType;

/// Response code reported when no response code applies, e.g. for a transport failure.
pub const NO_RCODE: i32 = -1;

const DETAIL_DNS_TIMEOUT: &str = "query timed out";
const DETAIL_CANCELED: &str = "query timed out (and was canceled)";
const DETAIL_DNS_NET_FAILURE: &str = "networking error";
const DETAIL_SERVER_FAILURE: &str = "server failure at resolver";

/// An opaque cause, shareable so that errors stay cheap to clone.
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// The infrastructure-level cause of a failed lookup.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Underlying {
    /// The caller cancelled the lookup.
    #[error("context canceled")]
    Canceled,

    /// The caller's deadline passed before the resolver answered.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The resolver did not answer in time.
    #[error("{0}")]
    Timeout(Cause),

    /// Communicating with the resolver failed.
    #[error("{0}")]
    Network(Cause),
}

impl Underlying {
    /// Whether this cause is the caller's own cancellation or deadline, rather than a fault of
    /// the resolver.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Underlying::Canceled | Underlying::DeadlineExceeded)
    }
}

/// A failed lookup, tagged with the query that was made.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct ResolutionError {
    record_type: RecordType,
    hostname: String,
    underlying: Option<Underlying>,
    rcode: Option<ResponseCode>,
}

impl ResolutionError {
    #[must_use]
    pub fn new(
        record_type: RecordType,
        hostname: impl Into<String>,
        underlying: Option<Underlying>,
        rcode: Option<ResponseCode>,
    ) -> Self {
        Self {
            record_type,
            hostname: hostname.into(),
            underlying,
            rcode,
        }
    }

    /// A failure communicating with the resolver.
    #[must_use]
    pub fn infrastructure(
        record_type: RecordType,
        hostname: impl Into<String>,
        underlying: Underlying,
    ) -> Self {
        Self::new(record_type, hostname, Some(underlying), None)
    }

    /// A negative or erroneous answer the resolver returned.
    #[must_use]
    pub fn rcode_answer(
        record_type: RecordType,
        hostname: impl Into<String>,
        rcode: ResponseCode,
    ) -> Self {
        Self::new(record_type, hostname, None, Some(rcode))
    }

    #[must_use]
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    #[must_use]
    pub fn underlying(&self) -> Option<&Underlying> {
        self.underlying.as_ref()
    }

    /// The response code declared by the resolver, or [`NO_RCODE`].
    #[must_use]
    pub fn rcode(&self) -> i32 {
        self.rcode
            .map_or(NO_RCODE, |code| i32::from(u16::from(code)))
    }

    fn detail(&self) -> (String, Option<&'static str>) {
        match &self.underlying {
            Some(Underlying::Timeout(_) | Underlying::DeadlineExceeded) => {
                (DETAIL_DNS_TIMEOUT.to_string(), None)
            }
            Some(Underlying::Canceled) => (DETAIL_CANCELED.to_string(), None),
            Some(Underlying::Network(_)) => (DETAIL_DNS_NET_FAILURE.to_string(), None),
            None => match self.rcode {
                Some(code) if code != ResponseCode::NoError => {
                    (rcode_name(code), rcode_explanation(code))
                }
                _ => (DETAIL_SERVER_FAILURE.to_string(), None),
            },
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (detail, additional) = self.detail();
        write!(
            f,
            "DNS problem: {detail} looking up {} for {}",
            self.record_type, self.hostname
        )?;
        if let Some(additional) = additional {
            write!(f, " - {additional}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.underlying
            .as_ref()
            .map(|u| u as &(dyn std::error::Error + 'static))
    }
}

fn rcode_name(code: ResponseCode) -> String {
    match code {
        ResponseCode::NoError => "NOERROR".to_string(),
        ResponseCode::FormErr => "FORMERR".to_string(),
        ResponseCode::ServFail => "SERVFAIL".to_string(),
        ResponseCode::NXDomain => "NXDOMAIN".to_string(),
        ResponseCode::NotImp => "NOTIMP".to_string(),
        ResponseCode::Refused => "REFUSED".to_string(),
        ResponseCode::YXDomain => "YXDOMAIN".to_string(),
        ResponseCode::YXRRSet => "YXRRSET".to_string(),
        ResponseCode::NXRRSet => "NXRRSET".to_string(),
        ResponseCode::NotAuth => "NOTAUTH".to_string(),
        ResponseCode::NotZone => "NOTZONE".to_string(),
        other => other.to_string(),
    }
}

fn rcode_explanation(code: ResponseCode) -> Option<&'static str> {
    match code {
        ResponseCode::NXDomain => Some("check that a DNS record exists for this domain"),
        ResponseCode::ServFail => Some("the domain's nameservers may be malfunctioning"),
        _ => None,
    }
}

/// Any error a [`Resolver`][super::Resolver] lookup can return.
#[derive(thiserror::Error, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub enum LookupError {
    /// A failure tagged with the query that was made.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A failure that carries no query metadata.
    #[error("{0}")]
    Other(String),
}

impl LookupError {
    /// Returns the tagged [`ResolutionError`], if this is one.
    #[must_use]
    pub fn as_resolution(&self) -> Option<&ResolutionError> {
        match self {
            LookupError::Resolution(err) => Some(err),
            LookupError::Other(_) => None,
        }
    }

    /// Returns the underlying cause when this error is a fault talking to the resolver that the
    /// caller did not bring about itself.
    ///
    /// Authoritative negative answers, errors without query metadata, and cancelled or expired
    /// lookups all return `None`.
    #[must_use]
    pub fn infrastructure_fault(&self) -> Option<&Underlying> {
        self.as_resolution()
            .and_then(ResolutionError::underlying)
            .filter(|underlying| !underlying.is_cancellation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn timeout() -> Underlying {
        Underlying::Timeout(Arc::new(io::Error::new(io::ErrorKind::TimedOut, "so sloooow")))
    }

    #[test]
    fn renders_timeout() {
        let err = ResolutionError::infrastructure(RecordType::A, "always.timeout", timeout());
        assert_eq!(
            err.to_string(),
            "DNS problem: query timed out looking up A for always.timeout"
        );
        assert_eq!(err.rcode(), NO_RCODE);
    }

    #[test]
    fn renders_cancellation_and_deadline() {
        let canceled =
            ResolutionError::infrastructure(RecordType::TXT, "example.com", Underlying::Canceled);
        assert_eq!(
            canceled.to_string(),
            "DNS problem: query timed out (and was canceled) looking up TXT for example.com"
        );
        let expired = ResolutionError::infrastructure(
            RecordType::TXT,
            "example.com",
            Underlying::DeadlineExceeded,
        );
        assert_eq!(
            expired.to_string(),
            "DNS problem: query timed out looking up TXT for example.com"
        );
    }

    #[test]
    fn renders_network_failure() {
        let err = ResolutionError::infrastructure(
            RecordType::A,
            "always.error",
            Underlying::Network(Arc::new(io::Error::new(io::ErrorKind::Other, "boom"))),
        );
        assert_eq!(
            err.to_string(),
            "DNS problem: networking error looking up A for always.error"
        );
    }

    #[test]
    fn renders_rcodes() {
        let nx = ResolutionError::rcode_answer(RecordType::TXT, "nx.com", ResponseCode::NXDomain);
        assert_eq!(
            nx.to_string(),
            "DNS problem: NXDOMAIN looking up TXT for nx.com - check that a DNS record exists for this domain"
        );
        assert_eq!(nx.rcode(), 3);

        let servfail =
            ResolutionError::rcode_answer(RecordType::CAA, "sf.com", ResponseCode::ServFail);
        assert_eq!(
            servfail.to_string(),
            "DNS problem: SERVFAIL looking up CAA for sf.com - the domain's nameservers may be malfunctioning"
        );

        let refused =
            ResolutionError::rcode_answer(RecordType::AAAA, "r.com", ResponseCode::Refused);
        assert_eq!(
            refused.to_string(),
            "DNS problem: REFUSED looking up AAAA for r.com"
        );

        let bare = ResolutionError::new(RecordType::A, "x.com", None, None);
        assert_eq!(
            bare.to_string(),
            "DNS problem: server failure at resolver looking up A for x.com"
        );
    }

    #[test]
    fn infrastructure_fault_classification() {
        let fault: LookupError =
            ResolutionError::infrastructure(RecordType::A, "always.timeout", timeout()).into();
        assert!(fault.infrastructure_fault().is_some());

        let negative: LookupError =
            ResolutionError::rcode_answer(RecordType::TXT, "nx.com", ResponseCode::NXDomain).into();
        assert!(negative.as_resolution().is_some());
        assert!(negative.infrastructure_fault().is_none());

        for cancelled in [Underlying::Canceled, Underlying::DeadlineExceeded] {
            let err: LookupError =
                ResolutionError::infrastructure(RecordType::TXT, "x.com", cancelled).into();
            assert!(err.infrastructure_fault().is_none());
        }

        let untagged = LookupError::Other("SERVFAIL".to_string());
        assert!(untagged.as_resolution().is_none());
        assert!(untagged.infrastructure_fault().is_none());
        assert_eq!(untagged.to_string(), "SERVFAIL");
    }
}
