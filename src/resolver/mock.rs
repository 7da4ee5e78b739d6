//! A fixed-answer [`Resolver`] for tests.
//!
//! | Name                                  | Answer                                      |
//! |---------------------------------------|---------------------------------------------|
//! | `_acme-challenge.good-dns01.com`      | the expected digest for [`GOOD_KEY_AUTHORIZATION`] |
//! | `_acme-challenge.wrong-dns01.com`     | `a`                                         |
//! | `_acme-challenge.wrong-many-dns01.com`| `a`, `b`, `c`, `d`, `e`                     |
//! | `_acme-challenge.long-dns01.com`      | [`LONG_RECORD_LEN`] `a`s                    |
//! | `_acme-challenge.invalid-utf8-dns01.com` | bytes that aren't valid UTF-8            |
//! | `_acme-challenge.empty-txts.com`      | no records                                  |
//! | `_acme-challenge.servfail.com`        | an untagged `SERVFAIL` error                |
//! | `_acme-challenge.nxdomain-dns01.com`  | an NXDOMAIN answer                          |
//! | `_acme-challenge.timeout-dns01.com`   | a timeout talking to the resolver           |
//! | `always.invalid`, `invalid.invalid`   | no addresses                                |
//! | `always.timeout`                      | a timeout talking to the resolver           |
//! | `always.error`                        | a network error talking to the resolver     |
//! | `always.hangs`, `_acme-challenge.hangs-dns01.com` | no answer until the context ends |
//! | `ipv4.and.ipv6.localhost`             | `::1`, `127.0.0.1`                          |
//! | `ipv6.localhost`                      | `::1`                                       |
//!
//! Any other TXT lookup answers `hostname`; any other host lookup answers `127.0.0.1`.
use crate::resolver::{LookupContext, LookupError, ResolutionError, Resolver, Underlying};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use trust_dns_proto::op::ResponseCode;
use trust_dns_proto::rr::rdata::CAA;
use trust_dns_proto::rr::RecordType;

/// Token and account key thumbprint whose digest is served for `good-dns01.com`.
pub const GOOD_KEY_AUTHORIZATION: &str =
    "LoqXcYV8q5ONbJQxbmR7SCTNo3tiAXDfowyjxAjEuX0.9jg46WB3rR_AHD-EBXdN7cBkH1WOu0tA3M9fm21mqTI";

/// `base64url(sha256(GOOD_KEY_AUTHORIZATION))`
pub const GOOD_DIGEST: &str = "LPsIwTo7o8BoG0-vjCyGQGBWSVIPxI-i_X336eUOQZo";

#[derive(Default, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct MockResolver;

impl MockResolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// A timeout talking to the resolver.
#[must_use]
pub fn timeout_error() -> Underlying {
    Underlying::Timeout(Arc::new(io::Error::new(io::ErrorKind::TimedOut, "so sloooow")))
}

/// A network error talking to the resolver.
#[must_use]
pub fn network_error() -> Underlying {
    Underlying::Network(Arc::new(io::Error::new(
        io::ErrorKind::Other,
        "read udp: some net error",
    )))
}

/// Length of the single record served for `long-dns01.com`.
pub const LONG_RECORD_LEN: usize = 253;

fn txts(values: &[&str]) -> Vec<Vec<u8>> {
    values.iter().map(|v| v.as_bytes().to_vec()).collect()
}

fn interrupted(ctx: &LookupContext, record_type: RecordType, name: &str) -> Result<(), LookupError> {
    match ctx.interruption() {
        Some(cause) => Err(ResolutionError::infrastructure(record_type, name, cause).into()),
        None => Ok(()),
    }
}

async fn hang(ctx: &LookupContext, record_type: RecordType, name: &str) -> LookupError {
    let cause = match ctx.guard(std::future::pending::<()>()).await {
        Err(cause) => cause,
        Ok(()) => Underlying::Canceled,
    };
    ResolutionError::infrastructure(record_type, name, cause).into()
}

#[async_trait::async_trait]
impl Resolver for MockResolver {
    async fn lookup_txt(
        &self,
        ctx: &LookupContext,
        hostname: &str,
    ) -> Result<Vec<Vec<u8>>, LookupError> {
        interrupted(ctx, RecordType::TXT, hostname)?;
        let records = match hostname {
            "_acme-challenge.servfail.com" => {
                return Err(LookupError::Other("SERVFAIL".to_string()))
            }
            "_acme-challenge.nxdomain-dns01.com" => {
                return Err(ResolutionError::rcode_answer(
                    RecordType::TXT,
                    hostname,
                    ResponseCode::NXDomain,
                )
                .into())
            }
            "_acme-challenge.timeout-dns01.com" => {
                return Err(
                    ResolutionError::infrastructure(RecordType::TXT, hostname, timeout_error())
                        .into(),
                )
            }
            "_acme-challenge.hangs-dns01.com" => {
                return Err(hang(ctx, RecordType::TXT, hostname).await)
            }
            "_acme-challenge.good-dns01.com" => txts(&[GOOD_DIGEST]),
            "_acme-challenge.wrong-dns01.com" => txts(&["a"]),
            "_acme-challenge.wrong-many-dns01.com" => txts(&["a", "b", "c", "d", "e"]),
            "_acme-challenge.long-dns01.com" => vec!["a".repeat(LONG_RECORD_LEN).into_bytes()],
            "_acme-challenge.invalid-utf8-dns01.com" => vec![b"ab\xff\xfecd".to_vec()],
            "_acme-challenge.empty-txts.com" => vec![],
            _ => txts(&["hostname"]),
        };
        Ok(records)
    }

    async fn lookup_host(
        &self,
        ctx: &LookupContext,
        hostname: &str,
    ) -> Result<Vec<IpAddr>, LookupError> {
        interrupted(ctx, RecordType::A, hostname)?;
        match hostname {
            "always.invalid" | "invalid.invalid" => Ok(vec![]),
            "always.timeout" => {
                Err(ResolutionError::infrastructure(RecordType::A, hostname, timeout_error()).into())
            }
            "always.error" => {
                Err(ResolutionError::infrastructure(RecordType::A, hostname, network_error()).into())
            }
            "always.hangs" => Err(hang(ctx, RecordType::A, hostname).await),
            "ipv4.and.ipv6.localhost" => Ok(vec![
                IpAddr::V6(Ipv6Addr::LOCALHOST),
                IpAddr::V4(Ipv4Addr::LOCALHOST),
            ]),
            "ipv6.localhost" => Ok(vec![IpAddr::V6(Ipv6Addr::LOCALHOST)]),
            _ => Ok(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]),
        }
    }

    async fn lookup_caa(&self, ctx: &LookupContext, domain: &str) -> Result<Vec<CAA>, LookupError> {
        interrupted(ctx, RecordType::CAA, domain)?;
        Ok(vec![])
    }
}
