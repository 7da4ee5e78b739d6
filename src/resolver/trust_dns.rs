//! [`Resolver`] implementation backed by `trust-dns-resolver`.
use crate::config::Config;
use crate::error::Error;
use crate::resolver::{LookupContext, LookupError, ResolutionError, Resolver, Underlying};
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;
use trust_dns_proto::error::ProtoErrorKind;
use trust_dns_proto::op::ResponseCode;
use trust_dns_proto::rr::rdata::CAA;
use trust_dns_proto::rr::{RData, RecordType};
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::{system_conf, TokioAsyncResolver};

/// A [`Resolver`] issuing real queries through a [`TokioAsyncResolver`].
#[derive(Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct TrustDnsResolver {
    resolver: TokioAsyncResolver,
}

impl TrustDnsResolver {
    /// Build a resolver from [`Config::resolver_addrs`], or from the system's name servers when
    /// no resolvers are configured. Either way search domains are dropped and the query timeout
    /// and attempts come from the [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolver`] if the system configuration can't be read or the resolver
    /// can't be constructed.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let name_servers = if config.resolver_addrs.is_empty() {
            debug!("no resolvers configured, using system name servers");
            let (system_config, _) = system_conf::read_system_conf()?;
            NameServerConfigGroup::from(system_config.name_servers().to_vec())
        } else {
            NameServerConfigGroup::from_ips_clear(
                &config.resolver_addrs,
                config.resolver_port,
                true,
            )
        };
        let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, resolver_opts(config))?,
        })
    }

    async fn lookup(
        &self,
        ctx: &LookupContext,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<RData>, ResolutionError> {
        let res = ctx
            .guard(self.resolver.lookup(name, record_type))
            .await
            .map_err(|cause| ResolutionError::infrastructure(record_type, name, cause))?;
        match res {
            Ok(lookup) => Ok(lookup.iter().cloned().collect()),
            Err(err) => classify(record_type, name, &err),
        }
    }
}

fn resolver_opts(config: &Config) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    // Challenge names are always fully qualified; never try search domains.
    opts.ndots = 1;
    opts.timeout = config.resolver_timeout;
    opts.attempts = config.resolver_attempts;
    opts
}

/// Map a [`ResolveError`] onto the resolution error contract. An answer without records and
/// without an error code (NODATA) is an empty success.
fn classify(
    record_type: RecordType,
    name: &str,
    err: &ResolveError,
) -> Result<Vec<RData>, ResolutionError> {
    let underlying = match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NoError {
                return Ok(vec![]);
            }
            return Err(ResolutionError::rcode_answer(
                record_type,
                name,
                *response_code,
            ));
        }
        ResolveErrorKind::Timeout => Underlying::Timeout(cause(err)),
        ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
            Underlying::Timeout(cause(err))
        }
        ResolveErrorKind::Io(io_err) => Underlying::Network(Arc::new(io::Error::new(
            io_err.kind(),
            io_err.to_string(),
        ))),
        _ => Underlying::Network(cause(err)),
    };
    Err(ResolutionError::infrastructure(record_type, name, underlying))
}

fn cause(err: &ResolveError) -> super::error::Cause {
    Arc::new(io::Error::new(io::ErrorKind::Other, err.to_string()))
}

#[async_trait::async_trait]
impl Resolver for TrustDnsResolver {
    async fn lookup_txt(
        &self,
        ctx: &LookupContext,
        hostname: &str,
    ) -> Result<Vec<Vec<u8>>, LookupError> {
        let rdata = self.lookup(ctx, hostname, RecordType::TXT).await?;
        Ok(rdata
            .iter()
            .filter_map(|rd| match rd {
                RData::TXT(txt) => Some(txt.txt_data().concat()),
                _ => None,
            })
            .collect())
    }

    async fn lookup_host(
        &self,
        ctx: &LookupContext,
        hostname: &str,
    ) -> Result<Vec<IpAddr>, LookupError> {
        let (a, aaaa) = tokio::join!(
            self.lookup(ctx, hostname, RecordType::A),
            self.lookup(ctx, hostname, RecordType::AAAA),
        );
        let to_addrs =
            |rdata: Vec<RData>| -> Vec<IpAddr> { rdata.iter().filter_map(RData::to_ip_addr).collect() };

        match (a.map(to_addrs), aaaa.map(to_addrs)) {
            (Err(a_err), Err(aaaa_err)) => {
                debug!(hostname, error = %aaaa_err, "AAAA lookup also failed");
                Err(a_err.into())
            }
            (Err(err), Ok(v6)) if v6.is_empty() => Err(err.into()),
            (Ok(v4), Err(err)) if v4.is_empty() => Err(err.into()),
            (v4, v6) => {
                if let Err(err) = v4.as_ref().and(v6.as_ref()) {
                    debug!(hostname, error = %err, "partial address lookup failure");
                }
                Ok(v4
                    .unwrap_or_default()
                    .into_iter()
                    .chain(v6.unwrap_or_default())
                    .collect())
            }
        }
    }

    async fn lookup_caa(&self, ctx: &LookupContext, domain: &str) -> Result<Vec<CAA>, LookupError> {
        let rdata = self.lookup(ctx, domain, RecordType::CAA).await?;
        Ok(rdata
            .into_iter()
            .filter_map(|rd| match rd {
                RData::CAA(caa) => Some(caa),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{SocketAddr, TcpListener, UdpSocket};
    use std::str::FromStr;
    use std::time::Duration;
    use trust_dns_proto::op::Query;
    use trust_dns_proto::rr::Name;

    fn config(resolver: SocketAddr) -> Config {
        Config {
            api_bind_addr: "127.0.0.1:0".parse().unwrap(),
            api_timeout: Duration::from_secs(10),
            lookup_timeout: Duration::from_secs(5),
            resolver_addrs: vec![resolver.ip()],
            resolver_port: resolver.port(),
            resolver_timeout: Duration::from_secs(1),
            resolver_attempts: 1,
        }
    }

    fn no_records(code: ResponseCode) -> ResolveError {
        let query = Query::query(Name::from_str("example.com.").unwrap(), RecordType::TXT);
        ResolveError::from(ResolveErrorKind::NoRecordsFound {
            query: Box::new(query),
            soa: None,
            negative_ttl: None,
            response_code: code,
            trusted: true,
        })
    }

    #[test]
    fn nodata_is_empty_success() {
        let res = classify(RecordType::TXT, "example.com", &no_records(ResponseCode::NoError));
        assert!(res.unwrap().is_empty());
    }

    #[test]
    fn negative_answers_keep_rcode() {
        let err = classify(RecordType::TXT, "example.com", &no_records(ResponseCode::NXDomain))
            .unwrap_err();
        assert!(err.underlying().is_none());
        assert_eq!(err.rcode(), 3);
    }

    #[test]
    fn timeouts_are_infrastructure_faults() {
        let err = classify(
            RecordType::A,
            "example.com",
            &ResolveError::from(ResolveErrorKind::Timeout),
        )
        .unwrap_err();
        assert!(matches!(err.underlying(), Some(Underlying::Timeout(_))));
        assert_eq!(err.rcode(), crate::resolver::NO_RCODE);
    }

    #[test]
    fn io_errors_are_network_faults() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err = classify(
            RecordType::A,
            "example.com",
            &ResolveError::from(ResolveErrorKind::Io(io_err)),
        )
        .unwrap_err();
        assert!(matches!(err.underlying(), Some(Underlying::Network(_))));
    }

    #[test]
    fn opts_come_from_config() {
        let opts = resolver_opts(&config("127.0.0.1:53".parse().unwrap()));
        assert_eq!(opts.ndots, 1);
        assert_eq!(opts.timeout, Duration::from_secs(1));
        assert_eq!(opts.attempts, 1);
    }

    #[tokio::test]
    async fn unresponsive_resolver_is_a_timeout() {
        // Bound but never read or accepted: nothing sent here is ever answered.
        let udp = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = udp.local_addr().unwrap();
        let _tcp = TcpListener::bind(addr).unwrap();

        let config = config(addr);
        assert!(config.resolver_gives_up_first().is_ok());
        let resolver = TrustDnsResolver::from_config(&config).unwrap();
        let ctx = LookupContext::new().with_timeout(config.lookup_timeout);

        let err = resolver
            .lookup_txt(&ctx, "_acme-challenge.example.com.")
            .await
            .unwrap_err();
        assert!(
            matches!(err.infrastructure_fault(), Some(Underlying::Timeout(_))),
            "{err:?}"
        );
        assert_eq!(
            err.to_string(),
            "DNS problem: query timed out looking up TXT for _acme-challenge.example.com."
        );
    }
}
