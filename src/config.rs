use crate::error::Error;
use ipnetwork::IpNetwork;
use lazy_static::lazy_static;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub type Shared = Arc<Config>;

const DEFAULT_RESOLVER_PORT: u16 = 53;
const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_RESOLVER_ATTEMPTS: usize = 2;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    /// Upper bound on the DNS lookups made for a single validation.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub lookup_timeout: Duration,
    /// Recursive resolvers to query. Empty means use the system configuration.
    #[serde(default)]
    pub resolver_addrs: Vec<IpAddr>,
    #[serde(default = "default_resolver_port")]
    pub resolver_port: u16,
    /// How long to wait for a single resolver query before retrying.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_resolver_timeout")]
    pub resolver_timeout: Duration,
    /// How many times a query is sent before the resolver gives up.
    #[serde(default = "default_resolver_attempts")]
    pub resolver_attempts: usize,
}

fn default_resolver_port() -> u16 {
    DEFAULT_RESOLVER_PORT
}

fn default_resolver_timeout() -> Duration {
    DEFAULT_RESOLVER_TIMEOUT
}

fn default_resolver_attempts() -> usize {
    DEFAULT_RESOLVER_ATTEMPTS
}

lazy_static! {
    // NOTE(XXX): Once the "ip" feature has stabilized we can use Ipv6Addr.is_unique_local[0].
    //            Presently this feature is unstable so we home-roll. See also RFC 4193[1].
    // [0]: https://doc.rust-lang.org/std/net/struct.Ipv6Addr.html#method.is_unique_local
    // [1]: https://www.rfc-editor.org/rfc/rfc4193.html
    static ref IPV6_UNIQUE_LOCAL_NETWORK: IpNetwork = IpNetwork::from_str("fc00::/7").unwrap();
}

impl Config {
    /// Load a [`Config`] from the JSON file at `p`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the file can't be read, [`Error::InvalidJSON`] if it isn't a
    /// valid config, [`Error::InsecureAPIBind`] if the API would listen on a public address, or
    /// [`Error::ResolverTimeout`] if resolver retries could outlast a validation's lookups.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.bind_addr_is_secure()?;
        conf.resolver_gives_up_first()?;
        Ok(conf)
    }

    /// The resolver must report its own timeout before the lookup deadline expires, otherwise
    /// an unresponsive resolver is indistinguishable from an expired request.
    pub(crate) fn resolver_gives_up_first(&self) -> Result<(), Error> {
        let attempts = u32::try_from(self.resolver_attempts.max(1)).unwrap_or(u32::MAX);
        let worst_case = self.resolver_timeout.saturating_mul(attempts);
        if worst_case >= self.lookup_timeout {
            return Err(Error::ResolverTimeout {
                resolver_timeout: self.resolver_timeout,
                attempts: self.resolver_attempts,
                lookup_timeout: self.lookup_timeout,
            });
        }
        Ok(())
    }

    fn bind_addr_is_secure(&self) -> Result<(), Error> {
        match self.api_bind_addr {
            SocketAddr::V4(v4_addr) => {
                let ip = v4_addr.ip();
                if !ip.is_loopback() && !ip.is_private() {
                    return Err(Error::InsecureAPIBind(IpAddr::V4(*ip)));
                }
                Ok(())
            }
            SocketAddr::V6(v6_addr) => {
                let ip = v6_addr.ip();
                if !ip.is_loopback() && !IPV6_UNIQUE_LOCAL_NETWORK.contains(IpAddr::V6(*ip)) {
                    return Err(Error::InsecureAPIBind(IpAddr::V6(*ip)));
                }
                Ok(())
            }
        }
    }
}
