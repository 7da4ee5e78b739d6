use crate::error::Error;
use crate::resolver::LookupContext;
use crate::va::ValidationAuthority;
use std::net::IpAddr;

impl ValidationAuthority {
    /// Resolve every A/AAAA address for `hostname`. The first address is the preferred one, the
    /// same choice a stock HTTP client would make.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DNSError`] if the lookup fails, or [`Error::NoAddresses`] if it succeeds
    /// without any addresses.
    pub async fn get_addrs(
        &self,
        ctx: &LookupContext,
        hostname: &str,
    ) -> Result<Vec<IpAddr>, Error> {
        let addrs = match self.resolver.lookup_host(ctx, hostname).await {
            Ok(addrs) => addrs,
            Err(err) => {
                self.log_dns_error(hostname, &err);
                return Err(err.into());
            }
        };

        if addrs.is_empty() {
            return Err(Error::NoAddresses(hostname.to_string()));
        }
        tracing::debug!("Resolved addresses for {hostname}: {addrs:?}");
        Ok(addrs)
    }
}

/// Split `addrs` into IPv4 and IPv6 addresses, keeping their order. IPv4-mapped IPv6 addresses
/// count as IPv4.
#[must_use]
pub fn available_addresses(addrs: &[IpAddr]) -> (Vec<IpAddr>, Vec<IpAddr>) {
    addrs.iter().partition(|addr| match addr {
        IpAddr::V4(_) => true,
        IpAddr::V6(v6) => v6.to_ipv4_mapped().is_some(),
    })
}
