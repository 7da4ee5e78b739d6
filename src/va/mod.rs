//! Validation authority.
//!
//! Decides whether a requester controls an identifier. Only [RFC-8555][RFC-8555] [DNS-01]
//! validation is implemented here, along with the address resolution other challenge types
//! build on.
//!
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4

use crate::resolver::{DynResolver, LookupError};
use serde::{Deserialize, Serialize};

pub mod addrs;
pub mod dns01;

pub use addrs::available_addresses;
pub use dns01::{key_authorization_digest, DNS_PREFIX};

/// A challenge as handed to the validation authority.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Challenge {
    /// The key authorization (token and account key thumbprint) supplied by the requester.
    pub provided_key_authorization: String,
}

impl Challenge {
    #[must_use]
    pub fn new(provided_key_authorization: impl Into<String>) -> Self {
        Self {
            provided_key_authorization: provided_key_authorization.into(),
        }
    }
}

/// Records which hostname was successfully validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRecord {
    pub hostname: String,
}

/// Performs validations using a shared [`Resolver`][crate::resolver::Resolver].
///
/// Holds no per-validation state: a single instance serves any number of concurrent attempts.
#[derive(Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct ValidationAuthority {
    resolver: DynResolver,
}

impl ValidationAuthority {
    #[must_use]
    pub fn new(resolver: DynResolver) -> Self {
        Self { resolver }
    }

    /// Log `err` when it is a fault talking to the resolver.
    ///
    /// Negative answers the resolver returned (NXDOMAIN, SERVFAIL, ...) are left alone, as are
    /// cancelled and expired lookups: the problem sent to the requester only carries a generic
    /// message like "networking error", so the cause is logged separately here for operators.
    pub fn log_dns_error(&self, ident: &str, err: &LookupError) {
        if let Some(underlying) = err.infrastructure_fault() {
            tracing::error!(
                identifier = ident,
                err = %err,
                underlying = %underlying,
                "failed talking to resolver"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Identifier;
    use crate::resolver::mock::{MockResolver, GOOD_KEY_AUTHORIZATION};
    use crate::resolver::LookupContext;
    use std::sync::Arc;
    use tracing_test::traced_test;

    const FAULT: &str = "failed talking to resolver";

    fn va() -> ValidationAuthority {
        ValidationAuthority::new(Arc::new(MockResolver::new()))
    }

    async fn validate(ctx: &LookupContext, domain: &str) {
        let res = va()
            .validate_dns01(ctx, &Identifier::dns(domain), &Challenge::new(GOOD_KEY_AUTHORIZATION))
            .await;
        assert!(res.is_err());
    }

    // A macro rather than a fn: `logs_assert` is injected by `#[traced_test]` into each test body.
    macro_rules! assert_fault_logged {
        ($identifier:expr, $underlying:expr) => {{
            let identifier = format!("identifier=\"{}\"", $identifier);
            let underlying = format!("underlying={}", $underlying);
            logs_assert(|lines: &[&str]| {
                match lines
                    .iter()
                    .filter(|line| line.contains(FAULT))
                    .find(|line| line.contains("ERROR"))
                {
                    Some(line) if line.contains(&identifier) && line.contains(&underlying) => Ok(()),
                    Some(line) => Err(format!("unexpected fault log: {line}")),
                    None => Err("no fault logged".to_string()),
                }
            });
        }};
    }

    #[tokio::test]
    #[traced_test]
    async fn txt_timeout_is_logged() {
        validate(&LookupContext::new(), "timeout-dns01.com").await;
        assert_fault_logged!("timeout-dns01.com", "so sloooow");
    }

    #[tokio::test]
    #[traced_test]
    async fn host_network_error_is_logged() {
        let res = va().get_addrs(&LookupContext::new(), "always.error").await;
        assert!(res.is_err());
        assert_fault_logged!("always.error", "read udp: some net error");
    }

    #[tokio::test]
    #[traced_test]
    async fn host_timeout_is_logged() {
        let res = va().get_addrs(&LookupContext::new(), "always.timeout").await;
        assert!(res.is_err());
        assert_fault_logged!("always.timeout", "so sloooow");
    }

    #[tokio::test]
    #[traced_test]
    async fn negative_answers_are_not_logged() {
        let ctx = LookupContext::new();
        validate(&ctx, "nxdomain-dns01.com").await;
        validate(&ctx, "servfail.com").await;
        assert!(!logs_contain(FAULT));
    }

    #[tokio::test]
    #[traced_test]
    async fn cancelled_lookups_are_not_logged() {
        let ctx = LookupContext::new();
        ctx.cancel();
        validate(&ctx, "hangs-dns01.com").await;
        assert!(va().get_addrs(&ctx, "example.com").await.is_err());
        assert!(!logs_contain(FAULT));
    }
}
