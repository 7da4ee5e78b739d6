//! DNS resolver client interface.
//!
//! The validation authority never issues DNS queries itself. It consumes a [`Resolver`], chosen
//! when the [`ValidationAuthority`][crate::va::ValidationAuthority] is constructed:
//! [`TrustDnsResolver`] in production, or (with the `test-utils` feature) the fixed-answer
//! [`mock::MockResolver`].
//!
//! Every lookup takes a [`LookupContext`]. When the context is cancelled or its deadline passes
//! the lookup returns promptly with a [`ResolutionError`] whose underlying cause is
//! [`Underlying::Canceled`] or [`Underlying::DeadlineExceeded`].

use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use trust_dns_proto::rr::rdata::CAA;

pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod trust_dns;

pub use error::{LookupError, ResolutionError, Underlying, NO_RCODE};
pub use trust_dns::TrustDnsResolver;

/// `DynResolver` is a type alias for a [`Resolver`] shared by concurrent validation attempts.
pub type DynResolver = Arc<dyn Resolver + Send + Sync>;

/// An async trait describing the lookups a validation authority needs from a DNS resolver.
///
/// Implementations must be safe for concurrent use: each call gets its own [`LookupContext`].
#[async_trait::async_trait]
pub trait Resolver {
    /// Returns every TXT record value for `hostname`. Each value is the concatenation of the
    /// record's character strings, as raw bytes. Zero records is a successful, empty answer.
    async fn lookup_txt(
        &self,
        ctx: &LookupContext,
        hostname: &str,
    ) -> Result<Vec<Vec<u8>>, LookupError>;

    /// Returns every address `hostname` resolves to, preferred address first.
    async fn lookup_host(&self, ctx: &LookupContext, hostname: &str)
        -> Result<Vec<IpAddr>, LookupError>;

    /// Returns the CAA records published for `domain`.
    async fn lookup_caa(&self, ctx: &LookupContext, domain: &str) -> Result<Vec<CAA>, LookupError>;
}

/// Cancellation and deadline for the lookups of one validation attempt.
#[derive(Debug, Clone, Default)]
pub struct LookupContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl LookupContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound lookups made with this context to `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Bound lookups made with this context to `deadline`. An earlier existing deadline wins.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The token that cancels lookups made with this context. Clones share cancellation.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns why this context is finished, or `None` while lookups may still proceed.
    #[must_use]
    pub fn interruption(&self) -> Option<Underlying> {
        if self.cancel.is_cancelled() {
            return Some(Underlying::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Underlying::DeadlineExceeded),
            _ => None,
        }
    }

    /// Run `fut` until it completes, the context is cancelled, or the deadline passes.
    ///
    /// # Errors
    ///
    /// Returns [`Underlying::Canceled`] or [`Underlying::DeadlineExceeded`] when the context
    /// finishes first.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Underlying> {
        if let Some(interruption) = self.interruption() {
            return Err(interruption);
        }
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Underlying::Canceled),
            () = deadline => Err(Underlying::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
