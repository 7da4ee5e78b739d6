//! DNS-01 validation authority
//!
//! Decides whether the party requesting a certificate for a domain controls that domain's DNS
//! zone, using the [RFC-8555][RFC-8555] [DNS-01] challenge: the requester publishes a TXT record
//! at `_acme-challenge.<domain>` holding the digest of their key authorization, and the
//! [validation authority][va::ValidationAuthority] looks it up and compares it in constant time.
//!
//! Lookups go through a pluggable [`Resolver`][resolver::Resolver]. Failures are reported as
//! [problem details][probs::ProblemDetails]; faults talking to the resolver are additionally
//! logged for operators.
//!
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod identifier;
pub mod probs;
pub mod resolver;
pub mod va;

pub use api::new as new_http;
pub use config::{Config, Shared};
pub use identifier::Identifier;
pub use probs::{ProblemDetails, ProblemKind};
pub use resolver::{DynResolver, LookupContext, TrustDnsResolver};
pub use va::ValidationAuthority;
