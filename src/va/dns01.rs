//! [DNS-01] challenge validation.
//!
//! The requester proves control of a domain by publishing a TXT record at
//! `_acme-challenge.<domain>` holding the base64url (unpadded) SHA-256 digest of their key
//! authorization.
//!
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
use crate::identifier::{Identifier, IdentifierType};
use crate::probs::{ProblemDetails, Reason};
use crate::resolver::LookupContext;
use crate::va::{Challenge, ValidationAuthority, ValidationRecord};
use base64::engine::general_purpose;
use base64::{alphabet, engine, Engine};
use lazy_static::lazy_static;
use ring::digest::{digest, SHA256};
use subtle::ConstantTimeEq;

/// Label prepended to the domain to form the challenge name.
pub const DNS_PREFIX: &str = "_acme-challenge";

/// Untrusted record content beyond this many bytes is cut off in problem details.
const MAX_RECORD_DETAIL_BYTES: usize = 100;

lazy_static! {
    static ref BASE64_ENGINE: engine::GeneralPurpose =
        engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);
}

/// The TXT record value expected for `key_authorization`.
#[must_use]
pub fn key_authorization_digest(key_authorization: &str) -> String {
    BASE64_ENGINE.encode(digest(&SHA256, key_authorization.as_bytes()))
}

/// Compare without short-circuiting on the first differing byte, so an attacker answering our
/// queries can't learn the expected digest a byte at a time.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Render attacker-controlled record bytes for a problem detail: at most
/// `MAX_RECORD_DETAIL_BYTES` bytes followed by `...` when cut, with invalid UTF-8 replaced.
fn sanitize_record(record: &[u8]) -> String {
    if record.len() > MAX_RECORD_DETAIL_BYTES {
        let mut truncated = String::from_utf8_lossy(&record[..MAX_RECORD_DETAIL_BYTES]).into_owned();
        truncated.push_str("...");
        truncated
    } else {
        String::from_utf8_lossy(record).into_owned()
    }
}

impl ValidationAuthority {
    /// Validate a DNS-01 challenge for `ident`.
    ///
    /// Returns a single [`ValidationRecord`] when any TXT record at the challenge name matches
    /// the digest of the challenge's key authorization.
    ///
    /// # Errors
    ///
    /// * `malformed` if `ident` isn't a DNS identifier.
    /// * `dns` if the TXT lookup fails.
    /// * `unauthorized` if there are no TXT records ([`Reason::NoTxtRecord`]) or none of them
    ///   match ([`Reason::IncorrectTxtRecord`]).
    pub async fn validate_dns01(
        &self,
        ctx: &LookupContext,
        ident: &Identifier,
        challenge: &Challenge,
    ) -> Result<Vec<ValidationRecord>, ProblemDetails> {
        if ident.kind != IdentifierType::Dns {
            tracing::info!("Identifier type for DNS challenge was not DNS: {ident}");
            return Err(ProblemDetails::malformed(
                "Identifier type for DNS was not itself DNS",
            ));
        }

        let expected = key_authorization_digest(&challenge.provided_key_authorization);

        let challenge_subdomain = format!("{DNS_PREFIX}.{}", ident.value);
        let txts = match self.resolver.lookup_txt(ctx, &challenge_subdomain).await {
            Ok(txts) => txts,
            Err(err) => {
                self.log_dns_error(&ident.value, &err);
                return Err(ProblemDetails::dns(err.to_string()));
            }
        };

        // Distinct from the wrong-value case below: operators troubleshoot these differently.
        let Some(first) = txts.first() else {
            return Err(ProblemDetails::unauthorized(format!(
                "No TXT record found at {challenge_subdomain}"
            ))
            .with_reason(Reason::NoTxtRecord));
        };

        if txts
            .iter()
            .any(|txt| constant_time_eq(txt, expected.as_bytes()))
        {
            return Ok(vec![ValidationRecord {
                hostname: ident.value.clone(),
            }]);
        }

        let and_more = match txts.len() {
            1 => String::new(),
            n => format!(" (and {} more)", n - 1),
        };
        Err(ProblemDetails::unauthorized(format!(
            "Incorrect TXT record {:?}{and_more} found at {challenge_subdomain}",
            sanitize_record(first)
        ))
        .with_reason(Reason::IncorrectTxtRecord))
    }
}
