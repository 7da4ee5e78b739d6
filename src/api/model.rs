use crate::identifier::Identifier;
use crate::va::ValidationRecord;
use base64::engine::general_purpose;
use base64::{alphabet, engine, DecodeError, Engine};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct Dns01Request {
    pub identifier: Identifier,
    pub key_authorization: String,
}

#[derive(thiserror::Error, Debug)]
pub enum KeyAuthorizationError {
    #[error("missing '.' between token and thumbprint")]
    MissingSeparator,
    #[error("empty token")]
    EmptyToken,
    #[error("invalid thumbprint encoding: {0}")]
    InvalidEncoding(DecodeError),
    #[error("invalid thumbprint length: found {actual} bytes, expected {expected}")]
    InvalidThumbprintLength { actual: usize, expected: usize },
}

/// A JWK thumbprint is a SHA-256 digest.
const THUMBPRINT_DECODED_LEN_BYTES: usize = 32;

lazy_static! {
    static ref BASE64_ENGINE: engine::GeneralPurpose =
        engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);
}

impl Dns01Request {
    /// Check the key authorization has the `<token>.<thumbprint>` shape. The validation itself
    /// treats it as opaque.
    pub fn valid_key_authorization(&self) -> Result<(), KeyAuthorizationError> {
        let (token, thumbprint) = self
            .key_authorization
            .split_once('.')
            .ok_or(KeyAuthorizationError::MissingSeparator)?;
        if token.is_empty() {
            return Err(KeyAuthorizationError::EmptyToken);
        }
        match BASE64_ENGINE.decode(thumbprint) {
            Ok(raw) => match raw.len() {
                THUMBPRINT_DECODED_LEN_BYTES => Ok(()),
                _ => Err(KeyAuthorizationError::InvalidThumbprintLength {
                    actual: raw.len(),
                    expected: THUMBPRINT_DECODED_LEN_BYTES,
                }),
            },
            Err(err) => Err(KeyAuthorizationError::InvalidEncoding(err)),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct Dns01Result {
    pub records: Vec<ValidationRecord>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct AddrsRequest {
    pub hostname: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct AddrsResult {
    pub addresses: Vec<IpAddr>,
    pub v4: Vec<IpAddr>,
    pub v6: Vec<IpAddr>,
}
