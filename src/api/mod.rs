//! HTTP API for requesting validations.
//!
//! Problems are returned as `application/problem+json` documents carrying the ACME error type,
//! a sanitized `detail`, the HTTP `status`, and for `unauthorized` DNS-01 failures a `reason` of
//! `noTxtRecord` or `incorrectTxtRecord`.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/dns-01` (POST)
//!
//!   Expects a JSON request body of the form:
//!
//!   ```json
//!   {
//!     "identifier": { "type": "dns", "value": "example.com" },
//!     "key_authorization": "<token>.<account key thumbprint>"
//!   }
//!   ```
//!
//!  Looks up the TXT records at `_acme-challenge.example.com` and compares them against the
//!  [RFC-8555][RFC-8555] [DNS-01] digest of the key authorization. On success, returns HTTP 200
//!  (OK) and a JSON response body of the form:
//!
//!  ```json
//!  { "records": [ { "hostname": "example.com" } ] }
//!  ```
//!
//! ## `/addrs` (POST)
//!
//!   Expects `{ "hostname": "example.com" }` and returns every resolved address along with the
//!   IPv4 and IPv6 subsets, each in resolver order:
//!
//!  ```json
//!  { "addresses": ["::1", "127.0.0.1"], "v4": ["127.0.0.1"], "v6": ["::1"] }
//!  ```
//!
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
