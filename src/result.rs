//! Tri-state outcome for validation and middleware checks.
//!
//! Every precondition in the dispatch pipeline — a route's `validate`, a
//! middleware's `apply` — reports through [`HttpResult`] instead of panicking
//! or short-circuiting the response directly. The dispatcher is the only
//! place that turns a non-`Ok` result into an actual HTTP response, so the
//! mapping from "check failed" to "client sees an error" lives in exactly
//! one spot.

use http::StatusCode;

/// The outcome of a validation or middleware check.
///
/// Created per check, consumed once by the dispatcher. `BadRequest` carries
/// the status the client should see (400 unless the check chose otherwise);
/// `Internal` always surfaces as a 500 with its message logged, not echoed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HttpResult {
    Ok,
    BadRequest { status: StatusCode, message: String },
    Internal { message: String },
}

impl HttpResult {
    pub fn ok() -> Self {
        Self::Ok
    }

    /// A 400 rejection with a client-visible message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::rejected(StatusCode::BAD_REQUEST, message)
    }

    /// A client-error rejection with an explicit status code.
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self::BadRequest { status, message: message.into() }
    }

    /// An internal failure. The message is logged server-side; the client
    /// receives a generic 500 body.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// True for every variant except `Ok`.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_not_an_error() {
        assert!(!HttpResult::ok().is_error());
    }

    #[test]
    fn every_non_ok_variant_is_an_error() {
        assert!(HttpResult::bad_request("missing field").is_error());
        assert!(HttpResult::rejected(StatusCode::FORBIDDEN, "no").is_error());
        assert!(HttpResult::internal("boom").is_error());
    }

    #[test]
    fn bad_request_defaults_to_400() {
        match HttpResult::bad_request("nope") {
            HttpResult::BadRequest { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
