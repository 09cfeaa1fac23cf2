//! Single-emission response builder.
//!
//! One [`Response`] exists per request, created alongside the session and
//! handed to `validate`/`handle` by the dispatcher. Accumulator methods
//! (`status`, `cors`, `content`) can be called any number of times while the
//! response is still building; a terminal method (`error`, `internal`,
//! `json`, `data`) fires exactly once and freezes the response.
//!
//! Calling anything after the terminal method is a contract violation: it is
//! logged at error level and raises a flag the dispatcher and tests can
//! observe. It never silently mutates an already-emitted response and never
//! aborts the process.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use http::{HeaderValue, StatusCode, header};
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

// ── CORS policy ───────────────────────────────────────────────────────────────

/// The `Access-Control-Allow-Origin` policy for one response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Cors {
    /// Header omitted entirely.
    #[default]
    None,
    /// `Access-Control-Allow-Origin: *`
    All,
    /// A single allowed origin, echoed verbatim.
    Origin(String),
}

impl Cors {
    fn header_value(&self) -> Option<HeaderValue> {
        match self {
            Self::None => None,
            Self::All => Some(HeaderValue::from_static("*")),
            Self::Origin(o) => HeaderValue::from_str(o).ok(),
        }
    }
}

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values the builder knows how to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    Json,        // application/json
    Text,        // text/plain; charset=utf-8
    Html,        // text/html; charset=utf-8
    Png,         // image/png
    Jpeg,        // image/jpeg
    OctetStream, // application/octet-stream
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// The body source captured by a terminal method.
#[derive(Debug)]
enum Body {
    Bytes(Vec<u8>),
    /// File-backed body: `primary` first, `fallback` if unreadable, generic
    /// internal error if both fail. Read at write-out time, not emit time.
    File { primary: PathBuf, fallback: PathBuf },
}

#[derive(Debug)]
struct Emitted {
    status: StatusCode,
    content: ContentType,
    body: Body,
}

#[derive(Debug)]
enum State {
    Building,
    Emitted(Emitted),
}

/// Mutable accumulator for one outgoing HTTP response.
///
/// Accumulators return `&mut Self` so calls chain the way the rest of the
/// pipeline expects:
///
/// ```rust
/// # let mut res = showboard::Response::new();
/// use showboard::{ContentType, Cors};
///
/// res.content(ContentType::Png)
///     .cors(Cors::All)
///     .status(http::StatusCode::OK)
///     .data("shows/42.png", "shows/show.png");
/// ```
#[derive(Debug)]
pub struct Response {
    status: Option<StatusCode>,
    cors: Cors,
    content: Option<ContentType>,
    state: State,
    violated: bool,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: None,
            cors: Cors::None,
            content: None,
            state: State::Building,
            violated: false,
        }
    }

    // ── Accumulators ─────────────────────────────────────────────────────────

    /// Sets the status code. Last call wins. Default is 200 for success
    /// terminals and 400 for [`error`](Self::error).
    pub fn status(&mut self, code: StatusCode) -> &mut Self {
        if self.guard("status") {
            self.status = Some(code);
        }
        self
    }

    /// Sets the CORS policy. Last call wins; default omits the header.
    pub fn cors(&mut self, policy: Cors) -> &mut Self {
        if self.guard("cors") {
            self.cors = policy;
        }
        self
    }

    /// Sets the content type for byte and file bodies. JSON terminals
    /// (`error`, `internal`, `json`) always emit `application/json`.
    pub fn content(&mut self, content: ContentType) -> &mut Self {
        if self.guard("content") {
            self.content = Some(content);
        }
        self
    }

    // ── Terminals ────────────────────────────────────────────────────────────

    /// Emits a `{"error": message}` body with the accumulated status, or 400
    /// if none was set.
    pub fn error(&mut self, message: impl Into<String>) {
        if !self.guard("error") {
            return;
        }
        let status = self.status.unwrap_or(StatusCode::BAD_REQUEST);
        let message: String = message.into();
        let body = serde_json::json!({ "error": message });
        self.emit(status, ContentType::Json, Body::Bytes(body.to_string().into_bytes()));
    }

    /// Emits a generic 500 body, logging `cause` server-side. The cause is
    /// never echoed to the client. Forces status 500 regardless of any
    /// accumulated status.
    pub fn internal(&mut self, cause: impl std::fmt::Display) {
        if !self.guard("internal") {
            return;
        }
        error!(%cause, "internal error response");
        let body = serde_json::json!({ "error": "Internal server error" });
        self.emit(
            StatusCode::INTERNAL_SERVER_ERROR,
            ContentType::Json,
            Body::Bytes(body.to_string().into_bytes()),
        );
    }

    /// Emits a JSON success payload with the accumulated status (200 by
    /// default). A value that fails to serialize degrades to `internal`.
    pub fn json<T: Serialize>(&mut self, value: &T) {
        if !self.guard("json") {
            return;
        }
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                let status = self.status.unwrap_or(StatusCode::OK);
                self.emit(status, ContentType::Json, Body::Bytes(bytes));
            }
            Err(e) => {
                error!("response payload failed to serialize: {e}");
                let body = serde_json::json!({ "error": "Internal server error" });
                self.emit(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ContentType::Json,
                    Body::Bytes(body.to_string().into_bytes()),
                );
            }
        }
    }

    /// Emits file content: `primary` if readable, else `fallback`, else a
    /// generic internal error at write-out time. Content type defaults to
    /// `application/octet-stream` unless [`content`](Self::content) was
    /// called first.
    pub fn data(&mut self, primary: impl AsRef<Path>, fallback: impl AsRef<Path>) {
        if !self.guard("data") {
            return;
        }
        let status = self.status.unwrap_or(StatusCode::OK);
        let content = self.content.unwrap_or(ContentType::OctetStream);
        self.emit(
            status,
            content,
            Body::File {
                primary: primary.as_ref().to_owned(),
                fallback: fallback.as_ref().to_owned(),
            },
        );
    }

    // ── Observers ────────────────────────────────────────────────────────────

    /// True once a terminal method has fired.
    pub fn is_emitted(&self) -> bool {
        matches!(self.state, State::Emitted(_))
    }

    /// True if any method was called after emission. A set flag means a
    /// programming error somewhere in a route or middleware.
    pub fn contract_violated(&self) -> bool {
        self.violated
    }

    /// The status captured by the terminal method, if one has fired.
    pub fn emitted_status(&self) -> Option<StatusCode> {
        match &self.state {
            State::Emitted(e) => Some(e.status),
            State::Building => None,
        }
    }

    /// The CORS policy this response will carry.
    pub fn cors_policy(&self) -> &Cors {
        &self.cors
    }

    #[cfg(test)]
    pub(crate) fn emitted_bytes(&self) -> Option<&[u8]> {
        match &self.state {
            State::Emitted(Emitted { body: Body::Bytes(b), .. }) => Some(b),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn emitted_content(&self) -> Option<ContentType> {
        match &self.state {
            State::Emitted(e) => Some(e.content),
            State::Building => None,
        }
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// Returns true while still building; logs and flags a violation if a
    /// terminal method already fired.
    fn guard(&mut self, op: &str) -> bool {
        if self.is_emitted() {
            error!(op, "response method called after emission");
            self.violated = true;
            return false;
        }
        true
    }

    fn emit(&mut self, status: StatusCode, content: ContentType, body: Body) {
        self.state = State::Emitted(Emitted { status, content, body });
    }

    /// Resolves the response into wire form. File bodies are read here so
    /// the fallback chain can degrade to an internal error without the
    /// builder itself doing I/O.
    pub(crate) async fn into_http(self) -> http::Response<Full<Bytes>> {
        let (status, content, bytes) = match self.state {
            State::Emitted(Emitted { status, content, body: Body::Bytes(b) }) => {
                (status, content, b)
            }
            State::Emitted(Emitted { status, content, body: Body::File { primary, fallback } }) => {
                match read_with_fallback(&primary, &fallback).await {
                    Some(b) => (status, content, b),
                    None => {
                        error!(
                            primary = %primary.display(),
                            fallback = %fallback.display(),
                            "file body unreadable at both paths"
                        );
                        internal_parts()
                    }
                }
            }
            // The dispatcher guarantees emission; this is a last-resort belt
            // for code paths that bypass it.
            State::Building => {
                error!("response written out without emission");
                internal_parts()
            }
        };

        let mut builder = http::Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content.as_str());
        if let Some(origin) = self.cors.header_value() {
            builder = builder.header(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        builder
            .body(Full::new(Bytes::from(bytes)))
            .unwrap_or_else(|e| {
                error!("response assembly failed: {e}");
                http::Response::new(Full::new(Bytes::from_static(b"{}")))
            })
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_with_fallback(primary: &Path, fallback: &Path) -> Option<Vec<u8>> {
    match tokio::fs::read(primary).await {
        Ok(bytes) => Some(bytes),
        Err(_) => tokio::fs::read(fallback).await.ok(),
    }
}

fn internal_parts() -> (StatusCode, ContentType, Vec<u8>) {
    let body = serde_json::json!({ "error": "Internal server error" });
    (StatusCode::INTERNAL_SERVER_ERROR, ContentType::Json, body.to_string().into_bytes())
}
