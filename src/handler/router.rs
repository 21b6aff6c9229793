//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, resolving the
//! path under the working directory, dispatching to the listing or file
//! handler, and writing the access log line once the response body is done.

use crate::config::AppState;
use crate::handler::target::{self, ResolvedTarget};
use crate::handler::{files, listing};
use crate::http::{self, response, OnComplete, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{HeaderName, CONTENT_LENGTH, RANGE, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode, Version};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Request context encapsulating information needed for request processing
///
/// Owned, so it can be captured from the hyper request before any I/O.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Raw (still percent-encoded) request path
    pub path: String,
    pub version: Version,
    pub range_header: Option<String>,
    /// First User-Agent value, empty if absent
    pub user_agent: String,
    pub remote_addr: SocketAddr,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>, remote_addr: SocketAddr) -> Self {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            version: req.version(),
            range_header: header(RANGE),
            user_agent: header(USER_AGENT).unwrap_or_default(),
            remote_addr,
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    fn access_entry(&self, status: StatusCode, body_bytes: u64) -> AccessLogEntry {
        AccessLogEntry {
            remote_addr: self.remote_addr.ip(),
            time: chrono::Local::now(),
            method: self.method.to_string(),
            path: percent_decode_str(&self.path).decode_utf8_lossy().into_owned(),
            protocol: protocol_name(self.version).to_string(),
            status: status.as_u16(),
            user_agent: self.user_agent.clone(),
            body_bytes,
        }
    }
}

/// Protocol label as it appears on the request line
pub fn protocol_name(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    ctx: RequestContext,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    let access_log = state.config.logging.access_log;
    let format = state.access_log_format;

    let response = dispatch(&ctx, &state, move |entry| {
        if access_log {
            logger::log_access(entry, format);
        }
    })
    .await;
    Ok(response)
}

/// Route the request; `log` receives the exchange exactly once, when the
/// response body has been sent, failed, or was dropped by the connection
pub async fn dispatch<F>(ctx: &RequestContext, state: &AppState, log: F) -> Response<ResponseBody>
where
    F: FnOnce(&AccessLogEntry) + Send + 'static,
{
    let response = route_request(ctx, state).await;

    let body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let entry = ctx.access_entry(response.status(), body_bytes);

    response.map(|body| OnComplete::wrap(body, move || log(&entry)))
}

/// Check HTTP method and return appropriate response for anything but GET/HEAD
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request based on what the path resolves to
async fn route_request(ctx: &RequestContext, state: &AppState) -> Response<ResponseBody> {
    if let Some(resp) = check_http_method(&ctx.method) {
        return resp;
    }

    let target = match target::resolve(&state.root, &ctx.path).await {
        Ok(t) => t,
        Err(e) => {
            logger::log_error(&format!("Failed to inspect '{}': {e}", ctx.path));
            return http::build_500_response();
        }
    };

    match target {
        ResolvedTarget::Directory(dir) => match listing::list_directory(&dir).await {
            Ok(text) => response::build_listing_response(text, ctx.is_head()),
            Err(e) => {
                logger::log_error(&format!("Failed to list '{}': {e}", dir.display()));
                http::build_500_response()
            }
        },
        ResolvedTarget::File { path, name, size } => {
            match files::serve_file(ctx, &path, &name, size).await {
                Ok(resp) => resp,
                Err(e) => {
                    logger::log_error(&format!("Failed to open '{}': {e}", path.display()));
                    http::build_500_response()
                }
            }
        }
        ResolvedTarget::Missing => http::build_404_response(),
    }
}
