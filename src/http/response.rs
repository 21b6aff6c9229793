//! HTTP response building module
//!
//! Builders for each status the server produces, all over one boxed body type
//! so fixed texts and streamed files share a response signature.

use super::range::ByteRange;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};
use std::io;

/// Body of every response: a fixed buffer or a streamed file
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

pub const NOT_FOUND_BODY: &str = "Not found.";
const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Box a fixed buffer
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Box an empty body
pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(ALLOW, ALLOWED_METHODS)
        .body(full_body("Method Not Allowed"))
        .unwrap_or_else(|e| fallback("405", &e, StatusCode::METHOD_NOT_ALLOWED))
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(empty_body())
        .unwrap_or_else(|e| fallback("OPTIONS", &e, StatusCode::NO_CONTENT))
}

/// Build directory listing response
pub fn build_listing_response(listing: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = listing.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(listing)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| fallback("listing", &e, StatusCode::OK))
}

/// Headers describing one file transfer
#[derive(Debug, Clone, Copy)]
pub struct FileResponseHead<'a> {
    pub file_name: &'a str,
    pub file_size: u64,
    /// `None` for an empty file
    pub range: Option<ByteRange>,
    pub partial: bool,
}

impl FileResponseHead<'_> {
    /// Bytes the body will carry
    pub fn content_length(&self) -> u64 {
        self.range.map_or(0, |r| r.length())
    }

    pub const fn status(&self) -> StatusCode {
        if self.partial {
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        }
    }
}

/// Build 200/206 file response around `body`
///
/// Full responses also carry `Accept-Ranges` and a `Content-Range` covering
/// the whole file; resuming download clients read the total size from it.
/// An empty file gets `bytes */0`.
pub fn build_file_response(head: &FileResponseHead<'_>, body: ResponseBody) -> Response<ResponseBody> {
    let content_range = head.range.map_or_else(
        || format!("bytes */{}", head.file_size),
        |r| r.content_range(head.file_size),
    );

    Response::builder()
        .status(head.status())
        .header(ACCEPT_RANGES, "bytes")
        .header(CONTENT_RANGE, content_range)
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", escape_filename(head.file_name)),
        )
        .header(CONTENT_LENGTH, head.content_length())
        .body(body)
        .unwrap_or_else(|e| fallback("file", &e, StatusCode::INTERNAL_SERVER_ERROR))
}

/// Make a file name safe inside a quoted header parameter
fn escape_filename(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars().filter(|c| !c.is_control()) {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn build_text_response(status: StatusCode, text: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, text.len())
        .body(full_body(text))
        .unwrap_or_else(|e| fallback(status.as_str(), &e, status))
}

/// Log a builder failure and return a bare response with the intended status
fn fallback(what: &str, error: &hyper::http::Error, status: StatusCode) -> Response<ResponseBody> {
    crate::logger::log_error(&format!("Failed to build {what} response: {error}"));
    let mut response = Response::new(empty_body());
    *response.status_mut() = status;
    response
}
