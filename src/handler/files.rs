//! File serving module
//!
//! Resolves the requested range and streams the file behind a 200/206 head.

use crate::handler::router::RequestContext;
use crate::http::response::{build_file_response, empty_body, FileResponseHead};
use crate::http::{resolve_range, ContentStreamer, ResponseBody};
use hyper::Response;
use std::io;
use std::path::Path;
use tokio::fs::File;

/// Serve `size` bytes of the file at `path`, honoring the request's Range
///
/// The file handle moves into the body stream; it is closed when the body
/// finishes or is dropped. HEAD requests close it right away.
pub async fn serve_file(
    ctx: &RequestContext,
    path: &Path,
    name: &str,
    size: u64,
) -> io::Result<Response<ResponseBody>> {
    let file = File::open(path).await?;
    let resolved = resolve_range(ctx.range_header.as_deref(), size);

    let head = FileResponseHead {
        file_name: name,
        file_size: size,
        range: resolved.map(|r| r.range),
        partial: resolved.is_some_and(|r| r.partial),
    };

    let body = match resolved {
        Some(r) if !ctx.is_head() => ContentStreamer::open(file, r.range).await?.into_body(),
        _ => empty_body(),
    };

    Ok(build_file_response(&head, body))
}
