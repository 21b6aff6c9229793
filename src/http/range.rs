//! HTTP Range request resolution module
//!
//! Turns a raw `Range` header into the inclusive byte span to send. Parsing
//! never fails a request: anything unusable degrades to the whole file, and
//! ambiguous ends resolve toward "from start to end of file".

const BYTES_UNIT: &str = "bytes=";

/// Inclusive byte span of a file, `start <= end < size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// The whole file, `None` when the file is empty
    pub const fn full(file_size: u64) -> Option<Self> {
        if file_size == 0 {
            None
        } else {
            Some(Self {
                start: 0,
                end: file_size - 1,
            })
        }
    }

    /// Number of bytes covered by the span
    #[inline]
    pub const fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for this span
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Resolved range plus whether the response is partial (206) or full (200)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub range: ByteRange,
    pub partial: bool,
}

impl ResolvedRange {
    const fn full(range: ByteRange) -> Self {
        Self {
            range,
            partial: false,
        }
    }

    const fn partial(start: u64, end: u64) -> Self {
        Self {
            range: ByteRange { start, end },
            partial: true,
        }
    }
}

/// Resolve a `Range` header against a file size (single range, bytes unit)
///
/// Supported forms:
/// - `bytes=start-end` - specific span, end clamped to the last byte
/// - `bytes=start-` - from start to end of file
/// - `bytes=-suffix` - last suffix bytes
///
/// Returns `None` only for an empty file, which has no byte range at all.
///
/// # Examples
/// ```
/// use rangeserve::http::range::{resolve_range, ByteRange};
///
/// let resolved = resolve_range(Some("bytes=500-999"), 10_000).unwrap();
/// assert!(resolved.partial);
/// assert_eq!(resolved.range, ByteRange { start: 500, end: 999 });
///
/// let resolved = resolve_range(None, 10_000).unwrap();
/// assert!(!resolved.partial);
/// assert_eq!(resolved.range.length(), 10_000);
/// ```
pub fn resolve_range(range_header: Option<&str>, file_size: u64) -> Option<ResolvedRange> {
    let whole = ByteRange::full(file_size)?;
    let last = whole.end;

    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix(BYTES_UNIT)) else {
        return Some(ResolvedRange::full(whole)); // Absent, or not the bytes unit
    };

    let (start_str, end_str) = spec.split_once('-').unwrap_or((spec, ""));
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        return Some(resolve_suffix(end_str, file_size).unwrap_or(ResolvedRange::full(whole)));
    }

    let Ok(start) = start_str.parse::<u64>() else {
        return Some(ResolvedRange::full(whole));
    };

    // No byte exists at `start`; serve the file instead of failing
    if start > last {
        return Some(ResolvedRange::full(whole));
    }

    let end = match end_str.parse::<u64>() {
        Ok(end) if end >= start => end.min(last),
        _ => last,
    };

    Some(ResolvedRange::partial(start, end))
}

/// `-N`: the last N bytes, clamped to the file
fn resolve_suffix(suffix_str: &str, file_size: u64) -> Option<ResolvedRange> {
    let suffix = suffix_str.parse::<u64>().ok().filter(|&n| n > 0)?;
    let start = file_size.saturating_sub(suffix);
    Some(ResolvedRange::partial(start, file_size - 1))
}
